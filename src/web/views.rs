// Server-rendered HTML pages: upload form, activity picker, comparison table.
//
// Pages are small enough that plain string building beats pulling in a
// template engine. Every user-supplied value goes through `escape_html`.

use crate::keywords::align::{AlignmentTable, Category};
use crate::keywords::{Source, SENTINEL};
use crate::session::Comparison;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 60rem; color: #222; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid #ccc; padding: 0.35rem 0.6rem; text-align: left; }
th { background: #f3f3f3; }
td.missing { color: #aaa; }
tr.all td { background: #e8f6e8; }
tr.pair td { background: #fdf6e3; }
.summary { color: #555; font-size: 0.9rem; }
form { margin: 1rem 0; }
"#;

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}\n</body>\n</html>\n",
        escape_html(title)
    )
}

/// Landing page. Without a dataset it shows the upload form; with one it
/// also offers the activity picker.
pub fn index_page(activity_ids: Option<&[String]>) -> String {
    let mut body = String::from("<h1>Keyword Comparison</h1>\n");

    body.push_str(
        "<form action=\"/\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <label>Spreadsheet: <input type=\"file\" name=\"file\" accept=\".xlsx,.xls,.xlsb,.ods\" required></label>\n\
         <button type=\"submit\">Upload</button>\n</form>\n",
    );

    if let Some(ids) = activity_ids {
        if ids.is_empty() {
            body.push_str("<p>No selectable activities in this file.</p>\n");
        } else {
            body.push_str("<form action=\"/comparison\" method=\"post\">\n<label>Activity: <select name=\"activity_id\">\n");
            for id in ids {
                let id = escape_html(id);
                body.push_str(&format!("<option value=\"{id}\">{id}</option>\n"));
            }
            body.push_str("</select></label>\n<button type=\"submit\">Compare</button>\n</form>\n");
        }
        body.push_str(
            "<form action=\"/reset\" method=\"post\"><button type=\"submit\">Clear session</button></form>\n",
        );
    }

    page("Keyword Comparison", &body)
}

/// Comparison page for one activity with an export link.
pub fn comparison_page(comparison: &Comparison) -> String {
    let mut body = format!(
        "<h1>Activity {}</h1>\n<h2>{}</h2>\n",
        escape_html(&comparison.activity_id),
        escape_html(&comparison.activity_name)
    );

    body.push_str(&alignment_table(&comparison.table));
    body.push_str(&summary(&comparison.table));
    body.push_str("<p><a href=\"/export\">Export CSV</a> | <a href=\"/\">Choose another activity</a></p>\n");

    page(
        &format!("Comparison {}", comparison.activity_id),
        &body,
    )
}

fn alignment_table(table: &AlignmentTable) -> String {
    let mut html = String::from("<table>\n<thead><tr>");
    for source in Source::ALL {
        html.push_str(&format!("<th>{}</th>", source.label()));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    for row in table.rows() {
        let class = match row.category {
            Category::All => "all",
            Category::ManualGpt | Category::ManualGemini | Category::GptGemini => "pair",
            _ => "single",
        };
        html.push_str(&format!("<tr class=\"{class}\">"));
        for cell in row.cells() {
            if cell == SENTINEL {
                html.push_str("<td class=\"missing\">-</td>");
            } else {
                html.push_str(&format!("<td>{}</td>", escape_html(cell)));
            }
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>\n");
    html
}

fn summary(table: &AlignmentTable) -> String {
    let parts: Vec<String> = table
        .category_counts()
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(category, count)| format!("{}: {count}", category.label()))
        .collect();

    format!(
        "<p class=\"summary\">{} keywords. {}. Agreement {:.0}%.</p>\n",
        table.len(),
        parts.join(", "),
        table.agreement() * 100.0
    )
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
