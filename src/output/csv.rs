// CSV export of an alignment table.
//
// Column order is fixed (Manual, GPT, Gemini). Lines end with "\n" and
// fields are quoted only when they contain a comma, quote, or line break.

use crate::keywords::align::AlignmentTable;
use crate::keywords::Source;

/// Serialize `table` to UTF-8 CSV bytes, header row first.
pub fn export_csv(table: &AlignmentTable) -> Vec<u8> {
    let mut out = String::new();

    let header: Vec<&str> = Source::ALL.iter().map(|s| s.label()).collect();
    out.push_str(&header.join(","));
    out.push('\n');

    for row in table.rows() {
        let fields: Vec<String> = row.cells().iter().map(|c| escape_field(c)).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }

    out.into_bytes()
}

/// Download name for an activity's export.
pub fn export_filename(activity_id: &str) -> String {
    format!("comparison_{activity_id}.csv")
}

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
