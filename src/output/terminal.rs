// Colored terminal output for activity lists and alignment tables.
//
// This module handles all terminal-specific formatting. The main.rs
// command handlers delegate here.

use colored::Colorize;

use crate::keywords::align::{AlignmentTable, Category};
use crate::keywords::{Source, SENTINEL};

/// Column width for keyword cells before truncation kicks in.
const CELL_WIDTH: usize = 28;

/// Display the selectable activity IDs of a dataset.
pub fn display_activity_ids(ids: &[String]) {
    if ids.is_empty() {
        println!("No selectable activities found in this file.");
        return;
    }

    println!("\n{}", format!("=== Activities ({}) ===", ids.len()).bold());
    for id in ids {
        println!("  {id}");
    }
}

/// Display an alignment table with a per-category summary.
pub fn display_alignment(activity_id: &str, activity_name: &str, table: &AlignmentTable) {
    println!(
        "\n{}",
        format!("=== {activity_id}: {activity_name} ===").bold()
    );
    println!();

    // Header
    println!(
        "  {:<w$}  {:<w$}  {:<w$}",
        Source::Manual.label().dimmed(),
        Source::Gpt.label().dimmed(),
        Source::Gemini.label().dimmed(),
        w = CELL_WIDTH,
    );
    println!("  {}", "-".repeat(CELL_WIDTH * 3 + 4).dimmed());

    for row in table.rows() {
        let [manual, gpt, gemini] = row.cells();
        println!(
            "  {}  {}  {}",
            colorize_cell(manual, row.category),
            colorize_cell(gpt, row.category),
            colorize_cell(gemini, row.category),
        );
    }

    println!();

    for (category, count) in table.category_counts() {
        if count > 0 {
            println!("  {:<16} {count}", category.label());
        }
    }
    println!(
        "  {:<16} {:.0}%",
        "Agreement",
        table.agreement() * 100.0
    );
}

/// Pad first, then color, so ANSI codes don't throw off the alignment.
fn colorize_cell(cell: &str, category: Category) -> colored::ColoredString {
    let padded = format!(
        "{:<w$}",
        super::truncate_chars(cell, CELL_WIDTH - 3),
        w = CELL_WIDTH
    );
    if cell == SENTINEL {
        return padded.dimmed();
    }
    match category {
        Category::All => padded.green().bold(),
        Category::ManualGpt | Category::ManualGemini | Category::GptGemini => padded.yellow(),
        _ => padded.normal(),
    }
}
