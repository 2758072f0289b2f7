// Keyword normalization: one comma-separated spreadsheet cell in, one
// ordered keyword list out.

use super::SENTINEL;

/// Ordered keywords from one source. Duplicates are kept as given.
pub type KeywordList = Vec<String>;

/// Split a raw field on commas, trim each piece, and replace pieces that
/// are empty after trimming with the sentinel.
///
/// Total over any input: `""` yields `["-"]`.
pub fn normalize(raw: &str) -> KeywordList {
    raw.split(',')
        .map(|piece| {
            let trimmed = piece.trim();
            if trimmed.is_empty() {
                SENTINEL.to_string()
            } else {
                trimmed.to_string()
            }
        })
        .collect()
}
