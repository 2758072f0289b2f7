// Keyword handling: normalization of raw annotation fields and the
// three-way alignment that turns them into a comparison table.

pub mod align;
pub mod normalize;

use serde::Serialize;

/// Placeholder for an absent or empty keyword slot.
pub const SENTINEL: &str = "-";

/// The three annotation sources, in table column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Source {
    Manual,
    Gpt,
    Gemini,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Manual, Source::Gpt, Source::Gemini];

    /// Column header used in every rendering (CSV, terminal, HTML).
    pub fn label(self) -> &'static str {
        match self {
            Source::Manual => "Manual",
            Source::Gpt => "GPT",
            Source::Gemini => "Gemini",
        }
    }
}
