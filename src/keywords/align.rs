// Three-way keyword alignment.
//
// Each source's list is treated as a set. Every distinct keyword falls into
// exactly one of seven categories depending on which sources contain it:
//
//   All, Manual+GPT, Manual+Gemini, GPT+Gemini, Manual only, GPT only, Gemini only
//
// Rows are emitted grouped by category in that order. Within a category,
// keywords appear in first-seen order over Manual, then GPT, then Gemini, so
// the table is a pure function of the three input lists.

use std::collections::HashSet;
use std::str::FromStr;

use serde::Serialize;

use super::{Source, SENTINEL};

/// How the `"-"` placeholder takes part in set membership.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentinelMode {
    /// `"-"` is an ordinary keyword. Empty fields from several sources
    /// collapse into one shared `-` row.
    #[default]
    Legacy,
    /// `"-"` is never a keyword, so no row is made only of placeholders.
    Exclude,
}

impl FromStr for SentinelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(SentinelMode::Legacy),
            "exclude" => Ok(SentinelMode::Exclude),
            other => Err(format!(
                "unknown sentinel mode '{other}' (expected 'legacy' or 'exclude')"
            )),
        }
    }
}

/// Membership class of a keyword across the three sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    All,
    ManualGpt,
    ManualGemini,
    GptGemini,
    ManualOnly,
    GptOnly,
    GeminiOnly,
}

impl Category {
    /// Emission order of categories in an alignment table.
    pub const ORDER: [Category; 7] = [
        Category::All,
        Category::ManualGpt,
        Category::ManualGemini,
        Category::GptGemini,
        Category::ManualOnly,
        Category::GptOnly,
        Category::GeminiOnly,
    ];

    fn from_membership(manual: bool, gpt: bool, gemini: bool) -> Option<Category> {
        match (manual, gpt, gemini) {
            (true, true, true) => Some(Category::All),
            (true, true, false) => Some(Category::ManualGpt),
            (true, false, true) => Some(Category::ManualGemini),
            (false, true, true) => Some(Category::GptGemini),
            (true, false, false) => Some(Category::ManualOnly),
            (false, true, false) => Some(Category::GptOnly),
            (false, false, true) => Some(Category::GeminiOnly),
            (false, false, false) => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Category::All => 0,
            Category::ManualGpt => 1,
            Category::ManualGemini => 2,
            Category::GptGemini => 3,
            Category::ManualOnly => 4,
            Category::GptOnly => 5,
            Category::GeminiOnly => 6,
        }
    }

    /// Whether keywords of this category are present in `source`.
    pub fn contains(self, source: Source) -> bool {
        matches!(
            (self, source),
            (Category::All, _)
                | (Category::ManualGpt, Source::Manual | Source::Gpt)
                | (Category::ManualGemini, Source::Manual | Source::Gemini)
                | (Category::GptGemini, Source::Gpt | Source::Gemini)
                | (Category::ManualOnly, Source::Manual)
                | (Category::GptOnly, Source::Gpt)
                | (Category::GeminiOnly, Source::Gemini)
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::All => "All three",
            Category::ManualGpt => "Manual + GPT",
            Category::ManualGemini => "Manual + Gemini",
            Category::GptGemini => "GPT + Gemini",
            Category::ManualOnly => "Manual only",
            Category::GptOnly => "GPT only",
            Category::GeminiOnly => "Gemini only",
        }
    }
}

/// One line of the comparison: the keyword in the columns of the sources
/// that contain it, `"-"` everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlignmentRow {
    pub manual: String,
    pub gpt: String,
    pub gemini: String,
    pub category: Category,
}

impl AlignmentRow {
    fn new(keyword: &str, category: Category) -> Self {
        let cell = |source| {
            if category.contains(source) {
                keyword.to_string()
            } else {
                SENTINEL.to_string()
            }
        };
        Self {
            manual: cell(Source::Manual),
            gpt: cell(Source::Gpt),
            gemini: cell(Source::Gemini),
            category,
        }
    }

    pub fn cell(&self, source: Source) -> &str {
        match source {
            Source::Manual => &self.manual,
            Source::Gpt => &self.gpt,
            Source::Gemini => &self.gemini,
        }
    }

    /// Cells in column order: Manual, GPT, Gemini.
    pub fn cells(&self) -> [&str; 3] {
        [&self.manual, &self.gpt, &self.gemini]
    }
}

/// Ordered, immutable result of an alignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AlignmentTable {
    rows: Vec<AlignmentRow>,
}

impl AlignmentTable {
    pub fn rows(&self) -> &[AlignmentRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All cells of one source's column, top to bottom.
    pub fn column(&self, source: Source) -> Vec<&str> {
        self.rows.iter().map(|r| r.cell(source)).collect()
    }

    /// Number of rows per category, in emission order. Empty categories
    /// are included with a count of zero.
    pub fn category_counts(&self) -> Vec<(Category, usize)> {
        Category::ORDER
            .iter()
            .map(|c| (*c, self.rows.iter().filter(|r| r.category == *c).count()))
            .collect()
    }

    /// Fraction of rows on which all three sources agree. 0.0 for an empty table.
    pub fn agreement(&self) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        let shared = self
            .rows
            .iter()
            .filter(|r| r.category == Category::All)
            .count();
        shared as f64 / self.rows.len() as f64
    }
}

/// Aligner with an explicit sentinel policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordAligner {
    pub sentinel: SentinelMode,
}

impl KeywordAligner {
    pub fn new(sentinel: SentinelMode) -> Self {
        Self { sentinel }
    }

    /// Partition the keywords of three sources into an alignment table.
    ///
    /// Total: any three lists, including empty ones, produce a table.
    pub fn align(&self, manual: &[String], gpt: &[String], gemini: &[String]) -> AlignmentTable {
        let keep = |kw: &&String| self.sentinel == SentinelMode::Legacy || kw.as_str() != SENTINEL;

        let manual_set: HashSet<&str> = manual.iter().filter(keep).map(String::as_str).collect();
        let gpt_set: HashSet<&str> = gpt.iter().filter(keep).map(String::as_str).collect();
        let gemini_set: HashSet<&str> = gemini.iter().filter(keep).map(String::as_str).collect();

        let mut buckets: [Vec<&str>; 7] = Default::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for kw in manual.iter().chain(gpt).chain(gemini).filter(keep) {
            let kw = kw.as_str();
            if !seen.insert(kw) {
                continue;
            }
            let category = Category::from_membership(
                manual_set.contains(kw),
                gpt_set.contains(kw),
                gemini_set.contains(kw),
            );
            if let Some(category) = category {
                buckets[category.index()].push(kw);
            }
        }

        let rows = Category::ORDER
            .iter()
            .flat_map(|category| {
                buckets[category.index()]
                    .iter()
                    .map(move |kw| AlignmentRow::new(kw, *category))
            })
            .collect();

        AlignmentTable { rows }
    }
}

/// Align with the default (legacy) sentinel handling.
pub fn align(manual: &[String], gpt: &[String], gemini: &[String]) -> AlignmentTable {
    KeywordAligner::default().align(manual, gpt, gemini)
}
