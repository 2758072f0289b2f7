// Record store: the uploaded activity spreadsheet.
//
// The first worksheet is read with calamine. Its first row is the header;
// the five required columns are located by name and anything else is
// ignored. Keyword cells stay as raw comma-separated strings here and are
// only normalized when a comparison is requested.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader};
use serde::Serialize;

use crate::error::CompareError;

pub const COL_ACTIVITY_ID: &str = "Activity ID";
pub const COL_ACTIVITY_NAME: &str = "Activity Name";
pub const COL_MANUAL: &str = "Lemmatized Manual Keywords";
pub const COL_GPT: &str = "Lemmatized Keywords by GPT";
pub const COL_GEMINI: &str = "Lemmatized Keywords by Gemini";

pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_ACTIVITY_ID,
    COL_ACTIVITY_NAME,
    COL_MANUAL,
    COL_GPT,
    COL_GEMINI,
];

/// Activity ID of the summary row, kept in the dataset but not offered
/// for selection.
pub const AVERAGES_ID: &str = "Averages";

/// One activity with its three raw keyword fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityRecord {
    pub activity_id: String,
    pub activity_name: String,
    pub manual_raw: String,
    pub gpt_raw: String,
    pub gemini_raw: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dataset {
    records: Vec<ActivityRecord>,
}

impl Dataset {
    /// Build a dataset from a header row and data rows of stringified cells.
    ///
    /// Rows shorter than the header are padded with empty cells. Rows without
    /// an Activity ID can't be selected or looked up and are skipped.
    pub fn from_rows<H, R>(header: &[H], rows: R) -> Result<Self, CompareError>
    where
        H: AsRef<str>,
        R: IntoIterator<Item = Vec<String>>,
    {
        let position = |name: &str| {
            header
                .iter()
                .position(|h| h.as_ref().trim() == name)
                .ok_or_else(|| CompareError::MissingColumn(name.to_string()))
        };
        let id_col = position(COL_ACTIVITY_ID)?;
        let name_col = position(COL_ACTIVITY_NAME)?;
        let manual_col = position(COL_MANUAL)?;
        let gpt_col = position(COL_GPT)?;
        let gemini_col = position(COL_GEMINI)?;

        let records = rows
            .into_iter()
            .filter(|row| row.get(id_col).is_some_and(|id| !id.trim().is_empty()))
            .map(|row| {
                let cell = |i: usize| row.get(i).cloned().unwrap_or_default();
                ActivityRecord {
                    activity_id: cell(id_col).trim().to_string(),
                    activity_name: cell(name_col),
                    manual_raw: cell(manual_col),
                    gpt_raw: cell(gpt_col),
                    gemini_raw: cell(gemini_col),
                }
            })
            .collect();

        Ok(Self { records })
    }

    /// Parse an uploaded workbook (XLSX, XLS, XLSB or ODS) from memory.
    ///
    /// Any parse failure or missing column is reported as `InvalidUpload`.
    pub fn from_workbook_bytes(bytes: &[u8]) -> Result<Self, CompareError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| CompareError::InvalidUpload("workbook has no sheets".to_string()))?;
        let range = workbook.worksheet_range(&sheet)?;
        Self::from_range(&range).map_err(into_invalid_upload)
    }

    /// Read a workbook from disk. Used by the CLI.
    pub fn from_path(path: &Path) -> Result<Self, CompareError> {
        let mut workbook = open_workbook_auto(path)?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| CompareError::InvalidUpload("workbook has no sheets".to_string()))?;
        let range = workbook.worksheet_range(&sheet)?;
        Self::from_range(&range).map_err(into_invalid_upload)
    }

    fn from_range(range: &Range<Data>) -> Result<Self, CompareError> {
        let mut rows = range.rows();
        let header: Vec<String> = rows
            .next()
            .ok_or_else(|| CompareError::InvalidUpload("worksheet is empty".to_string()))?
            .iter()
            .map(cell_to_string)
            .collect();
        let data = rows.map(|row| row.iter().map(cell_to_string).collect::<Vec<_>>());
        Self::from_rows(&header, data)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Selectable activity IDs in file order, without the `Averages` row.
    pub fn activity_ids(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| r.activity_id != AVERAGES_ID)
            .map(|r| r.activity_id.clone())
            .collect()
    }

    /// First record whose Activity ID equals `activity_id` (surrounding
    /// whitespace ignored).
    pub fn find_record(&self, activity_id: &str) -> Result<&ActivityRecord, CompareError> {
        let wanted = activity_id.trim();
        self.records
            .iter()
            .find(|r| r.activity_id == wanted)
            .ok_or_else(|| CompareError::NotFound(wanted.to_string()))
    }
}

fn into_invalid_upload(e: CompareError) -> CompareError {
    match e {
        CompareError::InvalidUpload(_) => e,
        other => CompareError::InvalidUpload(other.to_string()),
    }
}

/// Stringify a worksheet cell. Integral floats drop their fractional part so
/// numeric activity IDs compare equal to what the user typed.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{:.0}", f)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => {
            if *b {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        Data::Error(e) => format!("#ERROR: {:?}", e),
        Data::DateTime(dt) => format!("{}", dt),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}
