// Per-user session state and the three user-facing operations:
// load a dataset, compare one activity, export the last comparison.
//
// A SessionContext is passed explicitly into each operation. Its lifetime
// is owned by the caller: the web layer keeps one per browser session, the
// CLI builds one per invocation.

use serde::Serialize;
use tracing::info;

use crate::dataset::Dataset;
use crate::error::CompareError;
use crate::keywords::align::{AlignmentTable, KeywordAligner};
use crate::keywords::normalize::normalize;
use crate::output::csv::{export_csv, export_filename};

/// One computed alignment together with the activity it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub activity_id: String,
    pub activity_name: String,
    pub table: AlignmentTable,
}

/// A ready-to-send CSV export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    pub dataset: Option<Dataset>,
    pub last_comparison: Option<Comparison>,
}

impl SessionContext {
    /// Replace the session's dataset with a freshly parsed workbook and
    /// return the selectable activity IDs.
    ///
    /// A new dataset invalidates any previous comparison.
    pub fn load_workbook(&mut self, bytes: &[u8]) -> Result<Vec<String>, CompareError> {
        let dataset = Dataset::from_workbook_bytes(bytes)?;
        Ok(self.set_dataset(dataset))
    }

    /// Install an already-parsed dataset and return its selectable IDs.
    pub fn set_dataset(&mut self, dataset: Dataset) -> Vec<String> {
        let ids = dataset.activity_ids();
        info!(
            records = dataset.len(),
            selectable = ids.len(),
            "Dataset loaded"
        );
        self.dataset = Some(dataset);
        self.last_comparison = None;
        ids
    }

    /// Selectable activity IDs of the loaded dataset, if any.
    pub fn activity_ids(&self) -> Option<Vec<String>> {
        self.dataset.as_ref().map(Dataset::activity_ids)
    }

    /// Align the three keyword fields of one activity and remember the
    /// result for a later export.
    pub fn compare(
        &mut self,
        activity_id: &str,
        aligner: &KeywordAligner,
    ) -> Result<&Comparison, CompareError> {
        let dataset = self.dataset.as_ref().ok_or(CompareError::NoDataset)?;
        let record = dataset.find_record(activity_id)?;

        let table = aligner.align(
            &normalize(&record.manual_raw),
            &normalize(&record.gpt_raw),
            &normalize(&record.gemini_raw),
        );

        info!(
            activity_id = %record.activity_id,
            rows = table.len(),
            "Comparison computed"
        );

        let comparison = Comparison {
            activity_id: record.activity_id.clone(),
            activity_name: record.activity_name.clone(),
            table,
        };
        Ok(self.last_comparison.insert(comparison))
    }

    /// CSV of the most recent comparison.
    pub fn export(&self) -> Result<CsvExport, CompareError> {
        let comparison = self
            .last_comparison
            .as_ref()
            .ok_or(CompareError::NoPriorComparison)?;
        Ok(CsvExport {
            filename: export_filename(&comparison.activity_id),
            bytes: export_csv(&comparison.table),
        })
    }
}
