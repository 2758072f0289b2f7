// Error taxonomy for the record store and session operations.
//
// The aligner itself never fails. Everything here comes from the I/O glue
// around it: a bad upload, an unknown activity, or an export requested
// before anything was compared.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompareError {
    /// The upload could not be read as a workbook with the expected columns.
    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    /// The dataset is missing a required column.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// No row in the dataset has the requested Activity ID.
    #[error("activity not found: {0}")]
    NotFound(String),

    /// A comparison was requested before any file was uploaded.
    #[error("no dataset loaded")]
    NoDataset,

    /// Export was requested before any alignment was computed.
    #[error("no comparison has been computed yet")]
    NoPriorComparison,
}

impl From<calamine::Error> for CompareError {
    fn from(e: calamine::Error) -> Self {
        CompareError::InvalidUpload(e.to_string())
    }
}
