// keyalign: three-way keyword alignment for annotated activity spreadsheets.
//
// This is the library root. The aligner in `keywords` is the core; the
// other modules load spreadsheets, hold per-user session state, and render
// or serve the resulting tables.

pub mod config;
pub mod dataset;
pub mod error;
pub mod keywords;
pub mod output;
pub mod session;

#[cfg(feature = "web")]
pub mod web;
