//! Conversions between the collection and its external representations.
//!
//! - [`structured`]: the full-fidelity JSON format, used for export, merge
//!   import, replace import, and the store's own blob.
//! - [`spreadsheet`]: one-way import of a workbook's first sheet.

pub mod spreadsheet;
pub mod structured;

use std::path::Path;

/// How an import file is applied to the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// Append structured records after the existing ones
    Merge,
    /// Discard the existing collection in favour of the file's records
    Replace,
    /// Convert spreadsheet rows and append them
    Spreadsheet,
}

impl ImportKind {
    /// Guess the kind from a file extension: workbooks are spreadsheet
    /// imports, anything else is a merge. Replace is never guessed.
    pub fn detect(path: &Path) -> ImportKind {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("xlsx" | "xlsm" | "xls" | "ods") => ImportKind::Spreadsheet,
            _ => ImportKind::Merge,
        }
    }

    pub fn is_destructive(&self) -> bool {
        matches!(self, ImportKind::Replace)
    }
}
