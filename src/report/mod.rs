//! Report generation
//!
//! This module turns the inspected metadata of one table into a markdown
//! document and writes it to the output directory.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::prelude::{ColumnDescriptor, DataDictError, SampleData, TableDescriptor};

pub mod markdown;

pub use markdown::MarkdownRenderer;

/// Everything known about one table at render time
#[derive(Debug, Clone, Copy)]
pub struct TableReport<'a> {
    pub table: &'a TableDescriptor,
    pub columns: &'a [ColumnDescriptor],
    pub sample: &'a SampleData,
    /// Columns flagged as personal data; `None` when PII protection is off
    pub pii_columns: Option<&'a [String]>,
}

/// A rendered document and the file it belongs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub path: PathBuf,
    pub content: String,
}

/// File name for a table's report: `<database>.<table>.md`
///
/// Path separators are replaced so the report always lands directly in the
/// output directory.
pub fn report_file_name(table: &TableDescriptor) -> String {
    let sanitize = |s: &str| s.replace(['/', '\\'], "_");
    format!("{}.{}.md", sanitize(&table.database), sanitize(&table.name))
}

/// Write a report, creating the output directory and replacing any previous file
pub fn write_report(report: &RenderedReport) -> Result<(), DataDictError> {
    if let Some(parent) = report.path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(&report.path, &report.content)?;
    debug!(path = ?report.path, bytes = report.content.len(), "Wrote report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(database: &str, name: &str) -> TableDescriptor {
        TableDescriptor {
            database: database.to_string(),
            name: name.to_string(),
            comment: None,
            row_count: Some(0),
        }
    }

    #[test]
    fn test_report_file_name() {
        assert_eq!(report_file_name(&table("shop", "users")), "shop.users.md");
        assert_eq!(report_file_name(&table("shop", "a/b")), "shop.a_b.md");
    }

    #[test]
    fn test_write_report_creates_directories_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/shop.users.md");

        let first = RenderedReport {
            path: path.clone(),
            content: "first run, longer content".to_string(),
        };
        write_report(&first).unwrap();

        let second = RenderedReport {
            path: path.clone(),
            content: "second".to_string(),
        };
        write_report(&second).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
    }

    #[test]
    fn test_write_report_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let report = RenderedReport {
            path: blocker.join("shop.users.md"),
            content: "x".to_string(),
        };

        let err = write_report(&report).unwrap_err();
        assert!(matches!(err, DataDictError::Output(_)));
        assert!(!err.is_fatal());
    }
}
