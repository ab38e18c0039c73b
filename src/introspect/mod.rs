//! Catalog introspection
//!
//! This module provides functionality for reading databases, tables, columns
//! and sample rows from a server catalog. The MySQL implementation lives in a
//! feature-gated submodule.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::prelude::{
    ColumnDescriptor, DataDictError, DatabaseHandle, SampleRowSet, TableDescriptor,
};

/// Databases created and used by the server itself
pub const SYSTEM_DATABASES: &[&str] =
    &["information_schema", "mysql", "performance_schema", "sys"];

pub fn is_system_database(name: &str) -> bool {
    SYSTEM_DATABASES
        .iter()
        .any(|system| system.eq_ignore_ascii_case(name))
}

/// Database selection applied during enumeration
#[derive(Debug, Default, Clone)]
pub struct DatabaseFilter {
    /// Only include these databases (all when empty)
    pub include: Vec<String>,
}

impl DatabaseFilter {
    pub fn new(include: Vec<String>) -> Self {
        Self { include }
    }

    /// Check if a database should be documented
    pub fn should_include(&self, database: &str) -> bool {
        if is_system_database(database) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|name| name == database)
    }

    /// Requested names that the server did not report
    pub fn missing<'a>(&'a self, found: &[String]) -> Vec<&'a str> {
        self.include
            .iter()
            .filter(|name| !found.contains(name))
            .map(String::as_str)
            .collect()
    }
}

/// Read-only access to a server catalog
///
/// Every method issues independent queries so a failure only affects the
/// database or table it was called for.
#[async_trait]
pub trait Catalog: Send {
    /// All database names reported by the server, system databases included
    async fn database_names(&mut self) -> Result<Vec<String>, DataDictError>;

    /// Tables of one database with comments and row counts
    async fn list_tables(&mut self, database: &str) -> Result<Vec<TableDescriptor>, DataDictError>;

    /// Column definitions in ordinal order
    async fn describe_columns(
        &mut self,
        database: &str,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>, DataDictError>;

    /// Up to `limit` rows, newest first when `ordering` is given
    async fn fetch_sample(
        &mut self,
        database: &str,
        table: &str,
        ordering: Option<&str>,
        limit: usize,
    ) -> Result<SampleRowSet, DataDictError>;

    /// User databases selected by `filter`, sorted by name
    async fn list_databases(
        &mut self,
        filter: &DatabaseFilter,
    ) -> Result<Vec<DatabaseHandle>, DataDictError> {
        let all = self.database_names().await?;
        debug!(count = ?all.len(), "Found databases");

        for name in filter.missing(&all) {
            warn!(database = ?name, "Requested database not found on server, skipping");
        }

        let mut names: Vec<String> = all
            .into_iter()
            .filter(|name| filter.should_include(name))
            .collect();
        names.sort();
        names.dedup();
        debug!(count = ?names.len(), "Databases after filtering");

        Ok(names
            .into_iter()
            .map(|name| DatabaseHandle { name })
            .collect())
    }
}

/// Quote an identifier with backticks, doubling embedded backticks
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

// Feature-gated database implementations
#[cfg(feature = "mysql")]
mod mysql;

#[cfg(feature = "mysql")]
pub use mysql::MySqlCatalog;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_databases_never_included() {
        let filter = DatabaseFilter::new(vec!["mysql".into(), "shop".into()]);
        assert!(!filter.should_include("mysql"));
        assert!(!filter.should_include("INFORMATION_SCHEMA"));
        assert!(filter.should_include("shop"));
        assert!(!filter.should_include("billing"));
    }

    #[test]
    fn test_empty_filter_includes_user_databases() {
        let filter = DatabaseFilter::default();
        assert!(filter.should_include("shop"));
        assert!(!filter.should_include("sys"));
        assert!(!filter.should_include("performance_schema"));
    }

    #[test]
    fn test_missing_names() {
        let filter = DatabaseFilter::new(vec!["a".into(), "b".into()]);
        let found = vec!["b".to_string(), "c".to_string()];
        assert_eq!(filter.missing(&found), vec!["a"]);
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("users"), "`users`");
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }
}
