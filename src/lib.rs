//! # datadict
//!
//! Generate a markdown data dictionary from a MySQL server
//!
//! This crate provides a CLI tool and library for walking a server's catalog
//! and writing one document per table with its columns and a few sample rows.

pub mod config;
pub mod error;
pub mod introspect;
pub mod pii;
pub mod pipeline;
pub mod report;
pub mod schema;

pub mod prelude {
    pub use crate::config::RunConfig;
    pub use crate::error::DataDictError;
    pub use crate::introspect::{Catalog, DatabaseFilter};
    pub use crate::pipeline::{Pipeline, RunSummary};
    pub use crate::report::{MarkdownRenderer, RenderedReport, TableReport};
    pub use crate::schema::{
        ColumnDescriptor, DatabaseHandle, KeyKind, SampleData, SampleRowSet, SampleValue,
        TableDescriptor,
    };
}

#[cfg(feature = "mysql")]
pub use introspect::MySqlCatalog;
