//! Documentation run
//!
//! Walks every selected database and table in order and produces one report
//! per table. Failures are contained at the smallest scope: a database whose
//! tables cannot be listed is skipped, a table whose columns cannot be read is
//! skipped, and a table whose sample fails is still documented.

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, error, info, warn};

use crate::config::RunConfig;
use crate::introspect::{Catalog, DatabaseFilter};
use crate::pii::PiiDetector;
use crate::prelude::DataDictError;
use crate::report::{write_report, MarkdownRenderer, TableReport};
use crate::schema::{choose_ordering_column, SampleData, TableDescriptor};

/// Source of the generation timestamp embedded in reports
pub type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub databases: usize,
    pub databases_failed: usize,
    pub reports_written: usize,
    pub tables_skipped: usize,
    pub samples_unavailable: usize,
    pub written: Vec<PathBuf>,
}

struct TableOutcome {
    path: PathBuf,
    sample_collected: bool,
}

/// Drives introspection, rendering and writing for one run
pub struct Pipeline<'a> {
    config: &'a RunConfig,
    filter: DatabaseFilter,
    renderer: MarkdownRenderer,
    pii: Option<PiiDetector>,
    clock: Clock,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a RunConfig) -> Self {
        Self {
            config,
            filter: DatabaseFilter::new(config.database_filter.clone()),
            renderer: MarkdownRenderer::new(config.output_dir.clone()),
            pii: config.pii_protection.then(PiiDetector::new),
            clock: Box::new(|| Local::now().naive_local()),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Document every selected table
    ///
    /// Only a failure to enumerate databases is returned as an error; all
    /// narrower failures are logged and counted in the summary.
    pub async fn run<C: Catalog>(&self, catalog: &mut C) -> Result<RunSummary, DataDictError> {
        let databases = catalog.list_databases(&self.filter).await?;
        let names: Vec<&str> = databases.iter().map(|db| db.name.as_str()).collect();
        info!(count = databases.len(), databases = ?names, "Found user databases");

        let mut summary = RunSummary {
            databases: databases.len(),
            ..RunSummary::default()
        };

        for database in &databases {
            info!(database = ?database.name, "Processing database");

            let tables = match catalog.list_tables(&database.name).await {
                Ok(tables) => tables,
                Err(e) => {
                    error!(database = ?database.name, error = %e, "Skipping database");
                    summary.databases_failed += 1;
                    continue;
                }
            };

            if tables.is_empty() {
                info!(database = ?database.name, "No tables found");
                continue;
            }
            debug!(database = ?database.name, count = tables.len(), "Found tables");

            for table in &tables {
                match self.document_table(catalog, table).await {
                    Ok(outcome) => {
                        info!(path = ?outcome.path, "Created report");
                        if !outcome.sample_collected {
                            summary.samples_unavailable += 1;
                        }
                        summary.reports_written += 1;
                        summary.written.push(outcome.path);
                    }
                    Err(e) => {
                        error!(
                            database = ?table.database,
                            table = ?table.name,
                            error = %e,
                            "Skipping table"
                        );
                        summary.tables_skipped += 1;
                    }
                }
            }
        }

        info!(
            databases = summary.databases,
            databases_failed = summary.databases_failed,
            reports_written = summary.reports_written,
            tables_skipped = summary.tables_skipped,
            samples_unavailable = summary.samples_unavailable,
            output = ?self.config.output_dir,
            "Data dictionary generation complete"
        );

        Ok(summary)
    }

    async fn document_table<C: Catalog>(
        &self,
        catalog: &mut C,
        table: &TableDescriptor,
    ) -> Result<TableOutcome, DataDictError> {
        debug!(database = ?table.database, table = ?table.name, "Processing table");

        let columns = catalog.describe_columns(&table.database, &table.name).await?;

        let ordering = choose_ordering_column(&columns);
        match ordering {
            Some(column) => debug!(table = ?table.name, column = ?column, "Sampling newest rows"),
            None => debug!(
                table = ?table.name,
                "No ordering column, sample order is server-defined"
            ),
        }

        let limit = self.config.sample_limit;
        let mut sample = match catalog
            .fetch_sample(&table.database, &table.name, ordering, limit)
            .await
        {
            Ok(mut rows) => {
                rows.rows.truncate(limit);
                SampleData::Collected(rows)
            }
            Err(e) => {
                warn!(
                    database = ?table.database,
                    table = ?table.name,
                    error = %e,
                    "Could not sample rows, writing report without sample data"
                );
                let reason = match e {
                    DataDictError::Inspection { message, .. } => message,
                    other => other.to_string(),
                };
                SampleData::Unavailable { reason }
            }
        };
        let sample_collected = matches!(sample, SampleData::Collected(_));

        let pii_columns = self.pii.as_ref().map(|detector| {
            if let SampleData::Collected(rows) = &mut sample {
                let masked = detector.mask_sample(rows);
                if !masked.is_empty() {
                    info!(table = ?table.name, columns = ?masked, "Masked PII columns");
                }
            }
            detector.pii_columns(columns.iter().map(|col| col.name.as_str()))
        });

        let report = TableReport {
            table,
            columns: &columns,
            sample: &sample,
            pii_columns: pii_columns.as_deref(),
        };
        let rendered = self.renderer.render(&report, (self.clock)())?;
        write_report(&rendered)?;

        Ok(TableOutcome {
            path: rendered.path,
            sample_collected,
        })
    }
}
