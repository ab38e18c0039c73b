//! Markdown renderer
//!
//! Renders one table report from the embedded `table.md` template.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use minijinja::Environment;
use tracing::debug;

use super::{report_file_name, RenderedReport, TableReport};
use crate::error::DataDictError;
use crate::schema::{SampleCell, SampleData};

/// Longest free-text sample value shown before truncation
const MAX_CELL_CHARS: usize = 50;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Markdown report renderer
pub struct MarkdownRenderer {
    env: Environment<'static>,
    output_dir: PathBuf,
}

impl MarkdownRenderer {
    pub fn new(output_dir: PathBuf) -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);

        env.add_template("table.md", include_str!("templates/table.md.jinja"))
            .expect("Failed to load markdown table template");

        Self { env, output_dir }
    }

    /// Render a table report
    ///
    /// The output depends only on the inputs; `generated_at` is the single
    /// time-dependent value.
    pub fn render(
        &self,
        report: &TableReport<'_>,
        generated_at: NaiveDateTime,
    ) -> Result<RenderedReport, DataDictError> {
        let table = report.table;
        let render_error = |message: String| DataDictError::Render {
            table: table.qualified_name(),
            message,
        };

        let template = self
            .env
            .get_template("table.md")
            .map_err(|e| render_error(format!("Template error: {}", e)))?;

        let columns: Vec<_> = report
            .columns
            .iter()
            .map(|col| {
                minijinja::context! {
                    name => escape_cell(&col.name),
                    data_type => escape_cell(&col.data_type),
                    nullable => if col.is_nullable { "Yes" } else { "No" },
                    key => or_dash(col.key.as_str()),
                    default => col
                        .default
                        .as_deref()
                        .map(escape_cell)
                        .unwrap_or_else(|| "-".to_string()),
                    extra => or_dash(&escape_cell(&col.extra)),
                }
            })
            .collect();

        let (sample_header, sample_rows, sample_note) = match report.sample {
            SampleData::Collected(sample) => (
                sample.columns.iter().map(|c| escape_cell(c)).collect::<Vec<_>>(),
                sample
                    .rows
                    .iter()
                    .map(|row| row.iter().map(format_cell).collect::<Vec<_>>())
                    .collect::<Vec<_>>(),
                None,
            ),
            SampleData::Unavailable { reason } => {
                (Vec::new(), Vec::new(), Some(escape_cell(reason)))
            }
        };
        let sample_separator = vec!["---"; sample_header.len()];

        let ctx = minijinja::context! {
            database => &table.database,
            table => &table.name,
            generated_at => generated_at.format(TIMESTAMP_FORMAT).to_string(),
            pii_enabled => report.pii_columns.is_some(),
            pii_columns => report.pii_columns.unwrap_or_default(),
            description => table.comment.as_deref().map(escape_cell),
            row_count => table
                .row_count
                .map(format_thousands)
                .unwrap_or_else(|| "unknown".to_string()),
            columns => columns,
            sample_count => sample_rows.len(),
            sample_header => sample_header,
            sample_separator => sample_separator,
            sample_rows => sample_rows,
            sample_note => sample_note,
        };

        let content = template
            .render(ctx)
            .map_err(|e| render_error(format!("Render error: {}", e)))?;

        let path = self.output_dir.join(report_file_name(table));
        debug!(table = ?table.qualified_name(), path = ?path, "Rendered report");

        Ok(RenderedReport { path, content })
    }
}

/// Make a value safe inside a markdown table cell
fn escape_cell(value: &str) -> String {
    value
        .replace("\r\n", " ")
        .replace(['\r', '\n'], " ")
        .replace('|', "\\|")
}

/// Escape a sample cell, shortening long free text
fn format_cell(cell: &SampleCell) -> String {
    if cell.is_text && cell.text.chars().count() > MAX_CELL_CHARS {
        let head: String = cell.text.chars().take(MAX_CELL_CHARS - 3).collect();
        return format!("{}...", escape_cell(&head));
    }
    escape_cell(&cell.text)
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}

/// `1234567` -> `1,234,567`
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
