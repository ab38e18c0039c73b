//! Catalog data structures
//!
//! These types describe what the catalog reports about a table and its rows.
//! They form the contract between introspection (produces) and report
//! rendering (consumes).

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// A user database on the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseHandle {
    pub name: String,
}

/// Database table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    pub database: String,
    pub name: String,
    pub comment: Option<String>,
    /// Row count at inspection time; `None` when counting failed
    pub row_count: Option<u64>,
}

impl TableDescriptor {
    /// `<database>.<table>`, as used for titles and file names
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.database, self.name)
    }
}

/// Key classification reported by the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyKind {
    #[default]
    None,
    Primary,
    Unique,
    /// Non-unique index
    Multiple,
}

impl KeyKind {
    /// Parse the catalog `COLUMN_KEY` value
    pub fn from_catalog(key: &str) -> Self {
        match key.trim().to_uppercase().as_str() {
            "PRI" => KeyKind::Primary,
            "UNI" => KeyKind::Unique,
            "MUL" => KeyKind::Multiple,
            _ => KeyKind::None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyKind::None => "",
            KeyKind::Primary => "PRI",
            KeyKind::Unique => "UNI",
            KeyKind::Multiple => "MUL",
        }
    }
}

/// A table column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Declared type, e.g. `varchar(50)` or `int unsigned`
    pub data_type: String,
    pub is_nullable: bool,
    pub key: KeyKind,
    /// Literal catalog default, `None` when the column has no default
    pub default: Option<String>,
    /// Extra attributes, e.g. `auto_increment`
    pub extra: String,
}

impl ColumnDescriptor {
    pub fn is_auto_increment(&self) -> bool {
        self.extra.to_lowercase().contains("auto_increment")
    }
}

/// Pick the column used to find the most recent rows
///
/// Priority: the single-column primary key, then the first auto-increment
/// column in ordinal order. Composite primary keys do not qualify.
pub fn choose_ordering_column(columns: &[ColumnDescriptor]) -> Option<&str> {
    let mut primary = columns.iter().filter(|col| col.key == KeyKind::Primary);
    if let (Some(pk), None) = (primary.next(), primary.next()) {
        return Some(pk.name.as_str());
    }

    columns
        .iter()
        .find(|col| col.is_auto_increment())
        .map(|col| col.name.as_str())
}

/// A single value read from a sampled row
#[derive(Debug, Clone, PartialEq)]
pub enum SampleValue {
    Null,
    Text(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
    /// Numeric kept in its textual form
    Decimal(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    /// Zero or out-of-range temporal value, kept as the server prints it
    Temporal(String),
    Binary { len: usize },
}

/// Display form of SQL NULL in sample tables
pub const NULL_MARKER: &str = "NULL";

impl SampleValue {
    /// Render the value for the report
    pub fn to_display(&self) -> String {
        match self {
            SampleValue::Null => NULL_MARKER.to_string(),
            SampleValue::Text(s) | SampleValue::Decimal(s) | SampleValue::Temporal(s) => s.clone(),
            SampleValue::Integer(n) => n.to_string(),
            SampleValue::Unsigned(n) => n.to_string(),
            SampleValue::Float(f) => f.to_string(),
            SampleValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            SampleValue::Time(t) => t.format("%H:%M:%S").to_string(),
            SampleValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            SampleValue::Binary { len } => format!("<binary {} bytes>", len),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SampleValue::Null)
    }

    /// Free text that may need truncation in table cells
    pub fn is_text(&self) -> bool {
        matches!(self, SampleValue::Text(_))
    }
}

/// A sampled cell: display string plus whether it came from free text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleCell {
    pub text: String,
    pub is_text: bool,
    pub is_null: bool,
}

impl From<&SampleValue> for SampleCell {
    fn from(value: &SampleValue) -> Self {
        Self {
            text: value.to_display(),
            is_text: value.is_text(),
            is_null: value.is_null(),
        }
    }
}

/// Rows sampled from one table, in the order the sampler returned them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleRowSet {
    /// Column names in query order
    pub columns: Vec<String>,
    pub rows: Vec<Vec<SampleCell>>,
}

impl SampleRowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, values: &[SampleValue]) {
        self.rows.push(values.iter().map(SampleCell::from).collect());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Outcome of sampling a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleData {
    Collected(SampleRowSet),
    /// The sample query failed; the report carries the reason instead
    Unavailable { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, key: KeyKind, extra: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            data_type: "int".to_string(),
            is_nullable: false,
            key,
            default: None,
            extra: extra.to_string(),
        }
    }

    #[test]
    fn test_key_kind_from_catalog() {
        assert_eq!(KeyKind::from_catalog("PRI"), KeyKind::Primary);
        assert_eq!(KeyKind::from_catalog("UNI"), KeyKind::Unique);
        assert_eq!(KeyKind::from_catalog("MUL"), KeyKind::Multiple);
        assert_eq!(KeyKind::from_catalog(""), KeyKind::None);
        assert_eq!(KeyKind::Multiple.as_str(), "MUL");
    }

    #[test]
    fn test_ordering_prefers_single_primary_key() {
        let columns = vec![
            column("seq", KeyKind::None, "auto_increment"),
            column("code", KeyKind::Primary, ""),
        ];
        assert_eq!(choose_ordering_column(&columns), Some("code"));
    }

    #[test]
    fn test_ordering_composite_key_falls_back_to_auto_increment() {
        let columns = vec![
            column("tenant_id", KeyKind::Primary, ""),
            column("order_id", KeyKind::Primary, ""),
            column("line", KeyKind::None, "auto_increment"),
            column("other", KeyKind::None, "auto_increment"),
        ];
        assert_eq!(choose_ordering_column(&columns), Some("line"));
    }

    #[test]
    fn test_ordering_none() {
        let columns = vec![
            column("a", KeyKind::Unique, ""),
            column("b", KeyKind::Multiple, "DEFAULT_GENERATED"),
        ];
        assert_eq!(choose_ordering_column(&columns), None);
        assert_eq!(choose_ordering_column(&[]), None);
    }

    #[test]
    fn test_sample_value_display() {
        let dt = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        assert_eq!(SampleValue::DateTime(dt).to_display(), "2024-03-09 07:05:01");
        assert_eq!(SampleValue::Null.to_display(), "NULL");
        assert_eq!(SampleValue::Binary { len: 16 }.to_display(), "<binary 16 bytes>");
        assert_eq!(SampleValue::Integer(-4).to_display(), "-4");
        assert_eq!(SampleValue::Decimal("12.50".into()).to_display(), "12.50");
        assert_eq!(
            SampleValue::Temporal("0000-00-00".into()).to_display(),
            "0000-00-00"
        );
        assert!(!SampleValue::Temporal("25:00:00".into()).is_text());
    }

    #[test]
    fn test_row_set_push() {
        let mut rows = SampleRowSet::new(vec!["id".into(), "note".into()]);
        rows.push_row(&[SampleValue::Integer(1), SampleValue::Null]);

        assert_eq!(rows.len(), 1);
        assert!(!rows.rows[0][0].is_text);
        assert!(rows.rows[0][1].is_null);
    }
}
