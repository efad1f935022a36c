use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Which extract a table (or a mapping row) came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceLabel {
    Primary,
    Secondary,
}

impl std::fmt::Display for SourceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "PRIMARY"),
            Self::Secondary => write!(f, "SECONDARY"),
        }
    }
}

/// One row: column name → cell text, in column order.
///
/// Cells are always text. A blank cell is `""`; there is no separate null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(column, value)` pairs. Later duplicates overwrite earlier ones.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Cell for `column`, `None` if the record has no such column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Cell for `column`, `""` if the record has no such column.
    pub fn value(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A loaded extract. The reconciler only ever borrows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub label: SourceLabel,
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Table {
    pub fn new(label: SourceLabel, columns: Vec<String>) -> Self {
        Self {
            label,
            columns,
            records: Vec::new(),
        }
    }

    /// Build a table from a header and positional rows. Short rows are padded with `""`,
    /// cells beyond the header are dropped.
    pub fn from_rows(label: SourceLabel, columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let records = rows
            .into_iter()
            .map(|row| {
                let mut cells = row.into_iter();
                Record::from_pairs(
                    columns
                        .iter()
                        .map(|c| (c.clone(), cells.next().unwrap_or_default())),
                )
            })
            .collect();
        Self {
            label,
            columns,
            records,
        }
    }

    /// Append a record, registering any column the table has not seen yet.
    pub fn push(&mut self, record: Record) {
        for column in record.columns() {
            if !self.columns.iter().any(|c| c == column) {
                self.columns.push(column.to_string());
            }
        }
        self.records.push(record);
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Ordered, non-empty, duplicate-free list of key columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeyFieldSet(Vec<String>);

impl KeyFieldSet {
    /// Repeated names collapse to their first occurrence.
    pub fn new<I, S>(fields: I) -> Result<Self, ReconError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if !out.contains(&field) {
                out.push(field);
            }
        }
        if out.is_empty() {
            return Err(ReconError::NoKeyFields);
        }
        Ok(Self(out))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Anything with a header and rows of records. Writers in `mdmerge-io` take this.
pub trait Tabular {
    fn columns(&self) -> &[String];
    fn rows(&self) -> &[Record];
}

impl Tabular for Table {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn rows(&self) -> &[Record] {
        &self.records
    }
}

/// Master or mapping output. Every row carries every column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Record>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of one column, top to bottom.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rows.iter().map(move |r| r.value(column))
    }
}

impl Tabular for ResultTable {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn rows(&self) -> &[Record] {
        &self.rows
    }
}

// ---------------------------------------------------------------------------
// Summary + Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub primary_count: usize,
    pub secondary_count: usize,
    pub master_count: usize,
    pub mapping_count: usize,
    pub overlapping_key_count: usize,
    pub primary_only_key_count: usize,
    pub secondary_only_key_count: usize,
    pub overlapping_keys: Vec<String>,
    pub primary_only_keys: Vec<String>,
    pub secondary_only_keys: Vec<String>,
    pub key_fields: KeyFieldSet,
    pub mapping_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub master: ResultTable,
    pub mapping: ResultTable,
    pub summary: Summary,
}
