//! Output assembly: master table, mapping table, summary.

use std::collections::{BTreeSet, HashSet};

use crate::classify::{Classification, KeyClassification};
use crate::config::MergeOptions;
use crate::keys::RecordKeys;
use crate::model::{KeyFieldSet, Record, ResultTable, SourceLabel, Summary, Table};

/// A table's records paired with their derived keys, index for index.
#[derive(Debug, Clone, Copy)]
pub struct KeyedTable<'a> {
    pub table: &'a Table,
    pub keys: &'a [RecordKeys],
}

impl<'a> KeyedTable<'a> {
    pub fn new(table: &'a Table, keys: &'a [RecordKeys]) -> Self {
        debug_assert_eq!(table.records.len(), keys.len());
        Self { table, keys }
    }

    fn iter(self) -> impl Iterator<Item = (&'a Record, &'a RecordKeys)> {
        self.table.records.iter().zip(self.keys.iter())
    }
}

/// Every column name across the tables, first-seen order, declared columns
/// before record-only ones.
fn column_union(tables: &[&Table]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for table in tables {
        let declared = table.columns.iter().map(String::as_str);
        let from_records = table.records.iter().flat_map(|r| r.columns());
        for column in declared.chain(from_records) {
            if seen.insert(column) {
                out.push(column.to_string());
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Master
// ---------------------------------------------------------------------------

/// One row per distinct composite key; primary rows first, then secondary-only rows.
///
/// Dedup keeps the first occurrence, so a primary record always wins over a
/// secondary one with the same key. Fields are never merged across sources.
pub fn build_master<'a>(
    primary: KeyedTable<'a>,
    secondary: KeyedTable<'a>,
    classification: &KeyClassification,
    display_column: &str,
) -> ResultTable {
    let data_columns: Vec<String> = column_union(&[primary.table, secondary.table])
        .into_iter()
        .filter(|c| c != display_column)
        .collect();

    let mut columns = Vec::with_capacity(data_columns.len() + 1);
    columns.push(display_column.to_string());
    columns.extend(data_columns.iter().cloned());

    let secondary_only = secondary
        .iter()
        .filter(|(_, k)| classification.classify(&k.composite) == Some(Classification::SecondaryOnly));

    let mut seen: HashSet<&str> = HashSet::new();
    let mut rows = Vec::new();
    for (record, keys) in primary.iter().chain(secondary_only) {
        if !seen.insert(keys.composite.as_str()) {
            continue;
        }
        let mut row = Record::new();
        row.insert(display_column, keys.display.as_str());
        for column in &data_columns {
            row.insert(column.as_str(), record.value(column));
        }
        rows.push(row);
    }

    log::debug!("master table: {} rows, {} columns", rows.len(), columns.len());
    ResultTable { columns, rows }
}

// ---------------------------------------------------------------------------
// Mapping
// ---------------------------------------------------------------------------

/// One row per input record, primary block first, with prefixed data columns
/// sorted by original name.
pub fn build_mapping<'a>(
    primary: KeyedTable<'a>,
    secondary: KeyedTable<'a>,
    options: &MergeOptions,
) -> ResultTable {
    let source_column = options.source_column();
    let display_column = options.display_column.as_str();

    let sorted: BTreeSet<String> = column_union(&[primary.table, secondary.table])
        .into_iter()
        .collect();

    let mut prefixed: Vec<(String, String)> = Vec::with_capacity(sorted.len());
    for column in sorted {
        let renamed = format!("{}{}", options.prefix, column);
        if renamed == source_column || renamed == display_column {
            log::warn!("column '{column}' shadowed by mapping column '{renamed}'");
            continue;
        }
        prefixed.push((column, renamed));
    }

    let mut columns = Vec::with_capacity(prefixed.len() + 2);
    columns.push(display_column.to_string());
    columns.push(source_column.clone());
    columns.extend(prefixed.iter().map(|(_, renamed)| renamed.clone()));

    let mut rows = Vec::with_capacity(primary.keys.len() + secondary.keys.len());
    for side in [primary, secondary] {
        let label = match side.table.label {
            SourceLabel::Primary => options.labels.primary.as_str(),
            SourceLabel::Secondary => options.labels.secondary.as_str(),
        };
        for (record, keys) in side.iter() {
            let mut row = Record::new();
            row.insert(display_column, keys.display.as_str());
            row.insert(source_column.as_str(), label);
            for (original, renamed) in &prefixed {
                row.insert(renamed.as_str(), record.value(original));
            }
            rows.push(row);
        }
    }

    log::debug!("mapping table: {} rows, {} columns", rows.len(), columns.len());
    ResultTable { columns, rows }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

pub fn build_summary(
    primary: &Table,
    secondary: &Table,
    master: &ResultTable,
    mapping: &ResultTable,
    classification: &KeyClassification,
    key_fields: &KeyFieldSet,
) -> Summary {
    Summary {
        primary_count: primary.len(),
        secondary_count: secondary.len(),
        master_count: master.len(),
        mapping_count: mapping.len(),
        overlapping_key_count: classification.overlapping.len(),
        primary_only_key_count: classification.primary_only.len(),
        secondary_only_key_count: classification.secondary_only.len(),
        overlapping_keys: classification.overlapping.clone(),
        primary_only_keys: classification.primary_only.clone(),
        secondary_only_keys: classification.secondary_only.clone(),
        key_fields: key_fields.clone(),
        mapping_columns: mapping.columns.clone(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
