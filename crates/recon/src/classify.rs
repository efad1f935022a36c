use std::collections::HashSet;

use crate::error::ReconError;
use crate::keys::RecordKeys;
use crate::model::{KeyFieldSet, Table};

/// Where a composite key lives across the two extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    PrimaryOnly,
    SecondaryOnly,
    Overlapping,
}

/// Check options against both tables before any key is computed.
///
/// Order: empty key list, then both tables empty, then fields present in neither
/// table. Presence uses each table's declared columns.
pub fn validate_inputs(
    primary: &Table,
    secondary: &Table,
    key_fields: &[String],
) -> Result<KeyFieldSet, ReconError> {
    let key_fields = KeyFieldSet::new(key_fields.iter().cloned())?;

    if primary.is_empty() && secondary.is_empty() {
        return Err(ReconError::EmptyInputs);
    }

    let missing: Vec<String> = key_fields
        .iter()
        .filter(|f| !primary.has_column(f) && !secondary.has_column(f))
        .map(str::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(ReconError::MissingKeyFields { fields: missing });
    }

    for field in key_fields.iter() {
        if !primary.has_column(field) {
            log::warn!("key field '{field}' absent from primary table; treated as empty");
        }
        if !secondary.has_column(field) {
            log::warn!("key field '{field}' absent from secondary table; treated as empty");
        }
    }

    Ok(key_fields)
}

/// Partition of the composite key union. Each list is sorted lexicographically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyClassification {
    pub overlapping: Vec<String>,
    pub primary_only: Vec<String>,
    pub secondary_only: Vec<String>,
    primary_keys: HashSet<String>,
    secondary_keys: HashSet<String>,
}

impl KeyClassification {
    pub fn classify(&self, composite: &str) -> Option<Classification> {
        match (
            self.primary_keys.contains(composite),
            self.secondary_keys.contains(composite),
        ) {
            (true, true) => Some(Classification::Overlapping),
            (true, false) => Some(Classification::PrimaryOnly),
            (false, true) => Some(Classification::SecondaryOnly),
            (false, false) => None,
        }
    }

    /// Number of distinct composite keys across both tables.
    pub fn union_len(&self) -> usize {
        self.overlapping.len() + self.primary_only.len() + self.secondary_only.len()
    }
}

/// Classify composite keys via set intersection and difference.
///
/// Empty composite keys take part like any other value.
pub fn classify_keys(primary: &[RecordKeys], secondary: &[RecordKeys]) -> KeyClassification {
    let primary_keys: HashSet<String> = primary.iter().map(|k| k.composite.clone()).collect();
    let secondary_keys: HashSet<String> = secondary.iter().map(|k| k.composite.clone()).collect();

    let mut overlapping: Vec<String> = primary_keys.intersection(&secondary_keys).cloned().collect();
    let mut primary_only: Vec<String> = primary_keys.difference(&secondary_keys).cloned().collect();
    let mut secondary_only: Vec<String> = secondary_keys.difference(&primary_keys).cloned().collect();
    overlapping.sort();
    primary_only.sort();
    secondary_only.sort();

    log::debug!(
        "classified {} keys: {} overlapping, {} primary-only, {} secondary-only",
        overlapping.len() + primary_only.len() + secondary_only.len(),
        overlapping.len(),
        primary_only.len(),
        secondary_only.len(),
    );

    KeyClassification {
        overlapping,
        primary_only,
        secondary_only,
        primary_keys,
        secondary_keys,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
