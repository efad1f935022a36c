use crate::assemble::{build_mapping, build_master, build_summary, KeyedTable};
use crate::classify::{classify_keys, validate_inputs};
use crate::config::MergeOptions;
use crate::error::ReconError;
use crate::keys::RecordKeys;
use crate::model::{ReconResult, Table};

/// Reconcile a primary and a secondary table.
///
/// Validation runs before any key is derived; on error nothing is built.
/// Both tables are only borrowed.
pub fn reconcile(
    primary: &Table,
    secondary: &Table,
    options: &MergeOptions,
) -> Result<ReconResult, ReconError> {
    options.validate()?;
    let key_fields = validate_inputs(primary, secondary, &options.key_fields)?;

    let primary_keys = derive_keys(primary, key_fields.as_slice());
    let secondary_keys = derive_keys(secondary, key_fields.as_slice());
    let classification = classify_keys(&primary_keys, &secondary_keys);

    let primary_side = KeyedTable::new(primary, &primary_keys);
    let secondary_side = KeyedTable::new(secondary, &secondary_keys);

    let master = build_master(
        primary_side,
        secondary_side,
        &classification,
        &options.display_column,
    );
    let mapping = build_mapping(primary_side, secondary_side, options);
    let summary = build_summary(
        primary,
        secondary,
        &master,
        &mapping,
        &classification,
        &key_fields,
    );

    log::info!(
        "reconciled {} primary + {} secondary records into {} master rows ({} overlapping, {} primary-only, {} secondary-only keys)",
        summary.primary_count,
        summary.secondary_count,
        summary.master_count,
        summary.overlapping_key_count,
        summary.primary_only_key_count,
        summary.secondary_only_key_count,
    );

    Ok(ReconResult {
        master,
        mapping,
        summary,
    })
}

fn derive_keys(table: &Table, key_fields: &[String]) -> Vec<RecordKeys> {
    table
        .records
        .iter()
        .map(|r| RecordKeys::for_record(r, key_fields))
        .collect()
}
