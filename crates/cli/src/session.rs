//! `MergeSession`: the two loaded extracts, the chosen options and the last
//! result. The reconciler itself is stateless; the session lends it tables.

use mdmerge_recon::model::Table;
use mdmerge_recon::{reconcile, MergeOptions, ReconError, ReconResult};

use crate::source::Source;

/// Preferred key column for SAP country/region extracts.
pub const PREFERRED_KEY_FIELD: &str = "Country/Region Key";

/// A table plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub source: Source,
    pub sheet: Option<String>,
    pub table: Table,
}

pub struct MergeSession {
    primary: LoadedTable,
    secondary: LoadedTable,
    options: MergeOptions,
    last_result: Option<ReconResult>,
}

impl MergeSession {
    pub fn new(primary: LoadedTable, secondary: LoadedTable, options: MergeOptions) -> Self {
        Self {
            primary,
            secondary,
            options,
            last_result: None,
        }
    }

    pub fn primary(&self) -> &LoadedTable {
        &self.primary
    }

    pub fn secondary(&self) -> &LoadedTable {
        &self.secondary
    }

    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Sorted union of both tables' declared columns.
    pub fn column_union(&self) -> Vec<String> {
        let mut columns: Vec<String> = self
            .primary
            .table
            .columns
            .iter()
            .chain(self.secondary.table.columns.iter())
            .cloned()
            .collect();
        columns.sort();
        columns.dedup();
        columns
    }

    /// `Country/Region Key` when either table has it, else the first column
    /// of the sorted union. Empty when neither table has columns.
    pub fn suggested_key_fields(&self) -> Vec<String> {
        if self.primary.table.has_column(PREFERRED_KEY_FIELD)
            || self.secondary.table.has_column(PREFERRED_KEY_FIELD)
        {
            return vec![PREFERRED_KEY_FIELD.to_string()];
        }
        self.column_union().into_iter().take(1).collect()
    }

    /// Configured key fields, or the suggestion when none were given.
    pub fn key_fields(&self) -> Vec<String> {
        if self.options.key_fields.is_empty() {
            self.suggested_key_fields()
        } else {
            self.options.key_fields.clone()
        }
    }

    /// Run the reconciler. The previous result is replaced, even on error.
    pub fn run(&mut self) -> Result<&ReconResult, ReconError> {
        self.last_result = None;

        let mut options = self.options.clone();
        if options.key_fields.is_empty() {
            options.key_fields = self.suggested_key_fields();
            tracing::info!("no key fields given, using {:?}", options.key_fields);
        }

        let result = reconcile(&self.primary.table, &self.secondary.table, &options)?;
        Ok(&*self.last_result.insert(result))
    }

    pub fn last_result(&self) -> Option<&ReconResult> {
        self.last_result.as_ref()
    }
}
