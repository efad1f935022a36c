//! Merge report: human summary on stderr, JSON document for `--json` and
//! `--summary-out`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use mdmerge_io::TableFormat;
use mdmerge_recon::{MergeOptions, Summary};

use crate::session::MergeSession;

/// Longest key list printed in the human summary before eliding.
const MAX_KEYS_SHOWN: usize = 20;

#[derive(Debug, Serialize)]
pub struct ReportMeta {
    pub tool: &'static str,
    pub engine_version: &'static str,
    pub run_at: DateTime<Utc>,
}

impl ReportMeta {
    pub fn now() -> Self {
        Self {
            tool: "mdmerge",
            engine_version: env!("CARGO_PKG_VERSION"),
            run_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SourceReport {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    pub label: String,
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Serialize)]
pub struct OutputFiles {
    pub format: TableFormat,
    pub table: PathBuf,
    pub mapping: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct MergeReport<'a> {
    pub meta: ReportMeta,
    pub primary: SourceReport,
    pub secondary: SourceReport,
    pub options: MergeOptions,
    pub summary: &'a Summary,
    pub outputs: OutputFiles,
}

impl<'a> MergeReport<'a> {
    /// `options` carries the key fields actually used.
    pub fn new(
        session: &MergeSession,
        options: MergeOptions,
        summary: &'a Summary,
        outputs: OutputFiles,
    ) -> Self {
        let source_report = |loaded: &crate::session::LoadedTable, label: &str| SourceReport {
            source: loaded.source.to_string(),
            sheet: loaded.sheet.clone(),
            label: label.to_string(),
            rows: loaded.table.len(),
            columns: loaded.table.columns.len(),
        };

        Self {
            meta: ReportMeta::now(),
            primary: source_report(session.primary(), &options.labels.primary),
            secondary: source_report(session.secondary(), &options.labels.secondary),
            options,
            summary,
            outputs,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Human summary, written to stderr.
pub fn print_human_summary(report: &MergeReport<'_>) {
    let s = report.summary;
    let labels = &report.options.labels;

    eprintln!(
        "merged {} ({} rows) + {} ({} rows) on [{}]",
        labels.primary,
        s.primary_count,
        labels.secondary,
        s.secondary_count,
        s.key_fields.as_slice().join(", ")
    );
    eprintln!("  master rows:     {}", s.master_count);
    eprintln!("  mapping rows:    {}", s.mapping_count);
    eprintln!("  overlapping:     {}", s.overlapping_key_count);
    eprintln!("  {} only: {}", pad(&labels.primary), s.primary_only_key_count);
    eprintln!("  {} only: {}", pad(&labels.secondary), s.secondary_only_key_count);

    print_keys(&format!("{} only", labels.primary), &s.primary_only_keys);
    print_keys(&format!("{} only", labels.secondary), &s.secondary_only_keys);

    eprintln!("wrote {}", report.outputs.table.display());
    eprintln!("wrote {}", report.outputs.mapping.display());
}

fn pad(label: &str) -> String {
    format!("{label:<10}")
}

fn print_keys(title: &str, keys: &[String]) {
    if keys.is_empty() {
        return;
    }
    let shown: Vec<&str> = keys.iter().take(MAX_KEYS_SHOWN).map(String::as_str).collect();
    let more = keys.len().saturating_sub(MAX_KEYS_SHOWN);
    if more > 0 {
        eprintln!("  {title}: {} (+{more} more)", shown.join(", "));
    } else {
        eprintln!("  {title}: {}", shown.join(", "));
    }
}
