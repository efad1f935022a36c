//! `mdmerge-recon` — two-source master-data reconciler.
//!
//! Pure engine crate: receives two pre-loaded tables, returns the deduplicated
//! master table, the full mapping table and a summary. No CLI or IO dependencies.

pub mod assemble;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod keys;
pub mod model;
pub mod normalize;

pub use config::{MergeOptions, SourceNames};
pub use engine::reconcile;
pub use error::{ErrorKind, ReconError};
pub use model::{Record, ReconResult, ResultTable, SourceLabel, Summary, Table, Tabular};
