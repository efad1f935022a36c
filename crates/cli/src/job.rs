//! `mdmerge.toml` job files: merge options plus optional source defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use mdmerge_recon::{MergeOptions, ReconError};

use crate::exit_codes::{self, recon_exit_code};
use crate::CliError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobConfig {
    #[serde(flatten)]
    pub options: MergeOptions,
    #[serde(default)]
    pub primary: Option<SourceSpec>,
    #[serde(default)]
    pub secondary: Option<SourceSpec>,
    /// Directory the job file lives in; relative sources resolve against it.
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceSpec {
    pub source: String,
    #[serde(default)]
    pub sheet: Option<String>,
}

impl JobConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, CliError> {
        let text = std::fs::read_to_string(path).map_err(|e| CliError {
            code: exit_codes::EXIT_USAGE,
            message: format!("cannot read config {}: {e}", path.display()),
            hint: None,
        })?;

        let mut job = Self::from_toml(&text).map_err(|e| CliError {
            code: recon_exit_code(&e),
            message: format!("{}: {e}", path.display()),
            hint: None,
        })?;
        job.base_dir = Some(
            path.parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf(),
        );
        tracing::debug!("loaded job config {}", path.display());
        Ok(job)
    }
}
