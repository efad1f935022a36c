//! Where a table comes from: a local file or an `http(s)://` link.

use std::fmt;
use std::path::{Path, PathBuf};

use mdmerge_io::payload;
use mdmerge_recon::model::{SourceLabel, Table};

use crate::exit_codes::{self, read_exit_code};
use crate::fetch::{self, FetchClient};
use crate::CliError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Url(String),
}

impl Source {
    /// Parse a `--primary`/`--secondary` argument. Relative paths resolve
    /// against `base_dir` when given (the job file's directory).
    pub fn parse(raw: &str, base_dir: Option<&Path>) -> Self {
        let raw = raw.trim();
        if fetch::is_url(raw) {
            return Self::Url(raw.to_string());
        }
        let path = PathBuf::from(raw);
        match base_dir {
            Some(dir) if path.is_relative() => Self::Path(dir.join(path)),
            _ => Self::Path(path),
        }
    }

    /// Load the source as a table tagged with `label`.
    pub fn load(
        &self,
        sheet: Option<&str>,
        label: SourceLabel,
        client: &FetchClient,
    ) -> Result<Table, CliError> {
        let table = match self {
            Self::Path(path) => {
                if !path.exists() {
                    return Err(CliError {
                        code: exit_codes::EXIT_READ,
                        message: format!("{label} source not found: {}", path.display()),
                        hint: None,
                    });
                }
                payload::read_path(path, sheet, label).map_err(|e| read_error(self, e))?
            }
            Self::Url(url) => {
                let target = fetch::export_url(url);
                if target != *url {
                    tracing::info!("using export link {}", target);
                }
                let fetched = client.get(&target)?;
                tracing::debug!("decoding {} bytes from {}", fetched.bytes.len(), fetched.url);
                payload::decode(
                    &fetched.bytes,
                    fetched.content_type.as_deref(),
                    sheet,
                    label,
                )
                .map_err(|e| read_error(self, e))?
            }
        };

        tracing::info!(
            "loaded {} source {}: {} rows, {} columns",
            label,
            self,
            table.len(),
            table.columns.len()
        );
        Ok(table)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}

fn read_error(source: &Source, err: mdmerge_io::IoError) -> CliError {
    CliError {
        code: read_exit_code(&err),
        message: format!("{source}: {err}"),
        hint: err.hint().map(str::to_string),
    }
}
