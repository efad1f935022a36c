// Format detection: pick a decoder from a file extension or from the bytes themselves

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use mdmerge_recon::model::{SourceLabel, Table};

use crate::error::IoError;
use crate::{csv, xlsx};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// What a blob of downloaded or extensionless bytes looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// xlsx, xlsm, ods
    Zip,
    /// legacy xls
    Ole,
    /// A web page (login wall, permission page)
    Html,
    /// Anything else; treated as delimited text
    Text,
}

/// Table file format, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableFormat {
    Csv,
    Xlsx,
}

impl TableFormat {
    /// `None` when the extension is missing or unknown.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "csv" | "tsv" | "txt" => Some(Self::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(Self::Xlsx),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for TableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TableFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            other => Err(format!("unknown format '{other}' (expected xlsx or csv)")),
        }
    }
}

/// Classify bytes by magic number, falling back to the declared content type
/// and a look at the leading text.
pub fn sniff(bytes: &[u8], content_type: Option<&str>) -> PayloadKind {
    if bytes.starts_with(ZIP_MAGIC) {
        return PayloadKind::Zip;
    }
    if bytes.starts_with(OLE_MAGIC) {
        return PayloadKind::Ole;
    }
    if content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("html")) {
        return PayloadKind::Html;
    }

    let head = &bytes[..bytes.len().min(512)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start_matches('\u{feff}').trim_start().to_ascii_lowercase();
    if head.starts_with("<!") || head.starts_with("<html") {
        return PayloadKind::Html;
    }
    PayloadKind::Text
}

/// Decode bytes of unknown format into a table.
pub fn decode(
    bytes: &[u8],
    content_type: Option<&str>,
    sheet: Option<&str>,
    label: SourceLabel,
) -> Result<Table, IoError> {
    let kind = sniff(bytes, content_type);
    log::debug!("payload sniffed as {kind:?} ({} bytes)", bytes.len());
    match kind {
        PayloadKind::Zip | PayloadKind::Ole => xlsx::decode_workbook(bytes, sheet, label),
        PayloadKind::Html => Err(IoError::HtmlPayload),
        PayloadKind::Text => {
            if bytes.contains(&0) {
                return Err(IoError::UnsupportedPayload(
                    "binary data that is neither a workbook nor delimited text".to_string(),
                ));
            }
            if sheet.is_some() {
                log::warn!("--sheet ignored for delimited text input");
            }
            csv::decode_table(bytes, label)
        }
    }
}

/// Read a table file. Known extensions pick the decoder directly; anything
/// else is sniffed.
pub fn read_path(path: &Path, sheet: Option<&str>, label: SourceLabel) -> Result<Table, IoError> {
    match TableFormat::from_path(path) {
        Some(TableFormat::Csv) => {
            if sheet.is_some() {
                log::warn!("--sheet ignored for {}", path.display());
            }
            csv::read_table(path, label)
        }
        Some(TableFormat::Xlsx) => xlsx::read_table(path, sheet, label),
        None => {
            let bytes = std::fs::read(path)
                .map_err(|e| IoError::Io(format!("cannot read {}: {e}", path.display())))?;
            decode(&bytes, None, sheet, label)
        }
    }
}
