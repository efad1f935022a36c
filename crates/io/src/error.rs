use std::fmt;

/// Hint shown when a download produced a web page instead of a spreadsheet.
pub const HTML_PAYLOAD_HINT: &str = "if this is a Google Sheets link, set sharing to \
'Anyone with the link can view', or download the file as Excel and pass the local path";

#[derive(Debug)]
pub enum IoError {
    /// File read/write failure.
    Io(String),
    /// CSV parse or write failure.
    Csv(String),
    /// Excel workbook could not be opened or a sheet could not be read.
    Workbook(String),
    /// Workbook has no sheets at all.
    NoSheets,
    /// Requested sheet name does not exist.
    SheetNotFound { sheet: String, available: Vec<String> },
    /// Bytes are an HTML page, not a spreadsheet.
    HtmlPayload,
    /// Bytes match no supported spreadsheet format.
    UnsupportedPayload(String),
    /// XLSX encoding failure.
    Encode(String),
}

impl IoError {
    /// Remediation text, when one applies.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::HtmlPayload => Some(HTML_PAYLOAD_HINT),
            _ => None,
        }
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::Workbook(msg) => write!(f, "failed to read Excel file: {msg}"),
            Self::NoSheets => write!(f, "Excel file contains no sheets"),
            Self::SheetNotFound { sheet, available } => write!(
                f,
                "sheet '{sheet}' not found (available: {})",
                available.join(", ")
            ),
            Self::HtmlPayload => write!(f, "received HTML instead of a spreadsheet file"),
            Self::UnsupportedPayload(msg) => write!(f, "unsupported spreadsheet payload: {msg}"),
            Self::Encode(msg) => write!(f, "failed to write Excel file: {msg}"),
        }
    }
}

impl std::error::Error for IoError {}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<::csv::Error> for IoError {
    fn from(e: ::csv::Error) -> Self {
        Self::Csv(e.to_string())
    }
}

impl From<calamine::Error> for IoError {
    fn from(e: calamine::Error) -> Self {
        Self::Workbook(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for IoError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        Self::Encode(e.to_string())
    }
}
