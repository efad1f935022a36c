//! Remote sources: download a spreadsheet from an `http(s)://` link.
//!
//! Google Sheets edit links are rewritten to their XLSX export URL before
//! the request; everything else is fetched as given.

mod common;

pub use common::FetchClient;

const GOOGLE_SHEETS_HOST: &str = "docs.google.com";

/// Rewrite a Google Sheets edit link to its XLSX export URL.
///
/// `https://docs.google.com/spreadsheets/d/<id>/edit#gid=0` becomes
/// `https://docs.google.com/spreadsheets/d/<id>/export?format=xlsx&id=<id>`.
/// Any other URL comes back unchanged.
pub fn export_url(raw: &str) -> String {
    let Ok(parsed) = url::Url::parse(raw) else {
        return raw.to_string();
    };
    if parsed.host_str() != Some(GOOGLE_SHEETS_HOST) || !parsed.path().contains("/edit") {
        return raw.to_string();
    }

    let mut segments = parsed.path_segments().into_iter().flatten();
    let id = match (segments.next(), segments.next(), segments.next()) {
        (Some("spreadsheets"), Some("d"), Some(id)) if !id.is_empty() => id,
        _ => return raw.to_string(),
    };

    format!("https://{GOOGLE_SHEETS_HOST}/spreadsheets/d/{id}/export?format=xlsx&id={id}")
}

/// True for `http://` and `https://` sources.
pub fn is_url(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
