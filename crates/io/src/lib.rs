// Spreadsheet I/O: decode extracts into tables, encode result tables back out

pub mod csv;
pub mod error;
pub mod payload;
pub mod profile;
pub mod xlsx;

pub use error::IoError;
pub use payload::{PayloadKind, TableFormat};
pub use profile::TableProfile;

/// Header names for blank header cells, pandas-style (`Unnamed: 3`).
pub(crate) fn unnamed_column(index: usize) -> String {
    format!("Unnamed: {index}")
}

/// Give every header a distinct, non-empty name. Blank cells become
/// `Unnamed: N`; repeats get `.1`, `.2` suffixes in order of appearance.
pub(crate) fn unique_headers(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for (idx, header) in raw.into_iter().enumerate() {
        let base = if header.trim().is_empty() {
            unnamed_column(idx)
        } else {
            header
        };
        let mut candidate = base.clone();
        let mut n = 1;
        while out.contains(&candidate) {
            candidate = format!("{base}.{n}");
            n += 1;
        }
        out.push(candidate);
    }
    out
}
