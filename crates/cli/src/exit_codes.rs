//! CLI Exit Code Registry
//!
//! Single source of truth for `mdmerge` exit codes. Scripts rely on them.
//!
//! | Range   | Domain     | Description                                   |
//! |---------|------------|-----------------------------------------------|
//! | 0       | Universal  | Success                                       |
//! | 1       | Universal  | General error (unspecified)                   |
//! | 2       | Universal  | CLI usage error (bad args, bad job file)      |
//! | 3-9     | merge      | Reconciler and spreadsheet I/O codes          |
//! | 50-59   | fetch      | Remote spreadsheet downloads                  |

use mdmerge_io::IoError;
use mdmerge_recon::{ErrorKind, ReconError};

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable job file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Merge (3-9)
// =============================================================================

/// Merge options unusable: no key fields, key fields in neither table,
/// empty prefix, clashing labels.
pub const EXIT_MERGE_CONFIG: u8 = 3;

/// Both input tables are empty.
pub const EXIT_MERGE_INPUT: u8 = 4;

/// A source could not be read or decoded (missing file, bad workbook, missing sheet).
pub const EXIT_READ: u8 = 5;

/// An output file could not be written.
pub const EXIT_WRITE: u8 = 6;

// =============================================================================
// Fetch (50-59)
// =============================================================================

/// Upstream error (4xx/5xx) or network failure after retries.
pub const EXIT_FETCH_UPSTREAM: u8 = 50;

/// Download succeeded but returned something other than a spreadsheet
/// (usually a sign-in page for a private Google Sheet).
pub const EXIT_FETCH_NOT_SPREADSHEET: u8 = 51;

/// Rate limited after retries (429).
pub const EXIT_FETCH_RATE_LIMIT: u8 = 52;

/// Map a reconciler error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err.kind() {
        ErrorKind::Configuration => EXIT_MERGE_CONFIG,
        ErrorKind::Input => EXIT_MERGE_INPUT,
    }
}

/// Map a read-side I/O error to its exit code.
pub fn read_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::HtmlPayload => EXIT_FETCH_NOT_SPREADSHEET,
        _ => EXIT_READ,
    }
}
