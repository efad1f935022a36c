// CSV/TSV tables: decode into a `Table`, encode any `Tabular`

use std::io::Write;
use std::path::Path;

use mdmerge_recon::model::{SourceLabel, Table, Tabular};

use crate::error::IoError;
use crate::unique_headers;

/// Read a delimited file (delimiter sniffed) into a table.
pub fn read_table(path: &Path, label: SourceLabel) -> Result<Table, IoError> {
    let bytes = std::fs::read(path)
        .map_err(|e| IoError::Io(format!("cannot read {}: {e}", path.display())))?;
    decode_table(&bytes, label)
}

/// Decode delimited bytes (UTF-8, or Windows-1252 fallback) into a table.
pub fn decode_table(bytes: &[u8], label: SourceLabel) -> Result<Table, IoError> {
    let content = decode_text(bytes);
    let delimiter = sniff_delimiter(&content);
    parse_table(&content, delimiter, label)
}

/// Parse delimited text. The first record is the header; every cell is kept as text.
pub fn parse_table(content: &str, delimiter: u8, label: SourceLabel) -> Result<Table, IoError> {
    let content = content.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let header = match records.next() {
        Some(header) => header?,
        None => return Ok(Table::new(label, Vec::new())),
    };
    let columns = unique_headers(header.iter().map(str::to_string).collect());

    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    log::debug!("parsed CSV: {} rows, {} columns", rows.len(), columns.len());
    Ok(Table::from_rows(label, columns, rows))
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
pub fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Lines agreeing with line 1, weighted by field count
        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// UTF-8 if valid, otherwise Windows-1252 (common for Excel-exported CSVs).
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Write header + rows. Missing cells are written empty.
pub fn write_table<W: Write, T: Tabular + ?Sized>(table: &T, writer: W) -> Result<(), IoError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(table.columns().iter().map(|c| row.value(c)))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_bytes<T: Tabular + ?Sized>(table: &T) -> Result<Vec<u8>, IoError> {
    let mut buf = Vec::new();
    write_table(table, &mut buf)?;
    Ok(buf)
}
