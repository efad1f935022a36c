// Excel import (xlsx, xlsm, xls, ods via calamine) and XLSX export (rust_xlsxwriter)

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets};
use rust_xlsxwriter::{Format, Workbook};

use mdmerge_recon::model::{SourceLabel, Table, Tabular};

use crate::error::IoError;
use crate::unique_headers;

/// Excel's hard limits.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLS: usize = 16_384;

/// Read one sheet of a workbook file into a table.
pub fn read_table(path: &Path, sheet: Option<&str>, label: SourceLabel) -> Result<Table, IoError> {
    let bytes = std::fs::read(path)
        .map_err(|e| IoError::Io(format!("cannot read {}: {e}", path.display())))?;
    decode_workbook(&bytes, sheet, label)
}

/// Sheet names in workbook order.
pub fn sheet_names(bytes: &[u8]) -> Result<Vec<String>, IoError> {
    let workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    Ok(workbook.sheet_names().to_vec())
}

/// Decode workbook bytes. Uses the named sheet, or the first one.
///
/// The first row holding any non-empty cell is the header row; every row
/// after it becomes a record, blank rows included. Trailing blank rows count
/// when the sheet's declared dimension covers them. Cell values are rendered
/// as text the way Excel displays them unformatted.
pub fn decode_workbook(
    bytes: &[u8],
    sheet: Option<&str>,
    label: SourceLabel,
) -> Result<Table, IoError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let names: Vec<String> = workbook.sheet_names().to_vec();

    let sheet_name = match sheet {
        Some(wanted) => names
            .iter()
            .find(|n| n.as_str() == wanted)
            .cloned()
            .ok_or_else(|| IoError::SheetNotFound {
                sheet: wanted.to_string(),
                available: names.clone(),
            })?,
        None => names.first().cloned().ok_or(IoError::NoSheets)?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IoError::Workbook(format!("failed to read sheet '{sheet_name}': {e}")))?;

    let mut rows = range
        .rows()
        .skip_while(|row| row.iter().all(|c| cell_to_text(c).is_empty()));

    let columns = match rows.next() {
        Some(header) => unique_headers(header.iter().map(cell_to_text).collect()),
        None => {
            log::debug!("sheet '{sheet_name}' is empty");
            return Ok(Table::new(label, Vec::new()));
        }
    };

    let mut data: Vec<Vec<String>> = rows
        .map(|row| row.iter().map(cell_to_text).collect())
        .collect();

    // calamine's range stops at the last valued cell; blank rows past it
    // only show up in the <dimension> element.
    if let (Some(declared), Some((range_end, _))) =
        (declared_last_row(&mut workbook, &sheet_name), range.end())
    {
        let missing = declared.saturating_sub(range_end) as usize;
        data.extend(std::iter::repeat_with(|| vec![String::new(); columns.len()]).take(missing));
    }

    log::debug!(
        "decoded sheet '{sheet_name}': {} rows, {} columns",
        data.len(),
        columns.len()
    );
    Ok(Table::from_rows(label, columns, data))
}

/// Last row of an XLSX sheet's declared dimension. Other formats report none.
fn declared_last_row<RS: std::io::Read + std::io::Seek>(
    workbook: &mut Sheets<RS>,
    sheet_name: &str,
) -> Option<u32> {
    match workbook {
        Sheets::Xlsx(xlsx) => xlsx
            .worksheet_cells_reader(sheet_name)
            .ok()
            .map(|reader| reader.dimensions().end.0),
        _ => None,
    }
}

/// Render a cell as text. Integral floats drop the fraction, booleans are
/// TRUE/FALSE, errors keep their Excel literal (`#N/A`).
pub fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{}", n)
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => e.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if ndt.time() == chrono::NaiveTime::MIN => {
                ndt.format("%Y-%m-%d").to_string()
            }
            Some(ndt) => ndt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => format!("{}", dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// Encode a table as a single-sheet workbook. Header row is bold and frozen;
/// every value is written as a string so codes like `007` survive.
pub fn encode_table<T: Tabular + ?Sized>(table: &T, sheet_name: &str) -> Result<Vec<u8>, IoError> {
    let columns = table.columns();
    let rows = table.rows();
    if columns.len() > MAX_COLS {
        return Err(IoError::Encode(format!(
            "{} columns exceeds the Excel limit of {MAX_COLS}",
            columns.len()
        )));
    }
    if rows.len() + 1 > MAX_ROWS {
        return Err(IoError::Encode(format!(
            "{} rows exceeds the Excel limit of {}",
            rows.len(),
            MAX_ROWS - 1
        )));
    }

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name(sheet_name)?;
    let bold = Format::new().set_bold();

    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &bold)?;
    }
    worksheet.set_freeze_panes(1, 0)?;

    for (r, row) in rows.iter().enumerate() {
        for (col, name) in columns.iter().enumerate() {
            let value = row.value(name);
            if !value.is_empty() {
                worksheet.write_string((r + 1) as u32, col as u16, value)?;
            }
        }
    }

    // An all-blank last row has no cells; pin it so the dimension keeps it.
    if let Some(last) = rows.last() {
        if !columns.is_empty() && columns.iter().all(|c| last.value(c).is_empty()) {
            worksheet.write_blank(rows.len() as u32, 0, &Format::new())?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Encode and write to `path`.
pub fn write_table<T: Tabular + ?Sized>(
    table: &T,
    sheet_name: &str,
    path: &Path,
) -> Result<(), IoError> {
    let bytes = encode_table(table, sheet_name)?;
    std::fs::write(path, bytes)
        .map_err(|e| IoError::Io(format!("cannot write {}: {e}", path.display())))
}
