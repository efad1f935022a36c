// Merge outputs written to disk and read back through the same loaders the CLI uses.

use mdmerge_io::payload::read_path;
use mdmerge_io::{csv, xlsx, IoError};
use mdmerge_recon::model::{SourceLabel, Table};
use mdmerge_recon::{reconcile, MergeOptions};

fn inputs() -> (Table, Table) {
    let s4 = Table::from_rows(
        SourceLabel::Primary,
        vec!["Country/Region Key".into(), "Name".into(), "ISO Code".into()],
        vec![
            vec!["de".into(), "Germany".into(), "276".into()],
            vec!["US ".into(), "United States".into(), "840".into()],
        ],
    );
    let ecc = Table::from_rows(
        SourceLabel::Secondary,
        vec!["Country/Region Key".into(), "Name".into(), "Currency".into()],
        vec![
            vec!["US".into(), "USA".into(), "USD".into()],
            vec!["FR".into(), "France".into(), "EUR".into()],
        ],
    );
    (s4, ecc)
}

#[test]
fn xlsx_outputs_read_back_through_loader() {
    let (s4, ecc) = inputs();
    let options = MergeOptions::with_key_fields::<Vec<String>, String>(vec!["Country/Region Key".into()]);
    let result = reconcile(&s4, &ecc, &options).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let table_path = dir.path().join("MDtable.xlsx");
    let mapping_path = dir.path().join("MDmapping.xlsx");
    xlsx::write_table(&result.master, "MDtable", &table_path).unwrap();
    xlsx::write_table(&result.mapping, "MDmapping", &mapping_path).unwrap();

    let master = read_path(&table_path, None, SourceLabel::Primary).unwrap();
    assert_eq!(master.columns, result.master.columns);
    assert_eq!(master.len(), 3);
    assert_eq!(master.records[0].value("MDGKey"), "DE");
    assert_eq!(master.records[0].value("ISO Code"), "276");
    assert_eq!(master.records[1].value("Name"), "United States");
    assert_eq!(master.records[2].value("Currency"), "EUR");
    assert_eq!(master.records[0].value("Currency"), "");

    let mapping = read_path(&mapping_path, Some("MDmapping"), SourceLabel::Primary).unwrap();
    assert_eq!(mapping.columns, result.mapping.columns);
    assert_eq!(mapping.len(), 4);
    assert_eq!(mapping.records[0].value("ERPSystem"), "PRIMARY");
    assert_eq!(mapping.records[3].value("ERPSystem"), "SECONDARY");
}

#[test]
fn xlsx_outputs_match_result_row_for_row() {
    // The blank-key row becomes the last master row, with every cell empty.
    let primary = Table::from_rows(
        SourceLabel::Primary,
        vec!["Key".into(), "Name".into()],
        vec![
            vec!["US".into(), "United States".into()],
            vec!["".into(), "".into()],
        ],
    );
    let secondary = Table::from_rows(
        SourceLabel::Secondary,
        vec!["Key".into(), "Name".into()],
        vec![vec!["us".into(), "USA".into()]],
    );
    let result = reconcile(&primary, &secondary, &MergeOptions::with_key_fields(["Key"])).unwrap();
    assert_eq!(result.master.len(), 2);

    let master = xlsx::decode_workbook(
        &xlsx::encode_table(&result.master, "MDtable").unwrap(),
        None,
        SourceLabel::Primary,
    )
    .unwrap();
    assert_eq!(master.columns, result.master.columns);
    assert_eq!(master.records, result.master.rows);

    let mapping = xlsx::decode_workbook(
        &xlsx::encode_table(&result.mapping, "MDmapping").unwrap(),
        None,
        SourceLabel::Primary,
    )
    .unwrap();
    assert_eq!(mapping.columns, result.mapping.columns);
    assert_eq!(mapping.records, result.mapping.rows);
}

#[test]
fn csv_outputs_read_back_through_loader() {
    let (s4, ecc) = inputs();
    let options = MergeOptions::with_key_fields::<Vec<String>, String>(vec!["Country/Region Key".into()]);
    let result = reconcile(&s4, &ecc, &options).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("MDmapping.csv");
    std::fs::write(&path, csv::to_bytes(&result.mapping).unwrap()).unwrap();

    let mapping = read_path(&path, None, SourceLabel::Secondary).unwrap();
    assert_eq!(mapping.columns, result.mapping.columns);
    assert_eq!(mapping.len(), result.mapping.len());
    for (back, original) in mapping.records.iter().zip(result.mapping.rows.iter()) {
        for col in &result.mapping.columns {
            assert_eq!(back.value(col), original.value(col), "column {col}");
        }
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_path(&dir.path().join("nope.xlsx"), None, SourceLabel::Primary).unwrap_err();
    assert!(matches!(err, IoError::Io(_)));
    assert!(err.to_string().contains("nope.xlsx"));
}
