// Integration tests for the `mdmerge` binary: merge, inspect, check, exit codes.
// Run with: cargo test -p mdmerge-cli --test cli_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use mdmerge_io::xlsx;
use mdmerge_recon::model::{Record, ResultTable, SourceLabel};

fn mdmerge(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mdmerge"));
    cmd.current_dir(dir);
    cmd.env_remove("MDMERGE_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    mdmerge(dir).args(args).output().expect("run mdmerge")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// S4 (primary) and ECC (secondary) country extracts as CSV files.
fn country_csvs(dir: &Path) -> (PathBuf, PathBuf) {
    let s4 = dir.join("S4_Country.csv");
    let ecc = dir.join("ECC_Country.csv");
    std::fs::write(
        &s4,
        "Country/Region Key,Name,ISO Code\nde,Germany,276\nUS ,United States,840\n",
    )
    .unwrap();
    std::fs::write(
        &ecc,
        "Country/Region Key;Name;Currency\nUS;USA;USD\nFR;France;EUR\n",
    )
    .unwrap();
    (s4, ecc)
}

fn read_csv(path: &Path) -> Vec<Vec<String>> {
    let text = std::fs::read_to_string(path).unwrap();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(text.as_bytes());
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

// ---------------------------------------------------------------------------
// merge
// ---------------------------------------------------------------------------

#[test]
fn merge_csv_writes_master_and_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let (s4, ecc) = country_csvs(dir.path());

    let output = run(
        dir.path(),
        &[
            "merge",
            "--primary", s4.to_str().unwrap(),
            "--secondary", ecc.to_str().unwrap(),
            "--primary-label", "S4",
            "--secondary-label", "ECC",
            "--format", "csv",
            "--out-dir", "out",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let master = read_csv(&dir.path().join("out/MDtable.csv"));
    assert_eq!(
        master[0],
        vec!["MDGKey", "Country/Region Key", "Name", "ISO Code", "Currency"]
    );
    assert_eq!(master.len(), 4); // header + DE, US, FR
    assert_eq!(master[1][0], "DE");
    assert_eq!(master[2][0], "US");
    assert_eq!(master[2][2], "United States"); // primary wins on overlap
    assert_eq!(master[3][0], "FR");
    assert_eq!(master[3][4], "EUR");

    let mapping = read_csv(&dir.path().join("out/MDmapping.csv"));
    assert_eq!(mapping[0][0], "MDGKey");
    assert_eq!(mapping[0][1], "ERPSystem");
    assert_eq!(mapping.len(), 5); // header + 2 + 2
    let systems: Vec<&str> = mapping[1..].iter().map(|r| r[1].as_str()).collect();
    assert_eq!(systems, vec!["S4", "S4", "ECC", "ECC"]);

    let err = stderr(&output);
    assert!(err.contains("master rows:     3"), "stderr: {err}");
}

#[test]
fn merge_json_report_on_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let (s4, ecc) = country_csvs(dir.path());

    let output = run(
        dir.path(),
        &[
            "merge",
            "--primary", s4.to_str().unwrap(),
            "--secondary", ecc.to_str().unwrap(),
            "--json",
            "--summary-out", "summary.json",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is one JSON document");
    assert_eq!(report["summary"]["primary_count"], 2);
    assert_eq!(report["summary"]["secondary_count"], 2);
    assert_eq!(report["summary"]["master_count"], 3);
    assert_eq!(report["summary"]["mapping_count"], 4);
    assert_eq!(report["summary"]["overlapping_keys"], serde_json::json!(["US"]));
    assert_eq!(report["summary"]["primary_only_keys"], serde_json::json!(["DE"]));
    assert_eq!(report["summary"]["secondary_only_keys"], serde_json::json!(["FR"]));
    assert_eq!(
        report["options"]["key_fields"],
        serde_json::json!(["Country/Region Key"])
    );
    assert_eq!(report["outputs"]["format"], "xlsx");

    let on_disk: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("summary.json")).unwrap())
            .unwrap();
    assert_eq!(on_disk["summary"], report["summary"]);

    assert!(dir.path().join("MDtable.xlsx").exists());
    assert!(dir.path().join("MDmapping.xlsx").exists());
}

#[test]
fn merge_xlsx_inputs_and_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let primary = ResultTable {
        columns: vec!["Code".into(), "Region".into(), "Name".into()],
        rows: vec![
            Record::from_pairs([("Code", "001"), ("Region", "north"), ("Name", "A")]),
            Record::from_pairs([("Code", "002"), ("Region", "south"), ("Name", "B")]),
        ],
    };
    let secondary = ResultTable {
        columns: vec!["Code".into(), "Region".into(), "Name".into()],
        rows: vec![Record::from_pairs([("Code", "002"), ("Region", "SOUTH"), ("Name", "b")])],
    };
    xlsx::write_table(&primary, "Data", &dir.path().join("p.xlsx")).unwrap();
    xlsx::write_table(&secondary, "Data", &dir.path().join("s.xlsx")).unwrap();

    let output = run(
        dir.path(),
        &[
            "merge",
            "--primary", "p.xlsx",
            "--secondary", "s.xlsx",
            "--primary-sheet", "Data",
            "--key", "Code",
            "--key", "Region",
            "--prefix", "SAP",
            "--display-column", "GlobalKey",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let master = mdmerge_io::payload::read_path(
        &dir.path().join("MDtable.xlsx"),
        Some("MDtable"),
        SourceLabel::Primary,
    )
    .unwrap();
    assert_eq!(master.columns[0], "GlobalKey");
    assert_eq!(master.len(), 2);
    assert_eq!(master.records[0].value("GlobalKey"), "001-NORTH");
    assert_eq!(master.records[1].value("Name"), "B");

    let mapping = mdmerge_io::payload::read_path(
        &dir.path().join("MDmapping.xlsx"),
        None,
        SourceLabel::Primary,
    )
    .unwrap();
    assert_eq!(
        mapping.columns,
        vec!["GlobalKey", "SAPSystem", "SAPCode", "SAPName", "SAPRegion"]
    );
    assert_eq!(mapping.len(), 3);
    assert_eq!(mapping.records[2].value("SAPName"), "b");
}

#[test]
fn merge_with_job_file() {
    let dir = tempfile::tempdir().unwrap();
    let jobs = dir.path().join("jobs");
    std::fs::create_dir(&jobs).unwrap();
    country_csvs(&jobs);
    std::fs::write(
        jobs.join("mdmerge.toml"),
        r#"
key_fields = ["Country/Region Key"]
prefix = "ERP"

[labels]
primary = "S4"
secondary = "ECC"

[primary]
source = "S4_Country.csv"

[secondary]
source = "ECC_Country.csv"
"#,
    )
    .unwrap();

    // cwd is the temp root; sources resolve against the job file's directory
    let output = run(
        dir.path(),
        &["merge", "--config", "jobs/mdmerge.toml", "--format", "csv", "--json"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["primary"]["label"], "S4");
    assert_eq!(report["summary"]["master_count"], 3);
    assert!(dir.path().join("MDmapping.csv").exists());
}

// ---------------------------------------------------------------------------
// exit codes
// ---------------------------------------------------------------------------

#[test]
fn missing_key_field_exits_3_with_columns_hint() {
    let dir = tempfile::tempdir().unwrap();
    let (s4, ecc) = country_csvs(dir.path());

    let output = run(
        dir.path(),
        &[
            "merge",
            "--primary", s4.to_str().unwrap(),
            "--secondary", ecc.to_str().unwrap(),
            "--key", "Land",
        ],
    );
    assert_eq!(output.status.code(), Some(3));
    let err = stderr(&output);
    assert!(err.contains("Land"), "stderr: {err}");
    assert!(err.contains("available columns"), "stderr: {err}");
    assert!(!dir.path().join("MDtable.xlsx").exists());
}

#[test]
fn empty_inputs_exit_4() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.csv"), "Key,Name\n").unwrap();
    std::fs::write(dir.path().join("b.csv"), "Key,Name\n").unwrap();

    let output = run(dir.path(), &["merge", "--primary", "a.csv", "--secondary", "b.csv"]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn equal_labels_exit_3() {
    let dir = tempfile::tempdir().unwrap();
    let (s4, ecc) = country_csvs(dir.path());

    let output = run(
        dir.path(),
        &[
            "merge",
            "--primary", s4.to_str().unwrap(),
            "--secondary", ecc.to_str().unwrap(),
            "--primary-label", "ERP",
            "--secondary-label", "ERP",
        ],
    );
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn missing_source_file_exits_5() {
    let dir = tempfile::tempdir().unwrap();
    let (s4, _) = country_csvs(dir.path());

    let output = run(
        dir.path(),
        &["merge", "--primary", s4.to_str().unwrap(), "--secondary", "nope.xlsx"],
    );
    assert_eq!(output.status.code(), Some(5));
    assert!(stderr(&output).contains("nope.xlsx"));
}

#[test]
fn missing_secondary_flag_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let (s4, _) = country_csvs(dir.path());

    let output = run(dir.path(), &["merge", "--primary", s4.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("--secondary"));
}

#[test]
fn unknown_format_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let output = run(
        dir.path(),
        &["merge", "--primary", "a.csv", "--secondary", "b.csv", "--format", "json"],
    );
    assert_eq!(output.status.code(), Some(2));
}

// ---------------------------------------------------------------------------
// inspect / check
// ---------------------------------------------------------------------------

#[test]
fn inspect_json_profile() {
    let dir = tempfile::tempdir().unwrap();
    let (s4, _) = country_csvs(dir.path());

    let output = run(dir.path(), &["inspect", s4.to_str().unwrap(), "--rows", "1", "--json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let profile: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(profile["row_count"], 2);
    assert_eq!(profile["column_count"], 3);
    assert_eq!(profile["columns"][0], "Country/Region Key");
    assert_eq!(profile["preview"].as_array().unwrap().len(), 1);
    assert_eq!(profile["preview"][0]["Name"], "Germany");
}

#[test]
fn inspect_human_output() {
    let dir = tempfile::tempdir().unwrap();
    let (_, ecc) = country_csvs(dir.path());

    let output = run(dir.path(), &["inspect", ecc.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("rows:    2"));
    assert!(stdout.contains("Currency"));
    assert!(stdout.contains("FR\tFrance\tEUR"));
}

#[test]
fn check_reports_suggestion_and_missing_fields() {
    let dir = tempfile::tempdir().unwrap();
    let (s4, ecc) = country_csvs(dir.path());

    let output = run(
        dir.path(),
        &[
            "check",
            "--primary", s4.to_str().unwrap(),
            "--secondary", ecc.to_str().unwrap(),
            "--key", "Country/Region Key",
            "--key", "Currency",
            "--json",
        ],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let check: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(check["ok"], true);
    assert_eq!(check["suggested_key_fields"], serde_json::json!(["Country/Region Key"]));
    let notes = check["primary"]["notes"].as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert!(notes[0].as_str().unwrap().contains("Currency"));
    assert!(check["secondary"]["notes"].as_array().unwrap().is_empty());
}

#[test]
fn check_fails_on_unknown_key() {
    let dir = tempfile::tempdir().unwrap();
    let (s4, ecc) = country_csvs(dir.path());

    let output = run(
        dir.path(),
        &[
            "check",
            "--primary", s4.to_str().unwrap(),
            "--secondary", ecc.to_str().unwrap(),
            "--key", "Land",
            "--json",
        ],
    );
    assert_eq!(output.status.code(), Some(3));
    let check: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(check["ok"], false);
    assert!(check["error"].as_str().unwrap().contains("Land"));
}
