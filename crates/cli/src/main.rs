// mdmerge CLI - merge a primary and a secondary master-data extract into a
// deduplicated master table and a full mapping table

mod exit_codes;
mod fetch;
mod job;
mod logging;
mod report;
mod session;
mod source;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use mdmerge_io::{csv as csv_out, xlsx, TableFormat, TableProfile};
use mdmerge_recon::classify::validate_inputs;
use mdmerge_recon::model::{Record, SourceLabel, Tabular};
use mdmerge_recon::{MergeOptions, ReconError};

use exit_codes::{recon_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE, EXIT_WRITE};
use fetch::FetchClient;
use job::JobConfig;
use logging::{LogConfig, LogFormat};
use report::{MergeReport, OutputFiles};
use session::{LoadedTable, MergeSession};
use source::Source;

/// Output file stems. Sheet names inside the XLSX files match.
const MASTER_FILE_STEM: &str = "MDtable";
const MAPPING_FILE_STEM: &str = "MDmapping";

#[derive(Parser)]
#[command(name = "mdmerge")]
#[command(about = "Merge two master-data extracts into a master table and a mapping table")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge two extracts and write MDtable / MDmapping
    #[command(after_help = "\
Examples:
  mdmerge merge --primary S4_Country.xlsx --secondary ECC_Country.xlsx
  mdmerge merge --primary s4.csv --secondary ecc.csv --key 'Country/Region Key' --format csv
  mdmerge merge --primary S4.xlsx --secondary 'https://docs.google.com/spreadsheets/d/<id>/edit' \\
      --primary-label S4 --secondary-label ECC --out-dir out --json
  mdmerge merge --config mdmerge.toml")]
    Merge(MergeArgs),

    /// Show row/column counts, column names and the first rows of a source
    #[command(after_help = "\
Examples:
  mdmerge inspect S4_Country.xlsx
  mdmerge inspect ECC_Country.xlsx --sheet Countries --rows 10
  mdmerge inspect ecc.csv --json")]
    Inspect {
        /// File path or http(s) URL
        source: String,

        /// Worksheet name (default: first sheet)
        #[arg(long)]
        sheet: Option<String>,

        /// Number of preview rows
        #[arg(long, default_value_t = 5)]
        rows: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate sources and key fields without merging
    #[command(after_help = "\
Examples:
  mdmerge check --primary S4.xlsx --secondary ECC.xlsx
  mdmerge check --primary S4.xlsx --secondary ECC.xlsx --key Country --key Region --json")]
    Check {
        #[command(flatten)]
        input: InputArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Sources and merge options shared by `merge` and `check`.
#[derive(Args)]
struct InputArgs {
    /// Primary (authoritative) extract: file path or http(s) URL
    #[arg(long)]
    primary: Option<String>,

    /// Secondary extract: file path or http(s) URL
    #[arg(long)]
    secondary: Option<String>,

    /// Worksheet in the primary workbook (default: first sheet)
    #[arg(long)]
    primary_sheet: Option<String>,

    /// Worksheet in the secondary workbook (default: first sheet)
    #[arg(long)]
    secondary_sheet: Option<String>,

    /// Key field; repeat for a composite key (default: 'Country/Region Key' if
    /// present, else the first column alphabetically)
    #[arg(long = "key", value_name = "COLUMN")]
    keys: Vec<String>,

    /// Prefix for data columns in the mapping table
    #[arg(long)]
    prefix: Option<String>,

    /// Name of the display identifier column
    #[arg(long)]
    display_column: Option<String>,

    /// Text written in the mapping table for primary rows
    #[arg(long)]
    primary_label: Option<String>,

    /// Text written in the mapping table for secondary rows
    #[arg(long)]
    secondary_label: Option<String>,

    /// TOML job file; flags override its values
    #[arg(long, env = "MDMERGE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct MergeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Directory for MDtable / MDmapping (created if missing)
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Output format: xlsx or csv
    #[arg(long, default_value = "xlsx")]
    format: TableFormat,

    /// Print the JSON report to stdout
    #[arg(long)]
    json: bool,

    /// Also write the JSON report to this file
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("MDMERGE_GIT_HASH"), ")",
        "\nengine:  mdmerge-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("MDMERGE_TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(
        &LogConfig::from_verbosity(cli.verbose, cli.log_format)
            .with_ansi(std::env::var_os("NO_COLOR").is_none()),
    );

    let result = match cli.command {
        Commands::Merge(args) => cmd_merge(args),
        Commands::Inspect { source, sheet, rows, json } => cmd_inspect(source, sheet, rows, json),
        Commands::Check { input, json } => cmd_check(input, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn write(path: &Path, err: impl std::fmt::Display) -> Self {
        Self {
            code: EXIT_WRITE,
            message: format!("cannot write {}: {}", path.display(), err),
            hint: None,
        }
    }

    /// Reconciler error, with the available columns as a hint when a key
    /// field is the problem.
    pub fn recon(err: ReconError, columns: &[String]) -> Self {
        let hint = match &err {
            ReconError::NoKeyFields | ReconError::MissingKeyFields { .. } if !columns.is_empty() => {
                Some(format!("available columns: {}", columns.join(", ")))
            }
            ReconError::EmptyInputs => Some("both extracts have no data rows".to_string()),
            _ => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Input resolution (flags > job file > defaults)
// ============================================================================

struct SourceChoice {
    source: Source,
    sheet: Option<String>,
}

struct ResolvedInputs {
    primary: SourceChoice,
    secondary: SourceChoice,
    options: MergeOptions,
}

fn resolve_inputs(args: InputArgs) -> Result<ResolvedInputs, CliError> {
    let job = match &args.config {
        Some(path) => JobConfig::load(path)?,
        None => JobConfig::default(),
    };
    let base_dir = job.base_dir.as_deref();

    let choose = |flag: Option<String>,
                  flag_sheet: Option<String>,
                  spec: Option<&job::SourceSpec>,
                  name: &str|
     -> Result<SourceChoice, CliError> {
        match (flag, spec) {
            (Some(raw), _) => Ok(SourceChoice {
                source: Source::parse(&raw, None),
                sheet: flag_sheet,
            }),
            (None, Some(spec)) => Ok(SourceChoice {
                source: Source::parse(&spec.source, base_dir),
                sheet: flag_sheet.or_else(|| spec.sheet.clone()),
            }),
            (None, None) => Err(CliError::usage(format!("missing --{name}"))
                .with_hint(format!("pass --{name} FILE|URL or set [{name}] source in --config"))),
        }
    };

    let primary = choose(args.primary, args.primary_sheet, job.primary.as_ref(), "primary")?;
    let secondary = choose(
        args.secondary,
        args.secondary_sheet,
        job.secondary.as_ref(),
        "secondary",
    )?;

    let mut options = job.options;
    if !args.keys.is_empty() {
        options.key_fields = args.keys;
    }
    if let Some(prefix) = args.prefix {
        options.prefix = prefix;
    }
    if let Some(display_column) = args.display_column {
        options.display_column = display_column;
    }
    if let Some(label) = args.primary_label {
        options.labels.primary = label;
    }
    if let Some(label) = args.secondary_label {
        options.labels.secondary = label;
    }
    options.validate().map_err(|e| CliError::recon(e, &[]))?;

    Ok(ResolvedInputs { primary, secondary, options })
}

fn load_session(inputs: ResolvedInputs) -> Result<MergeSession, CliError> {
    let client = FetchClient::new()?;
    let load = |choice: SourceChoice, label: SourceLabel| -> Result<LoadedTable, CliError> {
        let table = choice.source.load(choice.sheet.as_deref(), label, &client)?;
        Ok(LoadedTable { source: choice.source, sheet: choice.sheet, table })
    };

    let primary = load(inputs.primary, SourceLabel::Primary)?;
    let secondary = load(inputs.secondary, SourceLabel::Secondary)?;
    Ok(MergeSession::new(primary, secondary, inputs.options))
}

// ============================================================================
// merge
// ============================================================================

fn cmd_merge(args: MergeArgs) -> Result<(), CliError> {
    let mut session = load_session(resolve_inputs(args.input)?)?;

    let mut options_used = session.options().clone();
    options_used.key_fields = session.key_fields();

    if let Some(e) = session.run().err() {
        return Err(CliError::recon(e, &session.column_union()));
    }
    let result = session
        .last_result()
        .ok_or_else(|| CliError { code: EXIT_ERROR, message: "merge produced no result".into(), hint: None })?;

    std::fs::create_dir_all(&args.out_dir).map_err(|e| CliError::write(&args.out_dir, e))?;
    let table_path = args.out_dir.join(format!("{MASTER_FILE_STEM}.{}", args.format.extension()));
    let mapping_path = args.out_dir.join(format!("{MAPPING_FILE_STEM}.{}", args.format.extension()));
    write_output(&result.master, MASTER_FILE_STEM, &table_path, args.format)?;
    write_output(&result.mapping, MAPPING_FILE_STEM, &mapping_path, args.format)?;

    let report = MergeReport::new(
        &session,
        options_used,
        &result.summary,
        OutputFiles { format: args.format, table: table_path, mapping: mapping_path },
    );
    report::print_human_summary(&report);

    if args.json || args.summary_out.is_some() {
        let json = report.to_json().map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        if let Some(path) = &args.summary_out {
            std::fs::write(path, &json).map_err(|e| CliError::write(path, e))?;
            eprintln!("wrote {}", path.display());
        }
        if args.json {
            println!("{json}");
        }
    }

    Ok(())
}

fn write_output<T: Tabular>(
    table: &T,
    sheet_name: &str,
    path: &Path,
    format: TableFormat,
) -> Result<(), CliError> {
    let written = match format {
        TableFormat::Xlsx => xlsx::write_table(table, sheet_name, path),
        TableFormat::Csv => csv_out::to_bytes(table)
            .and_then(|bytes| std::fs::write(path, bytes).map_err(Into::into)),
    };
    written.map_err(|e| CliError::write(path, e))?;
    tracing::info!("wrote {} ({} rows)", path.display(), table.rows().len());
    Ok(())
}

// ============================================================================
// inspect
// ============================================================================

#[derive(Serialize)]
struct InspectOutput {
    source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sheet: Option<String>,
    #[serde(flatten)]
    profile: TableProfile,
}

fn cmd_inspect(raw: String, sheet: Option<String>, rows: usize, json: bool) -> Result<(), CliError> {
    let source = Source::parse(&raw, None);
    let client = FetchClient::new()?;
    let table = source.load(sheet.as_deref(), SourceLabel::Primary, &client)?;
    let profile = TableProfile::new(&table, rows);

    if json {
        let out = InspectOutput { source: source.to_string(), sheet, profile };
        let text = serde_json::to_string_pretty(&out).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{text}");
        return Ok(());
    }

    println!("source:  {source}");
    if let Some(sheet) = &sheet {
        println!("sheet:   {sheet}");
    }
    println!("rows:    {}", profile.row_count);
    println!("columns: {}", profile.column_count);
    for (idx, column) in profile.columns.iter().enumerate() {
        let note = if profile.empty_columns.contains(column) { "  (empty)" } else { "" };
        println!("  {:>3}  {}{}", idx + 1, column, note);
    }
    if !profile.preview.is_empty() {
        println!();
        print_preview(&profile.columns, &profile.preview);
    }
    Ok(())
}

/// Tab-separated preview rows under a header line.
fn print_preview(columns: &[String], rows: &[Record]) {
    println!("{}", columns.join("\t"));
    for row in rows {
        let cells: Vec<&str> = columns.iter().map(|c| row.value(c)).collect();
        println!("{}", cells.join("\t"));
    }
}

// ============================================================================
// check
// ============================================================================

#[derive(Serialize)]
struct CheckSource {
    label: String,
    source: String,
    rows: usize,
    columns: Vec<String>,
    notes: Vec<String>,
}

#[derive(Serialize)]
struct CheckOutput {
    ok: bool,
    primary: CheckSource,
    secondary: CheckSource,
    suggested_key_fields: Vec<String>,
    key_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn cmd_check(input: InputArgs, json: bool) -> Result<(), CliError> {
    let session = load_session(resolve_inputs(input)?)?;
    let key_fields = session.key_fields();

    let describe = |loaded: &LoadedTable, label: &str| {
        let mut notes = Vec::new();
        if loaded.table.is_empty() {
            notes.push("no data rows".to_string());
        }
        for field in &key_fields {
            if !loaded.table.has_column(field) {
                notes.push(format!("key field '{field}' missing, values treated as empty"));
            }
        }
        CheckSource {
            label: label.to_string(),
            source: loaded.source.to_string(),
            rows: loaded.table.len(),
            columns: loaded.table.columns.clone(),
            notes,
        }
    };

    let labels = &session.options().labels;
    let validation = validate_inputs(
        &session.primary().table,
        &session.secondary().table,
        &key_fields,
    );
    let output = CheckOutput {
        ok: validation.is_ok(),
        primary: describe(session.primary(), &labels.primary),
        secondary: describe(session.secondary(), &labels.secondary),
        suggested_key_fields: session.suggested_key_fields(),
        key_fields: key_fields.clone(),
        error: validation.as_ref().err().map(ToString::to_string),
    };

    if json {
        let text = serde_json::to_string_pretty(&output).map_err(|e| CliError {
            code: EXIT_ERROR,
            message: format!("JSON serialization error: {e}"),
            hint: None,
        })?;
        println!("{text}");
    } else {
        for side in [&output.primary, &output.secondary] {
            println!("{} ({}): {} rows, {} columns", side.label, side.source, side.rows, side.columns.len());
            println!("  columns: {}", side.columns.join(", "));
            for note in &side.notes {
                println!("  note: {note}");
            }
        }
        println!("suggested key fields: {}", output.suggested_key_fields.join(", "));
        println!("key fields:           {}", output.key_fields.join(", "));
        if output.ok {
            println!("ok");
        }
    }

    match validation {
        Ok(_) => Ok(()),
        Err(e) => Err(CliError::recon(e, &session.column_union())),
    }
}
