//! `cleanse`: command-line front end for the data-cleansing library.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use signal_hook::consts::SIGINT;
use signal_hook::iterator::Signals;

use rust_data_cleansing::frame::Axis;
use rust_data_cleansing::io::CsvOptions;
use rust_data_cleansing::series::{FillMethod, NormalizeMethod};
use rust_data_cleansing::session::{CommandSeverity, Session, SessionOptions, StdErrObserver};

/// Exit status used when the run is interrupted with Ctrl+C.
const INTERRUPTED: i32 = 130;

#[derive(Parser)]
#[command(name = "cleanse")]
#[command(about = "Inspect and clean tabular CSV data")]
#[command(version)]
struct Cli {
    /// Input CSV file (the first row holds the column labels)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output CSV file for transforms (default: stdout)
    #[arg(short, long, value_name = "OUTPUT", global = true)]
    out: Option<PathBuf>,

    /// Increase verbosity (debug logs and per-command reports on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Field delimiter used for reading and writing
    #[arg(long, default_value = ",", value_parser = parse_delimiter, global = true)]
    delimiter: u8,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Display data statistics
    Stats(StatsArgs),

    /// Fill null values
    Fillna {
        /// Method for numeric columns (mean, median, mode); other columns always use their mode
        #[arg(short, long, value_name = "METHOD")]
        method: FillMethod,

        /// Only process this column (default: every column)
        #[arg(short, long, value_name = "COL")]
        column: Option<String>,
    },

    /// Drop rows or columns with null values
    Dropna {
        /// Axis to search for null values (0: row, 1: column)
        #[arg(short, long, value_name = "AXIS", value_parser = clap::value_parser!(i64).range(0..=1))]
        axis: i64,

        /// Null ratio (0 to 1) at or above which a row/column is dropped
        #[arg(short, long, value_name = "THRESHOLD", default_value_t = 0.5)]
        threshold: f64,
    },

    /// Only keep unique rows
    Dropdup,

    /// Normalize a column
    Normalize {
        /// Method to normalize (zscore, minmax)
        #[arg(short, long, value_name = "METHOD", default_value = "zscore")]
        method: NormalizeMethod,

        /// Column to work on
        #[arg(short, long, value_name = "COL")]
        column: String,
    },

    /// Evaluate a columnar expression. Tokens must be separated by spaces, e.g. "A * B + C"
    Evaluate {
        expression: String,

        /// Output column label
        #[arg(short, long, value_name = "COL")]
        column: Option<String>,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct StatsArgs {
    /// Print (rows, columns)
    #[arg(long)]
    shape: bool,

    /// List every column with its dtype
    #[arg(short = 'l', long)]
    list_columns: bool,

    /// Describe one column
    #[arg(short, long, value_name = "COL")]
    describe: Option<String>,

    /// Count rows holding at least one null
    #[arg(short = 'r', long)]
    count_null_rows: bool,

    /// List columns holding nulls
    #[arg(short = 'n', long)]
    list_null_columns: bool,
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("delimiter must be a single ASCII character, got {s:?}")),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = install_interrupt_handler() {
        tracing::warn!(error = %e, "could not install the Ctrl+C handler");
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Ctrl+C prints a notice and exits. Output files are only renamed into place once fully
/// written, so an interrupted run leaves any existing output untouched.
fn install_interrupt_handler() -> Result<()> {
    let mut signals = Signals::new([SIGINT]).context("registering SIGINT")?;
    thread::spawn(move || {
        if signals.forever().next().is_some() {
            eprintln!("\nInterrupted, good bye!");
            std::process::exit(INTERRUPTED);
        }
    });
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let options = SessionOptions {
        csv: CsvOptions {
            delimiter: cli.delimiter,
        },
        observer: if cli.verbose {
            Some(Arc::new(StdErrObserver))
        } else {
            None
        },
        alert_at_or_above: CommandSeverity::Critical,
    };

    let mut session = Session::open(&cli.input, options)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let out = cli.out.as_deref();

    match cli.command {
        Command::Stats(stats) => run_stats(&session, &stats, cli.json),
        Command::Fillna { method, column } => {
            let filled = session.fill_na(method, column.as_deref())?;
            tracing::info!(filled, "filled null cells");
            session.write(out)?;
            Ok(())
        }
        Command::Dropna { axis, threshold } => {
            let axis = Axis::try_from(axis)?;
            let dropped = session.drop_na(axis, threshold)?;
            tracing::info!(dropped, ?axis, "dropped sparse entries");
            session.write(out)?;
            Ok(())
        }
        Command::Dropdup => {
            let unique = session.drop_duplicates();
            session.write_frame(&unique, out)?;
            Ok(())
        }
        Command::Normalize { method, column } => {
            session.normalize(method, &column)?;
            session.write(out)?;
            Ok(())
        }
        Command::Evaluate { expression, column } => {
            let result = session
                .evaluate(&expression, column.as_deref())
                .with_context(|| format!("evaluating {expression:?}"))?;
            session.write_frame(&result, out)?;
            Ok(())
        }
    }
}

fn run_stats(session: &Session, stats: &StatsArgs, json: bool) -> Result<()> {
    if stats.shape {
        let (rows, columns) = session.shape();
        emit(&(rows, columns), json, || format!("({rows}, {columns})"))
    } else if stats.list_columns {
        let listing = session.list_columns();
        emit(&listing, json, || listing.to_string())
    } else if let Some(label) = stats.describe.as_deref() {
        let summary = session.describe(label)?;
        emit(&summary, json, || summary.to_string())
    } else if stats.count_null_rows {
        let n = session.count_na_rows();
        emit(&n, json, || format!("Number of null rows in dataframe: {n}"))
    } else if stats.list_null_columns {
        let counts = session.count_na_columns();
        emit(&counts, json, || counts.to_string())
    } else {
        bail!("no statistic selected")
    }
}

fn emit<T: Serialize>(value: &T, json: bool, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}
