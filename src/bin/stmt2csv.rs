//! CLI binary for stmtparse.
//!
//! A thin shim over the library crate that maps CLI flags to `ParseConfig`,
//! writes one CSV per statement and prints the summaries.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use stmtparse::{
    parse_statement, read_csv, write_csv, AccountType, PageSelection, PageSource, ParseConfig,
    PdfiumEngine, StatementDocument, StatementOutput, Summary,
};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Current-account statement → statement_parsed.csv next to the PDF
  stmt2csv parse -t current-account statement.pdf

  # Several card statements into one directory
  stmt2csv parse -t credit-card -o out/ jan.pdf feb.pdf mar.pdf

  # Only the first two pages, JSON on stdout
  stmt2csv parse -t credit-card --pages 1-2 --json card.pdf

  # Re-summarise a CSV after editing it
  stmt2csv summarize -t current-account statement_parsed.csv

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (otherwise ./ then the system path)
  STMT2CSV_ACCOUNT_TYPE   Default for --account-type
  STMT2CSV_OUTPUT_DIR     Default for --output-dir
  STMT2CSV_PASSWORD       PDF user password
  RUST_LOG                Overrides -v / -q log filtering
"#;

/// Extract transaction tables from bank-statement PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "stmt2csv",
    version,
    about = "Extract transaction tables from bank-statement PDFs into CSV",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "STMT2CSV_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "STMT2CSV_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse statement PDFs and write `<stem>_parsed.csv` for each.
    Parse {
        /// Statement PDF files.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Statement layout of the inputs.
        #[arg(short = 't', long, env = "STMT2CSV_ACCOUNT_TYPE", value_enum)]
        account_type: AccountArg,

        /// Directory for the CSV files (default: next to each input).
        #[arg(short, long, env = "STMT2CSV_OUTPUT_DIR")]
        output_dir: Option<PathBuf>,

        /// Do not write CSV files.
        #[arg(long)]
        no_csv: bool,

        /// Print the full results (table, summary, stats) as JSON on stdout.
        #[arg(long, env = "STMT2CSV_JSON")]
        json: bool,

        /// Page selection: all, 5, 3-15, or 1,3,5,7.
        #[arg(long, env = "STMT2CSV_PAGES", default_value = "all")]
        pages: String,

        /// PDF user password for encrypted statements.
        #[arg(long, env = "STMT2CSV_PASSWORD")]
        password: Option<String>,

        /// Path to the pdfium shared library.
        #[arg(long, env = "PDFIUM_LIB_PATH")]
        pdfium_lib: Option<PathBuf>,
    },

    /// Recompute the summary of an (edited) CSV written by `parse`.
    Summarize {
        /// CSV file.
        csv: PathBuf,

        /// Statement layout of the CSV.
        #[arg(short = 't', long, env = "STMT2CSV_ACCOUNT_TYPE", value_enum)]
        account_type: AccountArg,

        /// Print the summary as JSON.
        #[arg(long, env = "STMT2CSV_JSON")]
        json: bool,
    },
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum AccountArg {
    CurrentAccount,
    CreditCard,
}

impl From<AccountArg> for AccountType {
    fn from(v: AccountArg) -> Self {
        match v {
            AccountArg::CurrentAccount => AccountType::CurrentAccount,
            AccountArg::CreditCard => AccountType::CreditCard,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Parse {
            ref inputs,
            account_type,
            ref output_dir,
            no_csv,
            json,
            ref pages,
            ref password,
            ref pdfium_lib,
        } => {
            let mut builder = ParseConfig::builder().pages(parse_pages(pages)?);
            if let Some(pwd) = password {
                builder = builder.password(pwd.clone());
            }
            if let Some(lib) = pdfium_lib {
                builder = builder.pdfium_library(lib.clone());
            }
            let config = builder.build().context("Invalid configuration")?;
            let target = if no_csv { None } else { Some(output_dir.as_deref()) };

            run_parse(inputs, account_type.into(), target, json, cli.quiet, &config)
        }
        Command::Summarize {
            ref csv,
            account_type,
            json,
        } => run_summarize(csv, account_type.into(), json),
    }
}

/// Parse each input in turn. `csv_dir` is `None` when CSV output is off,
/// `Some(None)` to write next to each input.
fn run_parse(
    inputs: &[PathBuf],
    account_type: AccountType,
    csv_dir: Option<Option<&Path>>,
    json: bool,
    quiet: bool,
    config: &ParseConfig,
) -> Result<()> {
    let engine = PdfiumEngine::bind(config.pdfium_library.as_deref())
        .context("Failed to load the PDF engine")?;

    let outputs = parse_inputs(inputs, account_type, csv_dir, quiet, &engine, config)?;

    if json {
        let json = serde_json::to_string_pretty(&outputs).context("Failed to serialise output")?;
        println!("{json}");
    }

    let degraded = outputs.iter().filter(|o| o.is_degraded()).count();
    if degraded == inputs.len() {
        anyhow::bail!("No statement could be read ({} of {} failed)", degraded, inputs.len());
    }
    Ok(())
}

/// One output per input, in order. An input that cannot be opened is
/// reported and kept as a degraded output; the rest still run.
fn parse_inputs<S: PageSource + ?Sized>(
    inputs: &[PathBuf],
    account_type: AccountType,
    csv_dir: Option<Option<&Path>>,
    quiet: bool,
    source: &S,
    config: &ParseConfig,
) -> Result<Vec<StatementOutput>> {
    let mut outputs: Vec<StatementOutput> = Vec::with_capacity(inputs.len());

    for input in inputs {
        let document = match StatementDocument::open(input) {
            Ok(document) => document,
            Err(err) => {
                eprintln!(
                    "{} {}  {}",
                    red("✘"),
                    bold(&input.display().to_string()),
                    red(&err.to_string())
                );
                outputs.push(StatementOutput::failed(account_type, err));
                continue;
            }
        };
        let output = parse_statement(account_type, &document, source, config);

        let written = match csv_dir {
            Some(dir) => Some(write_output_csv(input, dir, &output)?),
            None => None,
        };

        if let Some(reason) = &output.extraction_error {
            eprintln!("{} {}  {}", red("✘"), bold(document.name()), red(reason));
        } else if !quiet {
            eprintln!(
                "{} {}  {}",
                green("✔"),
                bold(document.name()),
                dim(account_type.label())
            );
            print_summary(&output.summary);
            eprintln!(
                "   {}",
                dim(&format!(
                    "{} rows kept, {} dropped, {} tables ({} skipped), {}ms",
                    output.stats.rows_accepted,
                    output.stats.rows_rejected,
                    output.stats.tables_found,
                    output.stats.tables_skipped,
                    output.stats.duration_ms
                ))
            );
        }
        if let Some(path) = written.filter(|_| !quiet) {
            eprintln!("   →  {}", bold(&path.display().to_string()));
        }

        outputs.push(output);
    }
    Ok(outputs)
}

/// `<dir>/<stem>_parsed.csv`, with `dir` defaulting to the input's directory.
fn csv_path(input: &Path, dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "statement".to_string());
    let dir = dir
        .map(Path::to_path_buf)
        .or_else(|| input.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    dir.join(format!("{stem}_parsed.csv"))
}

fn write_output_csv(input: &Path, dir: Option<&Path>, output: &StatementOutput) -> Result<PathBuf> {
    if let Some(dir) = dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }
    let path = csv_path(input, dir);
    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(&output.statement, file).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

fn run_summarize(csv: &Path, account_type: AccountType, json: bool) -> Result<()> {
    let file = std::fs::File::open(csv).with_context(|| format!("Failed to open {}", csv.display()))?;
    let statement = read_csv(account_type, file)
        .with_context(|| format!("Failed to read {} as {}", csv.display(), account_type))?;
    let summary = statement.summarize();

    if json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?;
        println!("{json}");
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    eprintln!("   Transactions  {}", summary.transactions);
    eprintln!("   Start Date    {}", summary.start_date);
    eprintln!("   End Date      {}", summary.end_date);
    eprintln!("   Total Debit   {:.2}", summary.total_debit);
    eprintln!("   Total Credit  {:.2}", summary.total_credit);
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .context(format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if pages.contains(&0) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got 0)");
        }

        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}
