//! Top-level parse entry points.
//!
//! [`parse_statement`] is the core: given a document, a page source and the
//! account type chosen by the user, it always returns a
//! [`StatementOutput`]. The helpers around it add the boundary work that
//! can fail outright, such as opening a file or binding pdfium, and report
//! that as `Err(StatementError)`.

use crate::account::AccountType;
use crate::config::ParseConfig;
use crate::error::StatementError;
use crate::export::write_csv;
use crate::output::StatementOutput;
use crate::pipeline::engine::{PageSource, PdfiumEngine};
use crate::pipeline::input::StatementDocument;
use crate::pipeline::{CreditCardPipeline, CurrentAccountPipeline, StatementPipeline};
use std::path::Path;
use tracing::info;

/// Parse one statement with the pipeline for `account_type`.
///
/// Document-level failures (corrupt file, wrong password) do not surface as
/// errors; the output carries an empty table and
/// [`StatementOutput::extraction_error`] says why.
pub fn parse_statement<S: PageSource + ?Sized>(
    account_type: AccountType,
    document: &StatementDocument,
    source: &S,
    config: &ParseConfig,
) -> StatementOutput {
    info!("Parsing '{}' as {}", document.name(), account_type);

    let output = match account_type {
        AccountType::CurrentAccount => {
            StatementOutput::from_outcome(CurrentAccountPipeline::new(source, config).parse(document))
        }
        AccountType::CreditCard => {
            StatementOutput::from_outcome(CreditCardPipeline::new(source, config).parse(document))
        }
    };

    info!(
        "'{}': {} transactions, {} rows dropped, {} tables ({} skipped) in {}ms",
        document.name(),
        output.summary.transactions,
        output.stats.rows_rejected,
        output.stats.tables_found,
        output.stats.tables_skipped,
        output.stats.duration_ms
    );
    output
}

/// Open a PDF on disk, bind pdfium and parse it.
///
/// # Errors
/// Returns `Err(StatementError)` only when the file cannot be opened or
/// is not a PDF, or when pdfium cannot be bound.
///
/// # Example
/// ```rust,no_run
/// use stmtparse::{parse_file, AccountType, ParseConfig};
///
/// let output = parse_file("statement.pdf", AccountType::CreditCard, &ParseConfig::default())?;
/// println!("{} transactions", output.summary.transactions);
/// # Ok::<(), stmtparse::StatementError>(())
/// ```
pub fn parse_file(
    path: impl AsRef<Path>,
    account_type: AccountType,
    config: &ParseConfig,
) -> Result<StatementOutput, StatementError> {
    let document = StatementDocument::open(path)?;
    let engine = PdfiumEngine::bind(config.pdfium_library.as_deref())?;
    Ok(parse_statement(account_type, &document, &engine, config))
}

/// Parse PDF bytes already in memory, e.g. an upload.
pub fn parse_bytes(
    name: impl Into<String>,
    bytes: Vec<u8>,
    account_type: AccountType,
    config: &ParseConfig,
) -> Result<StatementOutput, StatementError> {
    let document = StatementDocument::from_bytes(name, bytes)?;
    let engine = PdfiumEngine::bind(config.pdfium_library.as_deref())?;
    Ok(parse_statement(account_type, &document, &engine, config))
}

/// Parse a PDF and write its table as CSV to `output_path`.
///
/// The file is written even when the table is empty, so the header row is
/// always available for editing.
pub fn parse_to_csv(
    path: impl AsRef<Path>,
    account_type: AccountType,
    output_path: impl AsRef<Path>,
    config: &ParseConfig,
) -> Result<StatementOutput, StatementError> {
    let output = parse_file(path, account_type, config)?;
    let output_path = output_path.as_ref();

    let file = std::fs::File::create(output_path).map_err(|e| StatementError::OutputWriteFailed {
        path: output_path.to_path_buf(),
        source: e,
    })?;
    write_csv(&output.statement, file)?;
    info!("Written to {}", output_path.display());

    Ok(output)
}
