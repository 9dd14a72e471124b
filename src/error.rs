//! Error types for the stmtparse library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`StatementError`] — **Fatal** at a boundary: the input cannot be opened,
//!   pdfium cannot be bound, a CSV cannot be read back. Returned as
//!   `Err(StatementError)` from constructors and import/export helpers.
//!   Inside a parse run, a document-level failure is *not* propagated; it is
//!   recorded in [`crate::output::StatementOutput::extraction_error`] next to
//!   an empty table.
//!
//! * [`RowRejection`] — **Non-fatal**: one raw row did not describe a
//!   transaction (header, blank separator, continuation line, short row).
//!   The row is dropped and counted; every other row is unaffected.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the stmtparse library.
#[derive(Debug, Error)]
pub enum StatementError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The bytes were read, but they are not a PDF.
    #[error("'{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: Vec<u8> },

    /// Reading the input stream failed part-way.
    #[error("Failed to read '{name}': {source}")]
    ReadFailed {
        name: String,
        #[source]
        source: std::io::Error,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{name}' is corrupt: {detail}")]
    CorruptPdf { name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{name}'")]
    WrongPassword { name: String },

    /// The scratch copy needed by the file-based engine call could not be written.
    #[error("Failed to create scratch copy of the statement: {0}")]
    ScratchFile(#[source] std::io::Error),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Place libpdfium next to the binary, install it system-wide,\n\
or set PDFIUM_LIB_PATH=/path/to/libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Export / import errors ────────────────────────────────────────────
    /// The CSV header does not match the layout's fixed columns.
    #[error("CSV header {found:?} does not match the {layout} columns {expected:?}")]
    SchemaMismatch {
        layout: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The account-type label is not one of the two recognised layouts.
    #[error("Unknown account type '{0}' (expected \"Current Account\" or \"Credit Card\")")]
    UnknownAccountType(String),
}

/// Why a single raw row was not turned into a record.
///
/// Rejections are expected on every statement (headers, footers, wrapped
/// descriptions) and are only logged at `trace` level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowRejection {
    /// The row had no cells at all.
    #[error("row is empty")]
    Empty,

    /// The first cell is the literal column header `Date`.
    #[error("row is a column header")]
    Header,

    /// The first cell is absent or blank (separator or continuation line).
    #[error("first cell is blank")]
    BlankLeadingCell,

    /// A positional cell the layout needs is missing.
    #[error("cell {index} is missing")]
    MissingCell { index: usize },

    /// The first cell is not a `DD/MM/YYYY` calendar date.
    #[error("'{0}' is not a DD/MM/YYYY date")]
    InvalidDate(String),

    /// The amount cell holds no value once the credit marker is stripped.
    #[error("amount cell is empty")]
    MissingAmount,
}
