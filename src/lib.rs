//! # stmtparse
//!
//! Extract transaction tables from bank-statement PDFs and summarise them.
//!
//! Two statement layouts are supported, and the caller says which one a
//! document uses; nothing is auto-detected.
//!
//! | Layout | Tables | Columns |
//! |--------|--------|---------|
//! | Current Account | ruled grid | date, description, debit, credit, balance |
//! | Credit Card | whitespace-aligned | transaction_date, posting_date, description, debit, credit |
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input      read bytes, check %PDF magic
//!  ├─ 2. Engine     glyph + ruling geometry via pdfium
//!  ├─ 3. Detect     lattice (current account) or stream (credit card) tables
//!  ├─ 4. Normalize  raw rows → records; headers and noise rows dropped
//!  ├─ 5. Assemble   StatementTable in encounter order
//!  └─ 6. Summarise  count, date range, debit/credit totals
//! ```
//!
//! All cells stay text. A table can be edited and re-summarised with
//! [`Statement::summarize`], or exported with [`write_csv`] and read back
//! with [`read_csv`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stmtparse::{parse_file, AccountType, ParseConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let output = parse_file("statement.pdf", AccountType::CurrentAccount, &ParseConfig::default())?;
//!     if let Some(reason) = &output.extraction_error {
//!         eprintln!("could not read statement: {reason}");
//!     }
//!     println!("{} transactions, debit {:.2}", output.summary.transactions, output.summary.total_debit);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `stmt2csv` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! stmtparse = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod account;
pub mod config;
pub mod dates;
pub mod error;
pub mod export;
pub mod normalize;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod summary;
pub mod table;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use account::AccountType;
pub use config::{LatticeSettings, PageSelection, ParseConfig, ParseConfigBuilder, StreamSettings};
pub use dates::is_valid_date;
pub use error::{RowRejection, StatementError};
pub use export::{read_csv, write_csv};
pub use output::{ExtractionStats, ParseOutcome, StatementOutput};
pub use parse::{parse_bytes, parse_file, parse_statement, parse_to_csv};
pub use pipeline::engine::{PageSource, PdfiumEngine};
pub use pipeline::input::StatementDocument;
pub use pipeline::layout::{BBox, PageLayout, PathSegment};
pub use summary::Summary;
pub use table::{CreditCardRecord, CurrentAccountRecord, Record, Statement, StatementTable};
