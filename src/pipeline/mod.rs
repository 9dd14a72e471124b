//! Pipeline stages for statement extraction.
//!
//! Each submodule implements one step; the two layout pipelines below wire
//! them together.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ engine ──▶ lattice | stream ──▶ normalize ──▶ table
//! (bytes)   (pdfium)   (RawTable)           (Record)     (StatementTable)
//! ```
//!
//! 1. [`input`]   — hold the document bytes; stage a scratch file when the
//!    engine needs a path
//! 2. [`engine`]  — read glyph and ruling geometry per page
//! 3. [`lattice`] — ruled tables (current account), one page at a time
//! 4. [`stream`]  — whitespace-aligned tables (credit card), all pages
//! 5. [`crate::normalize`] — raw rows to records, rejecting the rest
//!
//! A document the engine cannot read does not fail the pipeline: the
//! outcome is an empty table with `extraction_error` set.

pub mod engine;
pub mod input;
pub mod lattice;
pub mod layout;
pub mod stream;

use crate::config::ParseConfig;
use crate::error::{RowRejection, StatementError};
use crate::normalize::{normalize_credit_card, normalize_current_account};
use crate::output::{ExtractionStats, ParseOutcome};
use crate::table::{CreditCardRecord, CurrentAccountRecord, RawRow, Record, StatementTable};
use engine::PageSource;
use input::{ScratchFile, StatementDocument};
use layout::PageLayout;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Column count of a credit-card transaction table.
const CARD_TABLE_COLUMNS: usize = 4;

/// One statement layout, from document to table.
pub trait StatementPipeline {
    type Record: Record;

    /// Extract every transaction of `document`. Never fails; see
    /// [`ParseOutcome::extraction_error`].
    fn parse(&self, document: &StatementDocument) -> ParseOutcome<Self::Record>;
}

// ── Current account ──────────────────────────────────────────────────────

/// Ruled tables read from the in-memory document, page by page.
pub struct CurrentAccountPipeline<'a, S: PageSource + ?Sized> {
    source: &'a S,
    config: &'a ParseConfig,
}

impl<'a, S: PageSource + ?Sized> CurrentAccountPipeline<'a, S> {
    pub fn new(source: &'a S, config: &'a ParseConfig) -> Self {
        Self { source, config }
    }
}

impl<S: PageSource + ?Sized> StatementPipeline for CurrentAccountPipeline<'_, S> {
    type Record = CurrentAccountRecord;

    fn parse(&self, document: &StatementDocument) -> ParseOutcome<CurrentAccountRecord> {
        let mut assembler = Assembler::start();

        let pages = match self
            .source
            .pages_from_bytes(document.name(), document.bytes(), self.config)
        {
            Ok(pages) => pages,
            Err(e) => return assembler.fail(document, e),
        };
        assembler.stats.pages = pages.len();

        for page in &pages {
            let tables = lattice::find_tables(page, &self.config.lattice);
            debug!("Page {}: {} ruled tables", page.page_num, tables.len());
            assembler.stats.tables_found += tables.len();
            for table in &tables {
                for row in &table.rows {
                    assembler.offer(table.page_num, row, normalize_current_account);
                }
            }
        }
        assembler.finish()
    }
}

// ── Credit card ──────────────────────────────────────────────────────────

/// Whitespace tables read from a scratch copy of the document.
pub struct CreditCardPipeline<'a, S: PageSource + ?Sized> {
    source: &'a S,
    config: &'a ParseConfig,
}

impl<'a, S: PageSource + ?Sized> CreditCardPipeline<'a, S> {
    pub fn new(source: &'a S, config: &'a ParseConfig) -> Self {
        Self { source, config }
    }

    fn load(&self, document: &StatementDocument) -> Result<Vec<PageLayout>, StatementError> {
        let scratch = ScratchFile::create(document.bytes())?;
        self.source
            .pages_from_file(document.name(), scratch.path(), self.config)
        // `scratch` is deleted here on both paths
    }
}

impl<S: PageSource + ?Sized> StatementPipeline for CreditCardPipeline<'_, S> {
    type Record = CreditCardRecord;

    fn parse(&self, document: &StatementDocument) -> ParseOutcome<CreditCardRecord> {
        let mut assembler = Assembler::start();

        let pages = match self.load(document) {
            Ok(pages) => pages,
            Err(e) => return assembler.fail(document, e),
        };
        assembler.stats.pages = pages.len();

        let tables = stream::find_tables_in_pages(&pages, &self.config.stream);
        assembler.stats.tables_found = tables.len();

        for table in &tables {
            let columns = table.column_count();
            if columns != CARD_TABLE_COLUMNS {
                debug!(
                    "Skipping {}-column table on page {} ({} rows)",
                    columns,
                    table.page_num,
                    table.rows.len()
                );
                assembler.stats.tables_skipped += 1;
                continue;
            }
            // Row 0 is the column header.
            for row in table.rows.iter().skip(1) {
                assembler.offer(table.page_num, row, normalize_credit_card);
            }
        }
        assembler.finish()
    }
}

// ── Assembly ─────────────────────────────────────────────────────────────

/// Collects accepted records in encounter order and counts the rest.
struct Assembler<R> {
    table: StatementTable<R>,
    stats: ExtractionStats,
    started: Instant,
}

impl<R: Record> Assembler<R> {
    fn start() -> Self {
        Self {
            table: StatementTable::new(),
            stats: ExtractionStats::default(),
            started: Instant::now(),
        }
    }

    fn offer(
        &mut self,
        page_num: usize,
        row: &RawRow,
        normalize: impl Fn(&RawRow) -> Result<R, RowRejection>,
    ) {
        self.stats.rows_seen += 1;
        match normalize(row) {
            Ok(record) => {
                self.table.push(record);
                self.stats.rows_accepted += 1;
            }
            Err(reason) => {
                self.stats.rows_rejected += 1;
                trace!("Page {}: dropped row {:?}: {}", page_num, row, reason);
            }
        }
    }

    fn finish(mut self) -> ParseOutcome<R> {
        self.stats.duration_ms = self.started.elapsed().as_millis() as u64;
        ParseOutcome {
            table: self.table,
            stats: self.stats,
            extraction_error: None,
        }
    }

    fn fail(mut self, document: &StatementDocument, error: StatementError) -> ParseOutcome<R> {
        warn!(
            "Could not extract tables from '{}' ({}): {}",
            document.name(),
            R::LAYOUT,
            error
        );
        self.stats.duration_ms = self.started.elapsed().as_millis() as u64;
        ParseOutcome::failed(error, self.stats)
    }
}
