//! CSV export and re-import of statement tables.
//!
//! Exported files are meant to be edited by hand and loaded back, so the
//! header is always written (also for an empty table) and checked strictly
//! on import. Cell text is written and read verbatim.

use crate::account::AccountType;
use crate::error::StatementError;
use crate::table::{CreditCardRecord, CurrentAccountRecord, Record, Statement, StatementTable};
use std::io::{Read, Write};

/// Write the layout header and one row per record.
pub fn write_csv(statement: &Statement, writer: impl Write) -> Result<(), StatementError> {
    match statement {
        Statement::CurrentAccount(table) => write_table(table, writer),
        Statement::CreditCard(table) => write_table(table, writer),
    }
}

/// Read a CSV written by [`write_csv`], possibly edited since.
///
/// # Errors
/// [`StatementError::SchemaMismatch`] when the header is not exactly the
/// columns of `account_type`; [`StatementError::Csv`] for malformed rows.
pub fn read_csv(account_type: AccountType, reader: impl Read) -> Result<Statement, StatementError> {
    Ok(match account_type {
        AccountType::CurrentAccount => read_table::<CurrentAccountRecord>(reader)?.into(),
        AccountType::CreditCard => read_table::<CreditCardRecord>(reader)?.into(),
    })
}

fn write_table<R: Record>(table: &StatementTable<R>, writer: impl Write) -> Result<(), StatementError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv_writer.write_record(table.columns())?;
    for record in table.records() {
        csv_writer.write_record(record.cells())?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn read_table<R: Record>(reader: impl Read) -> Result<StatementTable<R>, StatementError> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut found: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
    // Spreadsheets often save with a UTF-8 byte order mark.
    if let Some(first) = found.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
            csv_reader.set_headers(csv::StringRecord::from(found.clone()));
        }
    }
    if found != R::COLUMNS {
        return Err(StatementError::SchemaMismatch {
            layout: R::LAYOUT.to_string(),
            expected: R::COLUMNS.iter().map(|c| c.to_string()).collect(),
            found,
        });
    }

    csv_reader
        .deserialize::<R>()
        .map(|row| row.map_err(StatementError::from))
        .collect()
}
