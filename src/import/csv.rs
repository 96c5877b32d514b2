use std::io::{Read, Write};

use csv::{ReaderBuilder, WriterBuilder};
use serde::Deserialize;

use super::ImportError;
use crate::core::{Transaction, TransactionInput};

const HEADER: [&str; 7] = [
    "id",
    "description",
    "amount",
    "category",
    "date",
    "createdAt",
    "updatedAt",
];

#[derive(Deserialize)]
struct CsvRow {
    description: String,
    amount: String,
    category: String,
    date: String,
}

/// Reads candidate transactions from CSV with a header row.
///
/// Only `description`, `amount`, `category` and `date` are read; other
/// columns are ignored. Rows are returned unvalidated.
pub fn parse<R: Read>(reader: R) -> Result<Vec<TransactionInput>, ImportError> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let mut inputs = Vec::new();
    for result in rdr.deserialize() {
        let row: CsvRow = result.map_err(|e| ImportError::Parse(e.to_string()))?;
        inputs.push(TransactionInput {
            description: row.description,
            amount: row.amount,
            category: row.category,
            date: row.date,
        });
    }
    Ok(inputs)
}

/// Writes every transaction, header first.
pub fn export<W: Write>(writer: W, transactions: &[Transaction]) -> Result<(), ImportError> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    let csv_err = |e: csv::Error| ImportError::Parse(e.to_string());
    wtr.write_record(HEADER).map_err(csv_err)?;
    for t in transactions {
        let amount = t.amount.to_string();
        let created = t.created_at.to_rfc3339();
        let updated = t.updated_at.to_rfc3339();
        wtr.write_record([
            t.id.as_str(),
            t.description.as_str(),
            amount.as_str(),
            t.category.as_str(),
            t.date.as_str(),
            created.as_str(),
            updated.as_str(),
        ])
        .map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}
