//! Ledger import extract
//!
//! Writes canonical transactions in the column shape accounting packages accept
//! for import, and totals a statement for the bank-only path.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::types::*;
use crate::utils::parsing::format_money;

/// Header row of the import extract
pub const LEDGER_IMPORT_HEADER: [&str; 5] = ["Date", "Description", "Reference", "Debit", "Credit"];

/// Date format of the import extract
pub const LEDGER_IMPORT_DATE_FORMAT: &str = "%m/%d/%Y";

/// Write transactions as an import-ready CSV, amounts rounded to cents
pub fn write_ledger_import_csv<W: Write>(writer: W, transactions: &[Transaction]) -> ReconResult<()> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(LEDGER_IMPORT_HEADER)?;

    for transaction in transactions {
        csv.write_record([
            transaction.date.format(LEDGER_IMPORT_DATE_FORMAT).to_string(),
            transaction.description.clone(),
            transaction.reference().unwrap_or("").to_string(),
            format_money(&transaction.debit),
            format_money(&transaction.credit),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Render the import extract into a string
pub fn to_ledger_import_string(transactions: &[Transaction]) -> ReconResult<String> {
    let mut buffer = Vec::new();
    write_ledger_import_csv(&mut buffer, transactions)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Count and debit/credit totals of a statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementTotals {
    pub count: usize,
    pub total_debits: BigDecimal,
    pub total_credits: BigDecimal,
}

impl StatementTotals {
    /// Credits minus debits
    pub fn net(&self) -> BigDecimal {
        &self.total_credits - &self.total_debits
    }
}

/// Totals of a set of transactions
pub fn statement_totals(transactions: &[Transaction]) -> StatementTotals {
    StatementTotals {
        count: transactions.len(),
        total_debits: transactions.iter().map(|t| &t.debit).sum(),
        total_credits: transactions.iter().map(|t| &t.credit).sum(),
    }
}
