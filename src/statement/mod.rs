//! Statement parser adapters
//!
//! Each adapter maps one bank or ledger file layout onto the canonical
//! [`Transaction`](crate::types::Transaction). Bank layouts are selected with
//! [`BankFormat`]; ledger exports go through [`LedgerExportParser`].

pub mod chase;
pub mod ledger_export;
pub mod transaction;
pub mod wells_fargo;

pub use chase::*;
pub use ledger_export::*;
pub use transaction::*;
pub use wells_fargo::*;

use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::traits::StatementParser;
use crate::types::*;

/// Supported bank statement layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BankFormat {
    Chase,
    WellsFargo,
}

impl BankFormat {
    /// Every supported format
    pub fn all() -> [BankFormat; 2] {
        [BankFormat::Chase, BankFormat::WellsFargo]
    }

    /// Key used to select the format by name
    pub fn key(&self) -> &'static str {
        match self {
            BankFormat::Chase => "chase",
            BankFormat::WellsFargo => "wells_fargo",
        }
    }

    /// Parser for this format
    pub fn parser(&self) -> Box<dyn StatementParser> {
        match self {
            BankFormat::Chase => Box::new(ChaseParser::new()),
            BankFormat::WellsFargo => Box::new(WellsFargoParser::new()),
        }
    }

    fn available() -> String {
        Self::all()
            .iter()
            .map(|format| format.key())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for BankFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for BankFormat {
    type Err = ReconciliationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        Self::all()
            .into_iter()
            .find(|format| format.key() == key)
            .ok_or_else(|| ReconciliationError::UnknownFormat {
                name: s.to_string(),
                available: Self::available(),
            })
    }
}

/// Raw CSV record as one comma-joined line, for error reports
pub(crate) fn raw_record(record: &StringRecord) -> String {
    record.iter().collect::<Vec<_>>().join(",")
}

/// Field at `index`, trimmed; missing fields read as empty
pub(crate) fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).map(str::trim).unwrap_or("")
}

/// Whether every field of the record is blank
pub(crate) fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

/// Index of the first header containing any of the candidate names
pub(crate) fn find_column(headers: &StringRecord, candidates: &[&str]) -> Option<usize> {
    let headers: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
    candidates.iter().find_map(|candidate| {
        headers
            .iter()
            .position(|header| header.contains(candidate))
    })
}

/// Validation error for a source row, carrying the raw record
pub(crate) fn row_error(
    source: Source,
    row: usize,
    message: String,
    record: &StringRecord,
) -> ReconciliationError {
    ReconciliationError::validation(source, row, message, raw_record(record))
}
