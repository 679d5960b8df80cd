//! Core types and data structures for the reconciliation system

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the reconciliation a transaction originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Bank statement
    Bank,
    /// Accounting ledger export (the books)
    Ledger,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Bank => write!(f, "bank"),
            Source::Ledger => write!(f, "ledger"),
        }
    }
}

/// Canonical transaction that every statement parser must produce
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Display identifier assigned by the parser (e.g. `bank-3`)
    pub id: String,
    /// Date the transaction posted
    pub date: NaiveDate,
    /// Free text from the source file
    pub description: String,
    /// Money leaving the account (non-negative)
    pub debit: BigDecimal,
    /// Money entering the account (non-negative)
    pub credit: BigDecimal,
    /// Optional check number or transfer ID
    pub reference: Option<String>,
    /// Category label, assigned by the unmatched classifier
    pub category: Option<String>,
    /// Which side this transaction came from
    pub source: Source,
}

impl Transaction {
    /// Create a new transaction with zero debit and credit
    pub fn new(id: String, source: Source, date: NaiveDate, description: String) -> Self {
        Self {
            id,
            date,
            description,
            debit: BigDecimal::from(0),
            credit: BigDecimal::from(0),
            reference: None,
            category: None,
            source,
        }
    }

    /// Signed net value: credit minus debit
    pub fn amount(&self) -> BigDecimal {
        &self.credit - &self.debit
    }

    /// Whether money left the account
    pub fn is_debit(&self) -> bool {
        self.debit > BigDecimal::from(0)
    }

    /// Whether money entered the account
    pub fn is_credit(&self) -> bool {
        self.credit > BigDecimal::from(0)
    }

    /// Reference with surrounding whitespace removed, `None` when blank
    pub fn reference(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    /// Render the raw field values, used to locate a record in error reports
    pub fn raw_values(&self) -> String {
        format!(
            "id={}, date={}, description={:?}, debit={}, credit={}, reference={}",
            self.id,
            self.date,
            self.description,
            self.debit,
            self.credit,
            self.reference.as_deref().unwrap_or("-")
        )
    }

    /// Validate the canonical shape of the transaction
    ///
    /// `index` is the position of the transaction in its input sequence and is
    /// carried into the error so the record can be located.
    pub fn validate(&self, index: usize) -> ReconResult<()> {
        let zero = BigDecimal::from(0);

        if self.debit < zero {
            return Err(ReconciliationError::validation(
                self.source,
                index,
                format!("debit must not be negative, got {}", self.debit),
                self.raw_values(),
            ));
        }

        if self.credit < zero {
            return Err(ReconciliationError::validation(
                self.source,
                index,
                format!("credit must not be negative, got {}", self.credit),
                self.raw_values(),
            ));
        }

        if self.debit > zero && self.credit > zero {
            return Err(ReconciliationError::validation(
                self.source,
                index,
                "debit and credit cannot both be nonzero".to_string(),
                self.raw_values(),
            ));
        }

        Ok(())
    }
}

/// A bank/ledger pairing accepted by the matching engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Position of the bank transaction in the bank input
    pub bank_index: usize,
    /// Position of the ledger transaction in the ledger input
    pub ledger_index: usize,
    /// The bank side of the pair
    pub bank: Transaction,
    /// The ledger side of the pair
    pub ledger: Transaction,
    /// Absolute difference between the two signed amounts
    pub amount_delta: BigDecimal,
    /// Absolute difference between the two dates, in days
    pub date_delta_days: i64,
}

/// Errors that can occur while reconciling
#[derive(Debug, thiserror::Error)]
pub enum ReconciliationError {
    #[error("Validation error in {side} record #{index}: {message} ({raw})")]
    Validation {
        side: Source,
        index: usize,
        message: String,
        raw: String,
    },
    #[error("Invalid parameter: {0}")]
    Parameter(String),
    #[error("Unknown statement format '{name}' (available: {available})")]
    UnknownFormat { name: String, available: String },
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl ReconciliationError {
    /// Build a validation error for a single record
    pub fn validation(side: Source, index: usize, message: String, raw: String) -> Self {
        ReconciliationError::Validation {
            side,
            index,
            message,
            raw,
        }
    }
}

/// Result type for reconciliation operations
pub type ReconResult<T> = Result<T, ReconciliationError>;
