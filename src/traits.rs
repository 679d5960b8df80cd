//! Traits for parser adapters and validation extensibility

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::*;

/// Canonical transactions produced by a parser, with the non-fatal issues it found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedStatement {
    /// Parsed transactions in file order
    pub transactions: Vec<Transaction>,
    /// Structural oddities that did not stop parsing
    pub warnings: Vec<String>,
}

/// Parser adapter for a bank- or ledger-specific file layout
///
/// Implementations map their column layout onto the canonical [`Transaction`]
/// shape. Currency symbols, parenthesized negatives and date formats are
/// normalized here, before the matching engine sees the data.
pub trait StatementParser: Send + Sync {
    /// Short name of the format handled by this parser
    fn name(&self) -> &str;

    /// Side of the reconciliation the parsed transactions belong to
    fn source(&self) -> Source;

    /// Parse file contents into canonical transactions
    fn parse(&self, data: &str) -> ReconResult<ParsedStatement>;

    /// Report structural warnings for file contents without keeping the transactions
    fn validate(&self, data: &str) -> ReconResult<Vec<String>> {
        Ok(self.parse(data)?.warnings)
    }

    /// Read and parse a file from disk
    fn parse_path(&self, path: &Path) -> ReconResult<ParsedStatement> {
        let data = std::fs::read_to_string(path)?;
        self.parse(&data)
    }
}

/// Trait for implementing custom transaction validation rules
pub trait TransactionValidator: Send + Sync {
    /// Validate a transaction before it enters the matching engine
    ///
    /// `index` is the position of the transaction in its input sequence.
    fn validate_transaction(&self, index: usize, transaction: &Transaction) -> ReconResult<()>;
}

/// Default transaction validator enforcing the canonical shape
pub struct DefaultTransactionValidator;

impl TransactionValidator for DefaultTransactionValidator {
    fn validate_transaction(&self, index: usize, transaction: &Transaction) -> ReconResult<()> {
        transaction.validate(index)
    }
}
