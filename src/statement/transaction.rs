//! Canonical transaction construction

use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::types::*;
use crate::utils::parsing::split_signed;

/// Transaction builder used by the parsers and by callers assembling
/// transactions by hand
#[derive(Debug)]
pub struct TransactionBuilder {
    transaction: Transaction,
    row: usize,
}

impl TransactionBuilder {
    /// Create a new builder for the record at `row` (0-based) of a source file
    ///
    /// The id defaults to `<source>-<row + 1>`.
    pub fn new(source: Source, row: usize, date: NaiveDate, description: String) -> Self {
        Self {
            transaction: Transaction::new(format!("{}-{}", source, row + 1), source, date, description),
            row,
        }
    }

    /// Set the debit amount
    pub fn debit(mut self, amount: BigDecimal) -> Self {
        self.transaction.debit = amount;
        self
    }

    /// Set the credit amount
    pub fn credit(mut self, amount: BigDecimal) -> Self {
        self.transaction.credit = amount;
        self
    }

    /// Set debit or credit from a signed amount (negative is a debit)
    pub fn signed_amount(mut self, amount: BigDecimal) -> Self {
        let (debit, credit) = split_signed(amount);
        self.transaction.debit = debit;
        self.transaction.credit = credit;
        self
    }

    /// Set the reference; blank references are dropped
    pub fn reference(mut self, reference: &str) -> Self {
        let reference = reference.trim();
        self.transaction.reference = if reference.is_empty() {
            None
        } else {
            Some(reference.to_string())
        };
        self
    }

    /// Pre-seed the category; the classifier keeps it for unmatched transactions
    pub fn category(mut self, category: String) -> Self {
        self.transaction.category = Some(category);
        self
    }

    /// Build the transaction
    pub fn build(self) -> ReconResult<Transaction> {
        self.transaction.validate(self.row)?;
        Ok(self.transaction)
    }
}

/// Common transaction shapes
pub mod patterns {
    use super::*;

    /// Money received on the bank statement
    pub fn bank_deposit(
        row: usize,
        date: NaiveDate,
        description: &str,
        amount: BigDecimal,
    ) -> ReconResult<Transaction> {
        TransactionBuilder::new(Source::Bank, row, date, description.to_string())
            .credit(amount)
            .build()
    }

    /// Money paid out on the bank statement
    pub fn bank_withdrawal(
        row: usize,
        date: NaiveDate,
        description: &str,
        amount: BigDecimal,
    ) -> ReconResult<Transaction> {
        TransactionBuilder::new(Source::Bank, row, date, description.to_string())
            .debit(amount)
            .build()
    }

    /// A cleared check on the bank statement
    pub fn bank_check(
        row: usize,
        date: NaiveDate,
        description: &str,
        check_number: &str,
        amount: BigDecimal,
    ) -> ReconResult<Transaction> {
        TransactionBuilder::new(Source::Bank, row, date, description.to_string())
            .debit(amount)
            .reference(check_number)
            .build()
    }

    /// A deposit recorded in the books
    pub fn ledger_deposit(
        row: usize,
        date: NaiveDate,
        description: &str,
        amount: BigDecimal,
    ) -> ReconResult<Transaction> {
        TransactionBuilder::new(Source::Ledger, row, date, description.to_string())
            .credit(amount)
            .build()
    }

    /// A payment recorded in the books without a check number
    pub fn ledger_payment(
        row: usize,
        date: NaiveDate,
        description: &str,
        amount: BigDecimal,
    ) -> ReconResult<Transaction> {
        TransactionBuilder::new(Source::Ledger, row, date, description.to_string())
            .debit(amount)
            .build()
    }

    /// A check written in the books
    pub fn ledger_check(
        row: usize,
        date: NaiveDate,
        description: &str,
        check_number: &str,
        amount: BigDecimal,
    ) -> ReconResult<Transaction> {
        TransactionBuilder::new(Source::Ledger, row, date, description.to_string())
            .debit(amount)
            .reference(check_number)
            .build()
    }
}
