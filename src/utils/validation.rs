//! Validation utilities

use bigdecimal::BigDecimal;

use crate::traits::*;
use crate::types::*;

/// Validate that the amount tolerance is not negative
pub fn validate_amount_tolerance(tolerance: &BigDecimal) -> ReconResult<()> {
    if *tolerance < BigDecimal::from(0) {
        Err(ReconciliationError::Parameter(format!(
            "amount tolerance must not be negative, got {}",
            tolerance
        )))
    } else {
        Ok(())
    }
}

/// Validate that the date window is not negative
pub fn validate_date_window(days: i64) -> ReconResult<()> {
    if days < 0 {
        Err(ReconciliationError::Parameter(format!(
            "date window must not be negative, got {} days",
            days
        )))
    } else {
        Ok(())
    }
}

/// Validate every transaction of one side before any matching work starts
///
/// Fails on the first malformed record; a transaction tagged with the other
/// side is rejected as well.
pub fn validate_side(
    side: Source,
    transactions: &[Transaction],
    validator: &dyn TransactionValidator,
) -> ReconResult<()> {
    for (index, transaction) in transactions.iter().enumerate() {
        if transaction.source != side {
            return Err(ReconciliationError::validation(
                side,
                index,
                format!(
                    "transaction tagged as {} was supplied on the {} side",
                    transaction.source, side
                ),
                transaction.raw_values(),
            ));
        }
        validator.validate_transaction(index, transaction)?;
    }
    Ok(())
}

/// Validate that a transaction description is usable for categorization
pub fn validate_transaction_description(
    index: usize,
    transaction: &Transaction,
) -> ReconResult<()> {
    if transaction.description.trim().is_empty() {
        return Err(ReconciliationError::validation(
            transaction.source,
            index,
            "description cannot be empty".to_string(),
            transaction.raw_values(),
        ));
    }

    if transaction.description.len() > 500 {
        return Err(ReconciliationError::validation(
            transaction.source,
            index,
            "description cannot exceed 500 characters".to_string(),
            transaction.raw_values(),
        ));
    }

    Ok(())
}

/// Strict validator that also rejects blank descriptions and zero amounts
pub struct StrictTransactionValidator;

impl TransactionValidator for StrictTransactionValidator {
    fn validate_transaction(&self, index: usize, transaction: &Transaction) -> ReconResult<()> {
        // Canonical shape first
        transaction.validate(index)?;

        validate_transaction_description(index, transaction)?;

        if transaction.amount() == BigDecimal::from(0) {
            return Err(ReconciliationError::validation(
                transaction.source,
                index,
                "transaction has no debit or credit amount".to_string(),
                transaction.raw_values(),
            ));
        }

        Ok(())
    }
}
