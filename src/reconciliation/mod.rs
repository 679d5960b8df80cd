//! Reconciliation of bank statements against ledger exports
//!
//! The [`ReconciliationEngine`] runs the pipeline: the matching engine pairs
//! transactions, the classifier buckets what is left, and the summary packages
//! everything for reporting.

pub mod classifier;
pub mod config;
pub mod matching;
pub mod summary;

pub use classifier::*;
pub use config::*;
pub use matching::*;
pub use summary::*;

use log::{info, warn};

use crate::traits::*;
use crate::types::*;

/// Orchestrates matching, classification and summary assembly
pub struct ReconciliationEngine {
    config: ReconciliationConfig,
    matcher: MatchingEngine,
    classifier: UnmatchedClassifier,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new(ReconciliationConfig::default())
    }
}

impl ReconciliationEngine {
    /// Create an engine from a configuration
    pub fn new(config: ReconciliationConfig) -> Self {
        Self {
            matcher: MatchingEngine::new(config.matching.clone()),
            classifier: UnmatchedClassifier::with_rules(config.category_rules.clone()),
            config,
        }
    }

    /// Create an engine with a custom transaction validator
    pub fn with_validator(
        config: ReconciliationConfig,
        validator: Box<dyn TransactionValidator>,
    ) -> Self {
        Self {
            matcher: MatchingEngine::with_validator(config.matching.clone(), validator),
            classifier: UnmatchedClassifier::with_rules(config.category_rules.clone()),
            config,
        }
    }

    pub fn config(&self) -> &ReconciliationConfig {
        &self.config
    }

    /// Reconcile bank transactions against ledger transactions
    ///
    /// Either the whole run succeeds and yields a summary, or it fails before
    /// producing one.
    pub fn reconcile(
        &self,
        bank: &[Transaction],
        ledger: &[Transaction],
    ) -> ReconResult<ReconciliationSummary> {
        self.config.validate()?;

        let mut outcome = self.matcher.match_transactions(bank, ledger)?;
        let classified = self
            .classifier
            .classify(&mut outcome.unmatched_bank, &mut outcome.unmatched_ledger);
        let summary = ReconciliationSummary::assemble(outcome, classified, &self.config.matching);

        info!(
            "reconciliation {}: {} matched, {} bank-only, {} ledger-only, {} outstanding checks, difference {}",
            summary.verdict,
            summary.matches.len(),
            summary.unmatched_bank.len(),
            summary.unmatched_ledger.len(),
            summary.outstanding_checks.len(),
            summary.totals.difference
        );

        Ok(summary)
    }

    /// Reconcile two parsed statements, logging their parser warnings
    pub fn reconcile_statements(
        &self,
        bank: &ParsedStatement,
        ledger: &ParsedStatement,
    ) -> ReconResult<ReconciliationSummary> {
        for warning in &bank.warnings {
            warn!("bank statement: {}", warning);
        }
        for warning in &ledger.warnings {
            warn!("ledger export: {}", warning);
        }
        self.reconcile(&bank.transactions, &ledger.transactions)
    }

    /// Action items capped at the configured display limit
    pub fn action_items(&self, summary: &ReconciliationSummary) -> ActionItems {
        summary.action_items(self.config.outstanding_display_limit)
    }
}
