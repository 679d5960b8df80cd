//! Matching engine pairing bank transactions with ledger transactions
//!
//! Matching is greedy: bank transactions are visited in date order (ties in
//! input order) and each takes the best still-available ledger transaction.
//! The result is deterministic but not a globally optimal assignment; bucket
//! totals downstream depend on exactly this behavior.

use bigdecimal::BigDecimal;
use chrono::Datelike;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::reconciliation::config::MatchConfig;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::validate_side;

/// Matches and leftovers of one matching run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Matches in the order they were made
    pub matches: Vec<Match>,
    /// Bank transactions without a counterpart, in input order
    pub unmatched_bank: Vec<Transaction>,
    /// Ledger transactions without a counterpart, in input order
    pub unmatched_ledger: Vec<Transaction>,
}

impl MatchOutcome {
    /// Number of matched pairs
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Total number of transactions accounted for across matches and leftovers
    pub fn transaction_count(&self) -> usize {
        self.matches.len() * 2 + self.unmatched_bank.len() + self.unmatched_ledger.len()
    }
}

/// Best ledger candidate found for one bank transaction
struct Candidate {
    ledger_index: usize,
    amount_delta: BigDecimal,
    date_delta_days: i64,
}

/// Ledger transactions still available for matching, indexed by day number
struct LedgerPool<'a> {
    ledger: &'a [Transaction],
    by_day: BTreeMap<i64, Vec<usize>>,
}

impl<'a> LedgerPool<'a> {
    fn new(ledger: &'a [Transaction]) -> Self {
        let mut by_day: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (index, transaction) in ledger.iter().enumerate() {
            by_day
                .entry(day_number(transaction))
                .or_default()
                .push(index);
        }
        Self { ledger, by_day }
    }

    /// Find the best available candidate for a bank transaction
    ///
    /// Only days inside the date window are inspected. Candidates are visited in
    /// (date, input order), so a strictly-better comparison keeps the earliest
    /// candidate on a full tie.
    fn best_candidate(&self, bank: &Transaction, config: &MatchConfig) -> Option<Candidate> {
        let day = day_number(bank);
        let low = day.saturating_sub(config.date_window_days);
        let high = day.saturating_add(config.date_window_days);
        let bank_amount = bank.amount();

        let mut best: Option<Candidate> = None;

        for (&ledger_day, indices) in self.by_day.range(low..=high) {
            let date_delta_days = (ledger_day - day).abs();

            for &ledger_index in indices {
                let amount_delta = (&bank_amount - self.ledger[ledger_index].amount()).abs();
                if amount_delta > config.amount_tolerance {
                    continue;
                }

                let better = match &best {
                    None => true,
                    Some(current) => {
                        (&amount_delta, date_delta_days)
                            < (&current.amount_delta, current.date_delta_days)
                    }
                };

                if better {
                    best = Some(Candidate {
                        ledger_index,
                        amount_delta,
                        date_delta_days,
                    });
                }
            }
        }

        best
    }

    /// Remove a ledger transaction so it cannot be matched again
    fn take(&mut self, ledger_index: usize) {
        let day = day_number(&self.ledger[ledger_index]);
        if let Some(indices) = self.by_day.get_mut(&day) {
            indices.retain(|&i| i != ledger_index);
            if indices.is_empty() {
                self.by_day.remove(&day);
            }
        }
    }
}

fn day_number(transaction: &Transaction) -> i64 {
    i64::from(transaction.date.num_days_from_ce())
}

/// Greedy nearest-match engine
pub struct MatchingEngine {
    config: MatchConfig,
    validator: Box<dyn TransactionValidator>,
}

impl MatchingEngine {
    /// Create a matching engine with the default validator
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            validator: Box::new(DefaultTransactionValidator),
        }
    }

    /// Create a matching engine with a custom validator
    pub fn with_validator(config: MatchConfig, validator: Box<dyn TransactionValidator>) -> Self {
        Self { config, validator }
    }

    /// Tolerances in use
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Pair bank transactions with ledger transactions
    ///
    /// Parameters and every input record are validated before any matching
    /// work; a single malformed record fails the whole run.
    pub fn match_transactions(
        &self,
        bank: &[Transaction],
        ledger: &[Transaction],
    ) -> ReconResult<MatchOutcome> {
        self.config.validate()?;
        validate_side(Source::Bank, bank, self.validator.as_ref())?;
        validate_side(Source::Ledger, ledger, self.validator.as_ref())?;

        info!(
            "matching {} bank against {} ledger transactions (tolerance {}, window {} days)",
            bank.len(),
            ledger.len(),
            self.config.amount_tolerance,
            self.config.date_window_days
        );

        let mut order: Vec<usize> = (0..bank.len()).collect();
        order.sort_by_key(|&i| (bank[i].date, i));

        let mut pool = LedgerPool::new(ledger);
        let mut bank_matched = vec![false; bank.len()];
        let mut ledger_matched = vec![false; ledger.len()];
        let mut matches = Vec::new();

        for bank_index in order {
            let bank_txn = &bank[bank_index];
            let Some(candidate) = pool.best_candidate(bank_txn, &self.config) else {
                debug!("bank {} has no eligible ledger candidate", bank_txn.id);
                continue;
            };

            pool.take(candidate.ledger_index);
            bank_matched[bank_index] = true;
            ledger_matched[candidate.ledger_index] = true;

            let ledger_txn = &ledger[candidate.ledger_index];
            debug!(
                "matched bank {} with ledger {} (amount delta {}, date delta {} days)",
                bank_txn.id, ledger_txn.id, candidate.amount_delta, candidate.date_delta_days
            );

            matches.push(Match {
                bank_index,
                ledger_index: candidate.ledger_index,
                bank: bank_txn.clone(),
                ledger: ledger_txn.clone(),
                amount_delta: candidate.amount_delta,
                date_delta_days: candidate.date_delta_days,
            });
        }

        let unmatched_bank: Vec<Transaction> = bank
            .iter()
            .zip(&bank_matched)
            .filter(|(_, matched)| !**matched)
            .map(|(t, _)| t.clone())
            .collect();

        let unmatched_ledger: Vec<Transaction> = ledger
            .iter()
            .zip(&ledger_matched)
            .filter(|(_, matched)| !**matched)
            .map(|(t, _)| t.clone())
            .collect();

        info!(
            "matched {} pairs, {} bank and {} ledger transactions left unmatched",
            matches.len(),
            unmatched_bank.len(),
            unmatched_ledger.len()
        );

        Ok(MatchOutcome {
            matches,
            unmatched_bank,
            unmatched_ledger,
        })
    }
}
