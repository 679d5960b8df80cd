//! Reconciliation summary assembly

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::reconciliation::classifier::{Bucket, CategoryBuckets, ClassifiedBuckets, OutstandingCheck};
use crate::reconciliation::config::MatchConfig;
use crate::reconciliation::matching::MatchOutcome;
use crate::types::*;

/// Whether the unmatched totals net out within tolerance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Balanced,
    Unbalanced,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Balanced => write!(f, "balanced"),
            Verdict::Unbalanced => write!(f, "unbalanced"),
        }
    }
}

/// Overall totals of a reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationTotals {
    /// Sum of the bank-side signed amounts of all matches
    pub matched_amount: BigDecimal,
    /// Sum of signed amounts in the bank but not in the books
    pub unmatched_bank_amount: BigDecimal,
    /// Sum of signed amounts in the books but not in the bank
    pub unmatched_ledger_amount: BigDecimal,
    /// Unmatched bank amount minus unmatched ledger amount
    pub difference: BigDecimal,
}

/// One category line of the bank-not-in-books action items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLine {
    pub category: String,
    pub count: usize,
    pub sum: BigDecimal,
}

/// Outstanding checks capped for display, with the size of the remainder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingPreview {
    pub count: usize,
    pub total: BigDecimal,
    pub shown: Vec<OutstandingCheck>,
    pub remaining: usize,
}

/// Data behind the action-item section of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItems {
    /// Number of transactions in the bank but not in the books
    pub bank_not_ledger_count: usize,
    /// Per-category breakdown of those transactions
    pub bank_not_ledger: Vec<CategoryLine>,
    /// Number of transactions in the books but not in the bank
    pub ledger_not_bank_count: usize,
    pub outstanding_checks: OutstandingPreview,
}

/// Complete, immutable result of a reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    /// Tolerances the run used
    pub config: MatchConfig,
    pub matches: Vec<Match>,
    pub unmatched_bank: Vec<Transaction>,
    pub unmatched_ledger: Vec<Transaction>,
    /// Side to category to bucket
    pub buckets: BTreeMap<Source, CategoryBuckets>,
    /// Ledger checks not yet cleared, sorted by date
    pub outstanding_checks: Vec<OutstandingCheck>,
    pub totals: ReconciliationTotals,
    pub verdict: Verdict,
}

impl ReconciliationSummary {
    /// Combine a matching outcome and its classification into a summary
    pub fn assemble(
        outcome: MatchOutcome,
        classified: ClassifiedBuckets,
        config: &MatchConfig,
    ) -> Self {
        let matched_amount: BigDecimal = outcome.matches.iter().map(|m| m.bank.amount()).sum();
        let unmatched_bank_amount: BigDecimal =
            outcome.unmatched_bank.iter().map(|t| t.amount()).sum();
        let unmatched_ledger_amount: BigDecimal =
            outcome.unmatched_ledger.iter().map(|t| t.amount()).sum();
        let difference = &unmatched_bank_amount - &unmatched_ledger_amount;

        let verdict = if difference.abs() <= config.amount_tolerance {
            Verdict::Balanced
        } else {
            Verdict::Unbalanced
        };

        Self {
            config: config.clone(),
            matches: outcome.matches,
            unmatched_bank: outcome.unmatched_bank,
            unmatched_ledger: outcome.unmatched_ledger,
            buckets: classified.buckets,
            outstanding_checks: classified.outstanding_checks,
            totals: ReconciliationTotals {
                matched_amount,
                unmatched_bank_amount,
                unmatched_ledger_amount,
                difference,
            },
            verdict,
        }
    }

    pub fn is_balanced(&self) -> bool {
        self.verdict == Verdict::Balanced
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    /// Category buckets for one side
    pub fn side_buckets(&self, side: Source) -> Option<&CategoryBuckets> {
        self.buckets.get(&side)
    }

    /// A single bucket by side and category name
    pub fn bucket(&self, side: Source, category: &str) -> Option<&Bucket> {
        self.buckets.get(&side).and_then(|b| b.get(category))
    }

    /// Total debit amount of all outstanding checks
    pub fn outstanding_total(&self) -> BigDecimal {
        self.outstanding_checks.iter().map(|c| &c.amount).sum()
    }

    /// First `limit` outstanding checks plus the count of the rest
    pub fn outstanding_preview(&self, limit: usize) -> OutstandingPreview {
        let shown: Vec<OutstandingCheck> =
            self.outstanding_checks.iter().take(limit).cloned().collect();
        OutstandingPreview {
            count: self.outstanding_checks.len(),
            total: self.outstanding_total(),
            remaining: self.outstanding_checks.len() - shown.len(),
            shown,
        }
    }

    /// Action-item data; outstanding checks are capped at `limit` entries
    pub fn action_items(&self, limit: usize) -> ActionItems {
        let bank_not_ledger = self
            .side_buckets(Source::Bank)
            .map(|buckets| {
                buckets
                    .iter()
                    .map(|(category, bucket)| CategoryLine {
                        category: category.clone(),
                        count: bucket.count,
                        sum: bucket.sum.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        ActionItems {
            bank_not_ledger_count: self.unmatched_bank.len(),
            bank_not_ledger,
            ledger_not_bank_count: self.unmatched_ledger.len(),
            outstanding_checks: self.outstanding_preview(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconciliation::classifier::UnmatchedClassifier;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn check(day: u32, reference: &str, debit: &str) -> Transaction {
        let mut t = Transaction::new(
            format!("ledger-{reference}"),
            Source::Ledger,
            NaiveDate::from_ymd_opt(2024, 2, day).unwrap(),
            format!("Check {reference}"),
        );
        t.debit = BigDecimal::from_str(debit).unwrap();
        t.reference = Some(reference.to_string());
        t
    }

    fn summary_for(mut outcome: MatchOutcome, tolerance: &str) -> ReconciliationSummary {
        let classified = UnmatchedClassifier::new()
            .classify(&mut outcome.unmatched_bank, &mut outcome.unmatched_ledger);
        let config = MatchConfig::new(BigDecimal::from_str(tolerance).unwrap(), 3);
        ReconciliationSummary::assemble(outcome, classified, &config)
    }

    #[test]
    fn test_empty_run_is_balanced() {
        let summary = summary_for(MatchOutcome::default(), "0");
        assert!(summary.is_balanced());
        assert_eq!(summary.totals.difference, BigDecimal::from(0));
        assert!(summary.buckets.is_empty());
    }

    #[test]
    fn test_unbalanced_beyond_tolerance() {
        let outcome = MatchOutcome {
            unmatched_ledger: vec![check(1, "1001", "0.02")],
            ..MatchOutcome::default()
        };
        assert_eq!(summary_for(outcome.clone(), "0.01").verdict, Verdict::Unbalanced);
        assert_eq!(summary_for(outcome, "0.02").verdict, Verdict::Balanced);
    }

    #[test]
    fn test_outstanding_preview_caps_display() {
        let checks: Vec<Transaction> = (1..=7)
            .map(|day| check(day, &format!("{}", 1000 + day), "10.00"))
            .collect();
        let outcome = MatchOutcome {
            unmatched_ledger: checks,
            ..MatchOutcome::default()
        };
        let summary = summary_for(outcome, "0.01");

        let preview = summary.outstanding_preview(5);
        assert_eq!(preview.count, 7);
        assert_eq!(preview.shown.len(), 5);
        assert_eq!(preview.remaining, 2);
        assert_eq!(preview.total, BigDecimal::from(70));
        assert_eq!(preview.shown[0].reference, "1001");

        let items = summary.action_items(10);
        assert_eq!(items.ledger_not_bank_count, 7);
        assert_eq!(items.outstanding_checks.remaining, 0);
        assert!(items.bank_not_ledger.is_empty());
    }
}
