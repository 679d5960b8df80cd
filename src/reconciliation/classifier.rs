//! Classification of unmatched transactions into category buckets

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::*;

/// Fallback category when no rule applies
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Category of ledger checks that have not cleared the bank
pub const OUTSTANDING_CHECKS: &str = "Outstanding Checks";

/// Category of ledger deposits not yet seen on the bank statement
pub const DEPOSITS_IN_TRANSIT: &str = "Deposits in Transit";

/// Keyword rule mapping description text to a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Category assigned when a keyword matches
    pub category: String,
    /// Case-insensitive substrings looked for in the description
    pub keywords: Vec<String>,
}

impl CategoryRule {
    /// Create a new rule
    pub fn new(category: &str, keywords: &[&str]) -> Self {
        Self {
            category: category.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Whether the rule applies to a description
    pub fn matches(&self, description: &str) -> bool {
        let description = description.to_lowercase();
        self.keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .any(|k| !k.is_empty() && description.contains(&k))
    }
}

/// Built-in keyword rules, evaluated in order
pub fn default_category_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "Bank Fees",
            &["fee", "service charge", "overdraft", "nsf"],
        ),
        CategoryRule::new("Interest", &["interest"]),
        CategoryRule::new("Transfers", &["transfer", "xfer"]),
        CategoryRule::new("Payroll", &["payroll", "salary"]),
        CategoryRule::new("ATM Withdrawals", &["atm"]),
        CategoryRule::new("Checks", &["check", "chk"]),
        CategoryRule::new("Deposits", &["deposit"]),
    ]
}

/// Transactions sharing a category, with their aggregates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    pub transactions: Vec<Transaction>,
    pub count: usize,
    /// Sum of signed amounts (credit minus debit)
    pub sum: BigDecimal,
}

impl Bucket {
    fn push(&mut self, transaction: Transaction) {
        self.sum += transaction.amount();
        self.count += 1;
        self.transactions.push(transaction);
    }
}

/// Category name to bucket, ordered by name
pub type CategoryBuckets = BTreeMap<String, Bucket>;

/// A check recorded in the ledger that has not cleared the bank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutstandingCheck {
    /// Check number
    pub reference: String,
    /// Debit amount of the check
    pub amount: BigDecimal,
    pub date: NaiveDate,
    pub description: String,
}

/// Output of the classifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedBuckets {
    /// Side to category to bucket
    pub buckets: BTreeMap<Source, CategoryBuckets>,
    /// Outstanding checks sorted by date ascending
    pub outstanding_checks: Vec<OutstandingCheck>,
}

impl ClassifiedBuckets {
    /// Buckets for one side; empty when that side had no unmatched transactions
    pub fn side(&self, side: Source) -> Option<&CategoryBuckets> {
        self.buckets.get(&side)
    }
}

/// Assigns categories to unmatched transactions and groups them
#[derive(Debug, Clone)]
pub struct UnmatchedClassifier {
    rules: Vec<CategoryRule>,
}

impl Default for UnmatchedClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl UnmatchedClassifier {
    /// Create a classifier with the built-in rules
    pub fn new() -> Self {
        Self::with_rules(default_category_rules())
    }

    /// Create a classifier with custom rules
    pub fn with_rules(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Whether an unmatched ledger transaction is an outstanding check
    ///
    /// Keys strictly on the debit side: a credit carrying a check number is not
    /// an outstanding check.
    pub fn is_outstanding_check(transaction: &Transaction) -> bool {
        transaction.source == Source::Ledger
            && transaction.reference().is_some()
            && transaction.is_debit()
    }

    /// Category for a transaction from the keyword rules, falling back to
    /// [`UNCATEGORIZED`]
    pub fn categorize(&self, transaction: &Transaction) -> String {
        self.rules
            .iter()
            .find(|rule| rule.matches(&transaction.description))
            .map(|rule| rule.category.clone())
            .unwrap_or_else(|| UNCATEGORIZED.to_string())
    }

    fn ledger_category(&self, transaction: &Transaction) -> String {
        if Self::is_outstanding_check(transaction) {
            return OUTSTANDING_CHECKS.to_string();
        }
        if let Some(category) = &transaction.category {
            return category.clone();
        }
        if transaction.is_credit() {
            return DEPOSITS_IN_TRANSIT.to_string();
        }
        self.categorize(transaction)
    }

    fn bank_category(&self, transaction: &Transaction) -> String {
        match &transaction.category {
            Some(category) => category.clone(),
            None => self.categorize(transaction),
        }
    }

    /// Assign a category to every unmatched transaction and group them per side
    ///
    /// Categories are written back onto the transactions. Outstanding checks are
    /// drawn from the ledger side only.
    pub fn classify(
        &self,
        unmatched_bank: &mut [Transaction],
        unmatched_ledger: &mut [Transaction],
    ) -> ClassifiedBuckets {
        let mut classified = ClassifiedBuckets::default();

        if !unmatched_bank.is_empty() {
            let buckets = classified.buckets.entry(Source::Bank).or_default();
            for transaction in unmatched_bank.iter_mut() {
                let category = self.bank_category(transaction);
                debug!("bank {} categorized as {}", transaction.id, category);
                transaction.category = Some(category.clone());
                buckets
                    .entry(category)
                    .or_default()
                    .push(transaction.clone());
            }
        }

        if !unmatched_ledger.is_empty() {
            let buckets = classified.buckets.entry(Source::Ledger).or_default();
            for transaction in unmatched_ledger.iter_mut() {
                let category = self.ledger_category(transaction);
                debug!("ledger {} categorized as {}", transaction.id, category);

                if category == OUTSTANDING_CHECKS {
                    if let Some(reference) = transaction.reference() {
                        classified.outstanding_checks.push(OutstandingCheck {
                            reference: reference.to_string(),
                            amount: transaction.debit.clone(),
                            date: transaction.date,
                            description: transaction.description.clone(),
                        });
                    }
                }

                transaction.category = Some(category.clone());
                buckets
                    .entry(category)
                    .or_default()
                    .push(transaction.clone());
            }
        }

        // Stable sort keeps input order among checks written on the same day
        classified.outstanding_checks.sort_by_key(|check| check.date);

        classified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn ledger(day: u32, description: &str, debit: &str, credit: &str, reference: Option<&str>) -> Transaction {
        let mut t = Transaction::new(
            format!("ledger-{day}"),
            Source::Ledger,
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            description.to_string(),
        );
        t.debit = BigDecimal::from_str(debit).unwrap();
        t.credit = BigDecimal::from_str(credit).unwrap();
        t.reference = reference.map(str::to_string);
        t
    }

    fn bank(day: u32, description: &str, debit: &str, credit: &str) -> Transaction {
        let mut t = ledger(day, description, debit, credit, None);
        t.id = format!("bank-{day}");
        t.source = Source::Bank;
        t
    }

    #[test]
    fn test_outstanding_check_requires_debit() {
        let classifier = UnmatchedClassifier::new();
        let mut bank_side = Vec::new();
        let mut ledger_side = vec![
            ledger(3, "Check to vendor", "250.00", "0", Some("1042")),
            ledger(4, "Refund check", "0", "250.00", Some("1043")),
        ];

        let classified = classifier.classify(&mut bank_side, &mut ledger_side);

        assert_eq!(classified.outstanding_checks.len(), 1);
        assert_eq!(classified.outstanding_checks[0].reference, "1042");
        assert_eq!(
            classified.outstanding_checks[0].amount,
            BigDecimal::from_str("250.00").unwrap()
        );
        assert_eq!(ledger_side[1].category.as_deref(), Some(DEPOSITS_IN_TRANSIT));
    }

    #[test]
    fn test_outstanding_checks_sorted_by_date() {
        let classifier = UnmatchedClassifier::new();
        let mut ledger_side = vec![
            ledger(20, "Check", "10", "0", Some("3")),
            ledger(5, "Check", "20", "0", Some("1")),
            ledger(20, "Check", "30", "0", Some("4")),
            ledger(9, "Check", "40", "0", Some("2")),
        ];

        let classified = classifier.classify(&mut [], &mut ledger_side);
        let references: Vec<&str> = classified
            .outstanding_checks
            .iter()
            .map(|c| c.reference.as_str())
            .collect();
        assert_eq!(references, vec!["1", "2", "3", "4"]);

        let bucket = &classified.side(Source::Ledger).unwrap()[OUTSTANDING_CHECKS];
        assert_eq!(bucket.count, 4);
        assert_eq!(bucket.sum, BigDecimal::from(-100));
    }

    #[test]
    fn test_bank_keywords_and_fallback() {
        let classifier = UnmatchedClassifier::new();
        let mut bank_side = vec![
            bank(1, "MONTHLY SERVICE FEE", "12.00", "0"),
            bank(2, "Interest Payment", "0", "0.42"),
            bank(3, "Online Transfer to SAV", "100.00", "0"),
            bank(4, "AMAZON MKTPLACE", "35.10", "0"),
            bank(5, "Wire fee", "15.00", "0"),
        ];

        let classified = classifier.classify(&mut bank_side, &mut []);
        let buckets = classified.side(Source::Bank).unwrap();

        assert_eq!(buckets["Bank Fees"].count, 2);
        assert_eq!(buckets["Bank Fees"].sum, BigDecimal::from(-27));
        assert_eq!(buckets["Interest"].count, 1);
        assert_eq!(buckets["Transfers"].count, 1);
        assert_eq!(buckets[UNCATEGORIZED].count, 1);
        assert_eq!(bank_side[3].category.as_deref(), Some(UNCATEGORIZED));
        assert!(classified.side(Source::Ledger).is_none());
        assert!(classified.outstanding_checks.is_empty());
    }

    #[test]
    fn test_bank_check_is_never_outstanding() {
        let classifier = UnmatchedClassifier::new();
        let mut t = bank(5, "CHECK 1001", "50.00", "0");
        t.reference = Some("1001".to_string());
        let mut bank_side = vec![t];

        let classified = classifier.classify(&mut bank_side, &mut []);

        assert!(classified.outstanding_checks.is_empty());
        assert_eq!(bank_side[0].category.as_deref(), Some("Checks"));
    }

    #[test]
    fn test_preset_category_kept() {
        let classifier = UnmatchedClassifier::new();
        let mut t = bank(1, "Service fee", "5", "0");
        t.category = Some("Merchant Fees".to_string());
        let mut bank_side = vec![t];

        let classified = classifier.classify(&mut bank_side, &mut []);
        assert!(classified.side(Source::Bank).unwrap().contains_key("Merchant Fees"));
    }
}
