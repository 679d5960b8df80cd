//! Configuration for matching and reconciliation runs

use bigdecimal::BigDecimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::reconciliation::classifier::{default_category_rules, CategoryRule};
use crate::types::*;
use crate::utils::validation::{validate_amount_tolerance, validate_date_window};

/// Default amount tolerance: one cent
pub const DEFAULT_AMOUNT_TOLERANCE_CENTS: i64 = 1;

/// Default date window in days
pub const DEFAULT_DATE_WINDOW_DAYS: i64 = 3;

/// Default number of outstanding checks listed in the action-item digest
pub const DEFAULT_OUTSTANDING_DISPLAY_LIMIT: usize = 5;

/// Tolerances used by the matching engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Maximum absolute difference between two signed amounts
    #[serde(
        default = "default_amount_tolerance",
        deserialize_with = "deserialize_decimal"
    )]
    pub amount_tolerance: BigDecimal,
    /// Maximum difference between two dates, in days
    #[serde(default = "default_date_window_days")]
    pub date_window_days: i64,
}

fn default_amount_tolerance() -> BigDecimal {
    BigDecimal::new(DEFAULT_AMOUNT_TOLERANCE_CENTS.into(), 2)
}

fn default_date_window_days() -> i64 {
    DEFAULT_DATE_WINDOW_DAYS
}

/// Accepts `"0.01"` or `0.01`; numbers are read from their shortest decimal text
fn deserialize_decimal<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    struct DecimalVisitor;

    impl<'de> Visitor<'de> for DecimalVisitor {
        type Value = BigDecimal;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a decimal number or numeric string")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<BigDecimal, E> {
            BigDecimal::from_str(value.trim()).map_err(E::custom)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<BigDecimal, E> {
            Ok(BigDecimal::from(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<BigDecimal, E> {
            Ok(BigDecimal::from(value))
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<BigDecimal, E> {
            BigDecimal::from_str(&value.to_string()).map_err(E::custom)
        }
    }

    deserializer.deserialize_any(DecimalVisitor)
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            amount_tolerance: default_amount_tolerance(),
            date_window_days: default_date_window_days(),
        }
    }
}

impl MatchConfig {
    /// Create a match configuration
    pub fn new(amount_tolerance: BigDecimal, date_window_days: i64) -> Self {
        Self {
            amount_tolerance,
            date_window_days,
        }
    }

    /// Reject negative tolerance or window
    pub fn validate(&self) -> ReconResult<()> {
        validate_amount_tolerance(&self.amount_tolerance)?;
        validate_date_window(self.date_window_days)
    }
}

/// Full configuration for a reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// Matching tolerances
    #[serde(default)]
    pub matching: MatchConfig,
    /// How many outstanding checks the action-item digest lists individually
    #[serde(default = "default_outstanding_display_limit")]
    pub outstanding_display_limit: usize,
    /// Keyword rules for categorizing unmatched transactions, first match wins
    #[serde(default = "default_category_rules")]
    pub category_rules: Vec<CategoryRule>,
}

fn default_outstanding_display_limit() -> usize {
    DEFAULT_OUTSTANDING_DISPLAY_LIMIT
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            matching: MatchConfig::default(),
            outstanding_display_limit: default_outstanding_display_limit(),
            category_rules: default_category_rules(),
        }
    }
}

impl ReconciliationConfig {
    /// Create a configuration with the given matching tolerances and default rules
    pub fn with_matching(matching: MatchConfig) -> Self {
        Self {
            matching,
            ..Self::default()
        }
    }

    /// Load a configuration from JSON; missing fields take their defaults
    pub fn from_json_str(json: &str) -> ReconResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_path(path: &Path) -> ReconResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ReconResult<()> {
        self.matching.validate()?;

        for rule in &self.category_rules {
            if rule.category.trim().is_empty() {
                return Err(ReconciliationError::Parameter(
                    "category rule name cannot be empty".to_string(),
                ));
            }
            if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(ReconciliationError::Parameter(format!(
                    "category rule '{}' has no keywords",
                    rule.category
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatchConfig::default();
        assert_eq!(config.amount_tolerance, BigDecimal::from_str("0.01").unwrap());
        assert_eq!(config.date_window_days, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config =
            ReconciliationConfig::from_json_str(r#"{"matching": {"date_window_days": 5}}"#)
                .unwrap();
        assert_eq!(config.matching.date_window_days, 5);
        assert_eq!(
            config.matching.amount_tolerance,
            BigDecimal::from_str("0.01").unwrap()
        );
        assert_eq!(config.outstanding_display_limit, 5);
        assert_eq!(config.category_rules, default_category_rules());
    }

    #[test]
    fn test_tolerance_keeps_decimal_text() {
        let config =
            ReconciliationConfig::from_json_str(r#"{"matching": {"amount_tolerance": 0.01}}"#)
                .unwrap();
        assert_eq!(config.matching.amount_tolerance.to_string(), "0.01");

        let config =
            ReconciliationConfig::from_json_str(r#"{"matching": {"amount_tolerance": "0.5"}}"#)
                .unwrap();
        assert_eq!(config.matching.amount_tolerance, BigDecimal::from_str("0.5").unwrap());

        let config =
            ReconciliationConfig::from_json_str(r#"{"matching": {"amount_tolerance": 2}}"#)
                .unwrap();
        assert_eq!(config.matching.amount_tolerance, BigDecimal::from(2));

        let err = ReconciliationConfig::from_json_str(
            r#"{"matching": {"amount_tolerance": "one cent"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ReconciliationError::Config(_)));
    }

    #[test]
    fn test_from_json_rejects_negative_window() {
        let err =
            ReconciliationConfig::from_json_str(r#"{"matching": {"date_window_days": -1}}"#)
                .unwrap_err();
        assert!(matches!(err, ReconciliationError::Parameter(_)));
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = ReconciliationConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ReconciliationError::Config(_)));
    }

    #[test]
    fn test_rule_without_keywords_rejected() {
        let mut config = ReconciliationConfig::default();
        config.category_rules.push(CategoryRule::new("Empty", &[]));
        assert!(config.validate().is_err());
    }
}
