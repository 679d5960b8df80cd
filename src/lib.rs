//! # Bank Reconciliation
//!
//! A reconciliation library that matches bank statement transactions against
//! ledger exports, classifies what is left over, and reports whether the two
//! sides balance.
//!
//! ## Features
//!
//! - **Canonical transactions**: every parser produces the same debit/credit shape
//! - **Tolerant matching**: greedy pairing under an amount tolerance and a date window
//! - **Outstanding checks**: ledger checks that have not cleared the bank
//! - **Categorized summaries**: per-side category buckets with counts and sums
//! - **Parser adapters**: Chase, Wells Fargo and header-detected ledger exports
//! - **Diagnostics**: file profiling and column mapping suggestions
//!
//! ## Quick Start
//!
//! ```rust
//! use bank_reconciliation::{patterns, MatchConfig, ReconciliationConfig, ReconciliationEngine};
//! use bigdecimal::BigDecimal;
//! use chrono::NaiveDate;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
//! let bank = vec![patterns::bank_deposit(0, day(1), "Deposit", BigDecimal::from(100)).unwrap()];
//! let ledger = vec![patterns::ledger_deposit(0, day(2), "Invoice 7", BigDecimal::from(100)).unwrap()];
//!
//! let engine = ReconciliationEngine::new(ReconciliationConfig::with_matching(MatchConfig::default()));
//! let summary = engine.reconcile(&bank, &ledger).unwrap();
//! assert!(summary.is_balanced());
//! ```

pub mod export;
pub mod reconciliation;
pub mod statement;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use reconciliation::*;
pub use statement::{BankFormat, ChaseParser, LedgerExportParser, TransactionBuilder, WellsFargoParser};
pub use traits::*;
pub use types::*;

// Re-export transaction patterns for convenience
pub use statement::transaction::patterns;
