//! Chase checking account CSV export
//!
//! Layout: `Details,Posting Date,Description,Amount,Type,Balance,Check or Slip #`
//! with a signed amount (negative is money out). Rows usually carry a trailing
//! comma, so records are read flexibly.

use bigdecimal::BigDecimal;
use csv::{ReaderBuilder, Trim};
use log::debug;

use crate::statement::transaction::TransactionBuilder;
use crate::statement::{field, find_column, is_blank, row_error};
use crate::traits::*;
use crate::types::*;
use crate::utils::parsing::{parse_amount, parse_date, FormatTally};

/// Date format of the `Posting Date` column
pub const CHASE_DATE_FORMAT: &str = "%m/%d/%Y";

/// Parser for Chase checking CSV exports
#[derive(Debug, Clone)]
pub struct ChaseParser {
    date_format: String,
}

impl Default for ChaseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ChaseParser {
    pub fn new() -> Self {
        Self {
            date_format: CHASE_DATE_FORMAT.to_string(),
        }
    }

    /// Use a different primary date format
    pub fn with_date_format(date_format: &str) -> Self {
        Self {
            date_format: date_format.to_string(),
        }
    }
}

struct ChaseColumns {
    details: Option<usize>,
    date: usize,
    description: usize,
    amount: usize,
    kind: Option<usize>,
    check_number: Option<usize>,
}

impl ChaseColumns {
    fn detect(headers: &csv::StringRecord) -> ReconResult<Self> {
        let required = |names: &[&str], label: &str| {
            find_column(headers, names)
                .ok_or_else(|| ReconciliationError::MissingColumn(format!("chase: {}", label)))
        };

        Ok(Self {
            details: find_column(headers, &["details"]),
            date: required(&["posting date", "date"], "Posting Date")?,
            description: required(&["description"], "Description")?,
            amount: required(&["amount"], "Amount")?,
            kind: headers.iter().position(|h| h.trim().eq_ignore_ascii_case("type")),
            check_number: find_column(headers, &["check or slip", "check"]),
        })
    }
}

/// Category implied by the bank's own `Type` code, when it is unambiguous
fn type_category(kind: &str) -> Option<&'static str> {
    match kind.to_uppercase().as_str() {
        "FEE_TRANSACTION" => Some("Bank Fees"),
        "ACCT_XFER" => Some("Transfers"),
        "ATM" => Some("ATM Withdrawals"),
        _ => None,
    }
}

/// Whether the `Details` marker disagrees with the amount sign
fn sign_mismatch(details: &str, amount: &BigDecimal) -> bool {
    let zero = BigDecimal::from(0);
    match details.to_uppercase().as_str() {
        "DEBIT" | "CHECK" => *amount > zero,
        "CREDIT" | "DSLIP" => *amount < zero,
        _ => false,
    }
}

impl StatementParser for ChaseParser {
    fn name(&self) -> &str {
        "chase"
    }

    fn source(&self) -> Source {
        Source::Bank
    }

    fn parse(&self, data: &str) -> ReconResult<ParsedStatement> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(data.as_bytes());

        let columns = ChaseColumns::detect(reader.headers()?)?;

        let mut statement = ParsedStatement::default();
        let mut tally = FormatTally::default();
        let mut blank_rows = 0;
        let mut sign_mismatches = 0;

        for (row, result) in reader.records().enumerate() {
            let record = result?;
            if is_blank(&record) {
                blank_rows += 1;
                continue;
            }

            let raw_date = field(&record, columns.date);
            if raw_date.is_empty() {
                return Err(row_error(
                    Source::Bank,
                    row,
                    "missing posting date".to_string(),
                    &record,
                ));
            }
            let (date, used_fallback) = parse_date(raw_date, &self.date_format)
                .map_err(|message| row_error(Source::Bank, row, message, &record))?;
            if used_fallback {
                tally.record_fallback_date(raw_date);
            }

            let amount = parse_amount(field(&record, columns.amount))
                .map_err(|message| row_error(Source::Bank, row, message, &record))?;
            tally.record_amount(&amount);

            if let Some(details) = columns.details {
                if sign_mismatch(field(&record, details), &amount.value) {
                    sign_mismatches += 1;
                }
            }

            let reference = columns
                .check_number
                .map(|index| field(&record, index))
                .unwrap_or("");

            let mut builder = TransactionBuilder::new(
                Source::Bank,
                row,
                date,
                field(&record, columns.description).to_string(),
            )
            .signed_amount(amount.value)
            .reference(reference);
            if let Some(category) = columns
                .kind
                .and_then(|index| type_category(field(&record, index)))
            {
                builder = builder.category(category.to_string());
            }
            let transaction = builder.build()?;

            debug!("chase row {} parsed as {}", row + 1, transaction.id);
            statement.transactions.push(transaction);
        }

        statement.warnings.extend(tally.warnings());
        if sign_mismatches > 0 {
            statement.warnings.push(format!(
                "{} row(s) have a Details marker that disagrees with the amount sign",
                sign_mismatches
            ));
        }
        if blank_rows > 0 {
            statement
                .warnings
                .push(format!("{} blank row(s) skipped", blank_rows));
        }
        if statement.transactions.is_empty() {
            statement.warnings.push("no transactions found".to_string());
        }

        Ok(statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    const SAMPLE: &str = "\
Details,Posting Date,Description,Amount,Type,Balance,Check or Slip #
CREDIT,01/02/2024,REMOTE ONLINE DEPOSIT,\"1,250.00\",DEPOSIT,3250.00,,
CHECK,01/05/2024,CHECK 1001,-50.00,CHECK_PAID,3200.00,1001,
DEBIT,01/31/2024,MONTHLY SERVICE FEE,-12.00,FEE_TRANSACTION,3188.00,,
";

    #[test]
    fn test_parse_chase_export() {
        let statement = ChaseParser::new().parse(SAMPLE).unwrap();
        let txns = &statement.transactions;

        assert_eq!(txns.len(), 3);
        assert_eq!(txns[0].id, "bank-1");
        assert_eq!(txns[0].credit, BigDecimal::from_str("1250.00").unwrap());
        assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(txns[1].debit, BigDecimal::from_str("50.00").unwrap());
        assert_eq!(txns[1].reference(), Some("1001"));
        assert_eq!(txns[2].reference, None);
        assert!(txns.iter().all(|t| t.source == Source::Bank));

        assert_eq!(statement.warnings.len(), 1);
        assert!(statement.warnings[0].contains("thousands separators"));
    }

    #[test]
    fn test_type_code_seeds_category() {
        let data = "\
Details,Posting Date,Description,Amount,Type,Balance,Check or Slip #
DEBIT,01/10/2024,ACME 0042 POS,-3.00,FEE_TRANSACTION,97.00,,
DEBIT,01/11/2024,CARD PURCHASE,-20.00,DEBIT_CARD,77.00,,
";
        let statement = ChaseParser::new().parse(data).unwrap();
        assert_eq!(statement.transactions[0].category.as_deref(), Some("Bank Fees"));
        assert_eq!(statement.transactions[1].category, None);
    }

    #[test]
    fn test_sign_mismatch_warning() {
        let data = "\
Details,Posting Date,Description,Amount,Type,Balance,Check or Slip #
DEBIT,01/05/2024,CARD PURCHASE,25.00,DEBIT_CARD,100.00,,
";
        let warnings = ChaseParser::new().validate(data).unwrap();
        assert!(warnings.iter().any(|w| w.contains("Details marker")));
    }

    #[test]
    fn test_unparseable_amount_is_validation_error() {
        let data = "\
Details,Posting Date,Description,Amount,Type,Balance,Check or Slip #
DEBIT,01/05/2024,CARD PURCHASE,pending,DEBIT_CARD,100.00,,
";
        match ChaseParser::new().parse(data) {
            Err(ReconciliationError::Validation { side, index, raw, .. }) => {
                assert_eq!(side, Source::Bank);
                assert_eq!(index, 0);
                assert!(raw.contains("CARD PURCHASE"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_exponent_amount_is_validation_error() {
        let data = "\
Details,Posting Date,Description,Amount,Type,Balance,Check or Slip #
CREDIT,01/02/2024,REMOTE ONLINE DEPOSIT,100.00,DEPOSIT,1100.00,,
DEBIT,01/05/2024,WIRE OUT,-1e3,WIRE_OUTGOING,100.00,,
";
        match ChaseParser::new().parse(data) {
            Err(ReconciliationError::Validation { side, index, message, .. }) => {
                assert_eq!(side, Source::Bank);
                assert_eq!(index, 1);
                assert!(message.contains("-1e3"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_amount_column() {
        let data = "Details,Posting Date,Description\nDEBIT,01/05/2024,X\n";
        assert!(matches!(
            ChaseParser::new().parse(data),
            Err(ReconciliationError::MissingColumn(_))
        ));
    }
}
