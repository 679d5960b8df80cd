//! Wells Fargo checking account CSV export
//!
//! Headerless layout: `date,amount,*,check number,description`.

use csv::{ReaderBuilder, Trim};
use log::debug;

use crate::statement::transaction::TransactionBuilder;
use crate::statement::{field, is_blank, row_error};
use crate::traits::*;
use crate::types::*;
use crate::utils::parsing::{parse_amount, parse_date, FormatTally};

/// Date format of the first column
pub const WELLS_FARGO_DATE_FORMAT: &str = "%m/%d/%Y";

const DATE: usize = 0;
const AMOUNT: usize = 1;
const MARKER: usize = 2;
const CHECK_NUMBER: usize = 3;
const DESCRIPTION: usize = 4;
const COLUMN_COUNT: usize = 5;

/// Parser for Wells Fargo checking CSV exports
#[derive(Debug, Clone)]
pub struct WellsFargoParser {
    date_format: String,
}

impl Default for WellsFargoParser {
    fn default() -> Self {
        Self::new()
    }
}

impl WellsFargoParser {
    pub fn new() -> Self {
        Self {
            date_format: WELLS_FARGO_DATE_FORMAT.to_string(),
        }
    }
}

impl StatementParser for WellsFargoParser {
    fn name(&self) -> &str {
        "wells_fargo"
    }

    fn source(&self) -> Source {
        Source::Bank
    }

    fn parse(&self, data: &str) -> ReconResult<ParsedStatement> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(data.as_bytes());

        let mut statement = ParsedStatement::default();
        let mut tally = FormatTally::default();
        let mut unexpected_markers = 0;
        let mut blank_rows = 0;

        for (row, result) in reader.records().enumerate() {
            let record = result?;
            if is_blank(&record) {
                blank_rows += 1;
                continue;
            }
            if record.len() < COLUMN_COUNT {
                return Err(row_error(
                    Source::Bank,
                    row,
                    format!("expected {} columns, found {}", COLUMN_COUNT, record.len()),
                    &record,
                ));
            }

            let raw_date = field(&record, DATE);
            let (date, used_fallback) = parse_date(raw_date, &self.date_format)
                .map_err(|message| row_error(Source::Bank, row, message, &record))?;
            if used_fallback {
                tally.record_fallback_date(raw_date);
            }

            let amount = parse_amount(field(&record, AMOUNT))
                .map_err(|message| row_error(Source::Bank, row, message, &record))?;
            tally.record_amount(&amount);

            if field(&record, MARKER) != "*" {
                unexpected_markers += 1;
            }

            let transaction = TransactionBuilder::new(
                Source::Bank,
                row,
                date,
                field(&record, DESCRIPTION).to_string(),
            )
            .signed_amount(amount.value)
            .reference(field(&record, CHECK_NUMBER))
            .build()?;

            debug!("wells fargo row {} parsed as {}", row + 1, transaction.id);
            statement.transactions.push(transaction);
        }

        statement.warnings.extend(tally.warnings());
        if unexpected_markers > 0 {
            statement.warnings.push(format!(
                "{} row(s) lack the '*' marker in column 3; the file may not be a Wells Fargo export",
                unexpected_markers
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
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    #[test]
    fn test_parse_wells_fargo_export() {
        let data = "\
\"01/02/2024\",\"100.00\",\"*\",\"\",\"DEPOSIT\"
\"01/05/2024\",\"-50.00\",\"*\",\"1001\",\"CHECK # 1001\"
";
        let statement = WellsFargoParser::new().parse(data).unwrap();
        let txns = &statement.transactions;

        assert_eq!(txns.len(), 2);
        assert_eq!(txns[0].credit, BigDecimal::from(100));
        assert_eq!(txns[0].reference, None);
        assert_eq!(txns[1].id, "bank-2");
        assert_eq!(txns[1].debit, BigDecimal::from_str("50.00").unwrap());
        assert_eq!(txns[1].reference(), Some("1001"));
        assert_eq!(txns[1].description, "CHECK # 1001");
        assert!(statement.warnings.is_empty());
    }

    #[test]
    fn test_short_row_is_validation_error() {
        let data = "01/02/2024,100.00,*\n";
        match WellsFargoParser::new().parse(data) {
            Err(ReconciliationError::Validation { index, message, .. }) => {
                assert_eq!(index, 0);
                assert!(message.contains("expected 5 columns"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_marker_and_date_warnings() {
        let data = "2024-01-02,100.00,x,,DEPOSIT\n";
        let warnings = WellsFargoParser::new().validate(data).unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("2024-01-02"));
        assert!(warnings[1].contains("'*' marker"));
    }
}
