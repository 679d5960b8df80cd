//! Accounting ledger CSV export (QuickBooks-style transaction reports)
//!
//! Columns are located from the header row, so exports with extra columns or a
//! different column order parse the same way. Amounts come either from split
//! `Debit`/`Credit` columns or from a single signed `Amount` column.

use bigdecimal::BigDecimal;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;

use crate::statement::transaction::TransactionBuilder;
use crate::statement::{field, find_column, is_blank, row_error};
use crate::traits::*;
use crate::types::*;
use crate::utils::parsing::{parse_amount, parse_date, parse_optional_amount, FormatTally};

/// Primary date format of ledger exports
pub const LEDGER_DATE_FORMAT: &str = "%m/%d/%Y";

/// Header names recognized for each canonical field, in priority order
pub const DATE_HEADERS: &[&str] = &["date"];
pub const DESCRIPTION_HEADERS: &[&str] = &["description", "memo", "name"];
pub const REFERENCE_HEADERS: &[&str] = &["num", "reference", "ref", "check"];
pub const DEBIT_HEADERS: &[&str] = &["debit", "withdrawal", "payment"];
pub const CREDIT_HEADERS: &[&str] = &["credit", "deposit"];
pub const AMOUNT_HEADERS: &[&str] = &["amount"];

/// Where the amount of a row comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AmountColumns {
    Split { debit: usize, credit: usize },
    Signed(usize),
}

#[derive(Debug, Clone, Copy)]
struct LedgerColumns {
    date: usize,
    description: Option<usize>,
    reference: Option<usize>,
    amounts: AmountColumns,
}

impl LedgerColumns {
    fn detect(headers: &StringRecord) -> ReconResult<Self> {
        let date = find_column(headers, DATE_HEADERS)
            .ok_or_else(|| ReconciliationError::MissingColumn("ledger: Date".to_string()))?;

        let debit = find_column(headers, DEBIT_HEADERS);
        let credit = find_column(headers, CREDIT_HEADERS);
        let amounts = match (debit, credit, find_column(headers, AMOUNT_HEADERS)) {
            (Some(debit), Some(credit), _) => AmountColumns::Split { debit, credit },
            (_, _, Some(amount)) => AmountColumns::Signed(amount),
            _ => {
                return Err(ReconciliationError::MissingColumn(
                    "ledger: Debit and Credit, or Amount".to_string(),
                ))
            }
        };

        Ok(Self {
            date,
            description: find_column(headers, DESCRIPTION_HEADERS),
            reference: find_column(headers, REFERENCE_HEADERS),
            amounts,
        })
    }

    fn has_amount(&self, record: &StringRecord) -> bool {
        match self.amounts {
            AmountColumns::Split { debit, credit } => {
                !field(record, debit).is_empty() || !field(record, credit).is_empty()
            }
            AmountColumns::Signed(amount) => !field(record, amount).is_empty(),
        }
    }
}

/// Parser for ledger exports
#[derive(Debug, Clone)]
pub struct LedgerExportParser {
    source: Source,
    date_format: String,
}

impl Default for LedgerExportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerExportParser {
    /// Parser producing ledger-side transactions
    pub fn new() -> Self {
        Self::for_source(Source::Ledger)
    }

    /// Parser for a generic header-detected CSV on either side
    pub fn for_source(source: Source) -> Self {
        Self {
            source,
            date_format: LEDGER_DATE_FORMAT.to_string(),
        }
    }

    /// Use a different primary date format
    pub fn with_date_format(mut self, date_format: &str) -> Self {
        self.date_format = date_format.to_string();
        self
    }
}

/// Summary rows such as `Total for Checking` carry amounts but no date
fn is_total_row(record: &StringRecord) -> bool {
    record
        .iter()
        .map(str::trim)
        .find(|f| !f.is_empty())
        .map(|f| f.to_lowercase().starts_with("total"))
        .unwrap_or(false)
}

impl StatementParser for LedgerExportParser {
    fn name(&self) -> &str {
        "ledger_export"
    }

    fn source(&self) -> Source {
        self.source
    }

    fn parse(&self, data: &str) -> ReconResult<ParsedStatement> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(data.as_bytes());

        let columns = LedgerColumns::detect(reader.headers()?)?;
        let zero = BigDecimal::from(0);

        let mut statement = ParsedStatement::default();
        let mut tally = FormatTally::default();
        let mut skipped_rows = 0;
        let mut total_rows = 0;
        let mut reversed_signs = 0;

        for (row, result) in reader.records().enumerate() {
            let record = result?;
            if is_blank(&record) {
                skipped_rows += 1;
                continue;
            }

            let raw_date = field(&record, columns.date);
            if raw_date.is_empty() {
                if !columns.has_amount(&record) {
                    // Section headings in report-style exports
                    skipped_rows += 1;
                    continue;
                }
                if is_total_row(&record) {
                    total_rows += 1;
                    continue;
                }
                return Err(row_error(self.source, row, "missing date".to_string(), &record));
            }

            let (date, used_fallback) = parse_date(raw_date, &self.date_format)
                .map_err(|message| row_error(self.source, row, message, &record))?;
            if used_fallback {
                tally.record_fallback_date(raw_date);
            }

            let description = columns
                .description
                .map(|index| field(&record, index))
                .unwrap_or("")
                .to_string();
            let mut builder = TransactionBuilder::new(self.source, row, date, description);

            match columns.amounts {
                AmountColumns::Split { debit, credit } => {
                    let to_error = |message| row_error(self.source, row, message, &record);
                    let debit = parse_optional_amount(field(&record, debit)).map_err(to_error)?;
                    let credit = parse_optional_amount(field(&record, credit)).map_err(to_error)?;
                    if debit.is_none() && credit.is_none() {
                        return Err(row_error(
                            self.source,
                            row,
                            "missing amount".to_string(),
                            &record,
                        ));
                    }

                    let debit = debit.map(|amount| {
                        tally.record_amount(&amount);
                        amount.value
                    });
                    let credit = credit.map(|amount| {
                        tally.record_amount(&amount);
                        amount.value
                    });
                    let debit = debit.unwrap_or_else(|| zero.clone());
                    let credit = credit.unwrap_or_else(|| zero.clone());

                    builder = if debit < zero || credit < zero {
                        reversed_signs += 1;
                        builder.signed_amount(&credit - &debit)
                    } else {
                        builder.debit(debit).credit(credit)
                    };
                }
                AmountColumns::Signed(amount) => {
                    let amount = parse_amount(field(&record, amount))
                        .map_err(|message| row_error(self.source, row, message, &record))?;
                    tally.record_amount(&amount);
                    builder = builder.signed_amount(amount.value);
                }
            }

            if let Some(index) = columns.reference {
                builder = builder.reference(field(&record, index));
            }

            let transaction = builder.build()?;
            debug!("ledger row {} parsed as {}", row + 1, transaction.id);
            statement.transactions.push(transaction);
        }

        statement.warnings.extend(tally.warnings());
        if reversed_signs > 0 {
            statement.warnings.push(format!(
                "{} row(s) had negative values in the Debit/Credit columns and were netted",
                reversed_signs
            ));
        }
        if total_rows > 0 {
            statement
                .warnings
                .push(format!("{} total row(s) skipped", total_rows));
        }
        if skipped_rows > 0 {
            statement.warnings.push(format!(
                "{} row(s) without date or amount skipped",
                skipped_rows
            ));
        }
        if statement.transactions.is_empty() {
            statement.warnings.push("no transactions found".to_string());
        }

        Ok(statement)
    }
}
