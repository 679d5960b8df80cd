//! Diagnostics for statement and ledger CSV files
//!
//! Profiles a file before reconciliation: which columns look like dates,
//! amounts or references, whether they parse, and how a bank file and a ledger
//! file line up. Useful when a parser rejects a file or matching finds nothing.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::types::*;
use crate::utils::parsing::{parse_amount, parse_date};

/// Header words suggesting a date column
pub const DATE_KEYWORDS: &[&str] = &["date", "posting", "transaction"];
/// Header words suggesting an amount column
pub const AMOUNT_KEYWORDS: &[&str] = &["amount", "debit", "credit", "withdrawal", "deposit", "balance"];
/// Header words suggesting a reference column
pub const REFERENCE_KEYWORDS: &[&str] = &["check", "ref", "num", "number", "slip"];
const DESCRIPTION_KEYWORDS: &[&str] = &["description", "desc", "memo", "details"];

/// Transaction count difference above which two files are flagged
pub const LARGE_COUNT_DIFFERENCE: usize = 10;

const DIAGNOSTIC_DATE_FORMAT: &str = "%m/%d/%Y";
const DATE_SAMPLES: usize = 3;
const AMOUNT_SAMPLES: usize = 5;
const REFERENCE_SAMPLES: usize = 3;

/// Fill counts of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnProfile {
    pub name: String,
    pub non_empty: usize,
    pub empty: usize,
}

/// Analysis of a column that looks like it holds dates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateColumnReport {
    pub column: String,
    pub samples: Vec<String>,
    /// Every non-empty value parsed as a date
    pub parseable: bool,
    pub unparsed: usize,
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
}

/// Analysis of a column that looks like it holds amounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountColumnReport {
    pub column: String,
    pub samples: Vec<String>,
    pub has_currency_symbols: bool,
    pub has_thousands_separators: bool,
    pub has_parentheses: bool,
    /// Every non-empty value converted to a number
    pub numeric: bool,
    pub invalid: usize,
    pub min: Option<BigDecimal>,
    pub max: Option<BigDecimal>,
    pub sum: BigDecimal,
}

/// Analysis of a column that looks like it holds check numbers or references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceColumnReport {
    pub column: String,
    pub non_empty: usize,
    pub total: usize,
    pub samples: Vec<String>,
}

/// Suggested mapping from canonical fields to file columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date: Option<String>,
    pub description: Option<String>,
    pub debit: Option<String>,
    pub credit: Option<String>,
    /// Debit and credit both come from one signed column
    pub single_amount_column: bool,
    pub reference: Option<String>,
    pub balance: Option<String>,
}

impl ColumnMapping {
    /// Canonical fields with no column found
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let fields = [
            ("date", &self.date),
            ("description", &self.description),
            ("debit", &self.debit),
            ("credit", &self.credit),
            ("reference", &self.reference),
            ("balance", &self.balance),
        ];
        fields
            .iter()
            .filter(|(_, column)| column.is_none())
            .map(|(name, _)| *name)
            .collect()
    }
}

/// Full profile of one CSV file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub row_count: usize,
    pub columns: Vec<ColumnProfile>,
    pub date_columns: Vec<DateColumnReport>,
    pub amount_columns: Vec<AmountColumnReport>,
    pub reference_columns: Vec<ReferenceColumnReport>,
    pub suggested_mapping: ColumnMapping,
    /// First data row contains a `$`
    pub first_row_has_currency_symbol: bool,
}

impl FileAnalysis {
    /// Date range of the first date column that fully parses
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_columns
            .iter()
            .filter(|report| report.parseable)
            .find_map(|report| report.earliest.zip(report.latest))
    }

    /// Whether any column has empty values
    pub fn has_missing_values(&self) -> bool {
        self.columns.iter().any(|column| column.empty > 0)
    }
}

/// How a bank file and a ledger file line up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileComparison {
    pub bank_range: Option<(NaiveDate, NaiveDate)>,
    pub ledger_range: Option<(NaiveDate, NaiveDate)>,
    /// `None` when either range is unknown or the ranges do not overlap
    pub overlap: Option<(NaiveDate, NaiveDate)>,
    pub bank_count: usize,
    pub ledger_count: usize,
    pub count_difference: usize,
    pub large_count_difference: bool,
}

fn matches_any(header: &str, keywords: &[&str]) -> bool {
    let header = header.to_lowercase();
    keywords.iter().any(|keyword| header.contains(keyword))
}

fn column_values<'a>(rows: &'a [StringRecord], index: usize) -> impl Iterator<Item = &'a str> {
    rows.iter()
        .map(move |row| row.get(index).map(str::trim).unwrap_or(""))
}

fn analyze_date_column(name: &str, rows: &[StringRecord], index: usize) -> DateColumnReport {
    let mut report = DateColumnReport {
        column: name.to_string(),
        samples: column_values(rows, index)
            .take(DATE_SAMPLES)
            .map(str::to_string)
            .collect(),
        parseable: true,
        unparsed: 0,
        earliest: None,
        latest: None,
    };

    for value in column_values(rows, index).filter(|v| !v.is_empty()) {
        match parse_date(value, DIAGNOSTIC_DATE_FORMAT) {
            Ok((date, _)) => {
                report.earliest = Some(report.earliest.map_or(date, |d| d.min(date)));
                report.latest = Some(report.latest.map_or(date, |d| d.max(date)));
            }
            Err(_) => report.unparsed += 1,
        }
    }
    report.parseable = report.unparsed == 0 && report.earliest.is_some();
    report
}

fn analyze_amount_column(name: &str, rows: &[StringRecord], index: usize) -> AmountColumnReport {
    let mut report = AmountColumnReport {
        column: name.to_string(),
        samples: column_values(rows, index)
            .take(AMOUNT_SAMPLES)
            .map(str::to_string)
            .collect(),
        has_currency_symbols: false,
        has_thousands_separators: false,
        has_parentheses: false,
        numeric: true,
        invalid: 0,
        min: None,
        max: None,
        sum: BigDecimal::from(0),
    };

    for value in column_values(rows, index).filter(|v| !v.is_empty()) {
        report.has_currency_symbols |= value.contains('$');
        report.has_thousands_separators |= value.contains(',');
        report.has_parentheses |= value.contains('(');

        match parse_amount(value) {
            Ok(parsed) => {
                let amount = parsed.value;
                report.sum += &amount;
                report.min = Some(match report.min.take() {
                    Some(min) if min <= amount => min,
                    _ => amount.clone(),
                });
                report.max = Some(match report.max.take() {
                    Some(max) if max >= amount => max,
                    _ => amount,
                });
            }
            Err(_) => report.invalid += 1,
        }
    }
    report.numeric = report.invalid == 0;
    report
}

fn analyze_reference_column(name: &str, rows: &[StringRecord], index: usize) -> ReferenceColumnReport {
    let non_empty: Vec<&str> = column_values(rows, index).filter(|v| !v.is_empty()).collect();
    ReferenceColumnReport {
        column: name.to_string(),
        non_empty: non_empty.len(),
        total: rows.len(),
        samples: non_empty
            .iter()
            .take(REFERENCE_SAMPLES)
            .map(|v| v.to_string())
            .collect(),
    }
}

/// Suggest which columns map to the canonical fields, from header names alone
///
/// Each header is assigned to at most one field, checked in the order date,
/// description, debit, credit, single amount, reference, balance.
pub fn suggest_mapping(headers: &[String]) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();

    for header in headers {
        let lower = header.to_lowercase();

        if matches_any(&lower, DATE_KEYWORDS) && mapping.date.is_none() {
            mapping.date = Some(header.clone());
        } else if matches_any(&lower, DESCRIPTION_KEYWORDS) && mapping.description.is_none() {
            mapping.description = Some(header.clone());
        } else if lower.contains("debit") || lower.contains("withdrawal") {
            mapping.debit = Some(header.clone());
            mapping.single_amount_column = false;
        } else if lower.contains("credit") || lower.contains("deposit") {
            mapping.credit = Some(header.clone());
            mapping.single_amount_column = false;
        } else if lower.contains("amount") && mapping.debit.is_none() {
            mapping.debit = Some(header.clone());
            mapping.credit = Some(header.clone());
            mapping.single_amount_column = true;
        } else if matches_any(&lower, &["check", "ref", "num", "slip"]) && mapping.reference.is_none() {
            mapping.reference = Some(header.clone());
        } else if lower.contains("balance") && mapping.balance.is_none() {
            mapping.balance = Some(header.clone());
        }
    }

    mapping
}

/// Profile CSV contents with a header row
pub fn analyze_csv(data: &str) -> ReconResult<FileAnalysis> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(data.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
    debug!("analyzing {} rows across {} columns", rows.len(), headers.len());

    let columns = headers
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let non_empty = column_values(&rows, index).filter(|v| !v.is_empty()).count();
            ColumnProfile {
                name: name.clone(),
                non_empty,
                empty: rows.len() - non_empty,
            }
        })
        .collect();

    let mut analysis = FileAnalysis {
        row_count: rows.len(),
        columns,
        date_columns: Vec::new(),
        amount_columns: Vec::new(),
        reference_columns: Vec::new(),
        suggested_mapping: suggest_mapping(&headers),
        first_row_has_currency_symbol: rows
            .first()
            .map(|row| row.iter().any(|f| f.contains('$')))
            .unwrap_or(false),
    };

    for (index, name) in headers.iter().enumerate() {
        if matches_any(name, DATE_KEYWORDS) {
            analysis.date_columns.push(analyze_date_column(name, &rows, index));
        }
        if matches_any(name, AMOUNT_KEYWORDS) {
            analysis.amount_columns.push(analyze_amount_column(name, &rows, index));
        }
        if matches_any(name, REFERENCE_KEYWORDS) {
            analysis.reference_columns.push(analyze_reference_column(name, &rows, index));
        }
    }

    Ok(analysis)
}

/// Profile a CSV file on disk
pub fn analyze_path(path: &Path) -> ReconResult<FileAnalysis> {
    let data = std::fs::read_to_string(path)?;
    analyze_csv(&data)
}

/// Compare date coverage and transaction counts of a bank and a ledger file
pub fn compare_files(bank: &FileAnalysis, ledger: &FileAnalysis) -> FileComparison {
    let bank_range = bank.date_range();
    let ledger_range = ledger.date_range();

    let overlap = bank_range.zip(ledger_range).and_then(|(b, l)| {
        let start = b.0.max(l.0);
        let end = b.1.min(l.1);
        (start <= end).then_some((start, end))
    });

    let count_difference = bank.row_count.abs_diff(ledger.row_count);

    FileComparison {
        bank_range,
        ledger_range,
        overlap,
        bank_count: bank.row_count,
        ledger_count: ledger.row_count,
        count_difference,
        large_count_difference: count_difference > LARGE_COUNT_DIFFERENCE,
    }
}

/// Plain-language fixes for the issues found
pub fn recommendations(bank: Option<&FileAnalysis>, ledger: Option<&FileAnalysis>) -> Vec<String> {
    let mut recommendations = Vec::new();

    if let Some(bank) = bank {
        if bank.first_row_has_currency_symbol {
            recommendations.push("Remove currency symbols ($) from amount columns".to_string());
        }
        if bank.has_missing_values() {
            recommendations.push("Handle missing/null values in data".to_string());
        }
    }

    for (label, analysis) in [("bank", bank), ("ledger", ledger)] {
        if let Some(analysis) = analysis {
            if analysis.date_range().is_none() {
                recommendations.push(format!(
                    "No parseable date column found in the {} file; check the date format",
                    label
                ));
            }
        }
    }

    if let (Some(bank), Some(ledger)) = (bank, ledger) {
        let comparison = compare_files(bank, ledger);
        if comparison.bank_range.is_some()
            && comparison.ledger_range.is_some()
            && comparison.overlap.is_none()
        {
            recommendations
                .push("Date ranges do not overlap; the files may be from different periods".to_string());
        }
    }

    if recommendations.is_empty() {
        recommendations.push("Files appear to be properly formatted".to_string());
        recommendations
            .push("If matching is not working, check date formats and amount signs".to_string());
        recommendations.push(
            "Adjust the amount tolerance and date window in the match configuration if needed"
                .to_string(),
        );
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const CHASE: &str = "\
Details,Posting Date,Description,Amount,Type,Balance,Check or Slip #
CREDIT,01/02/2024,DEPOSIT,\"$1,250.00\",DEPOSIT,3250.00,
CHECK,01/05/2024,CHECK 1001,-50.00,CHECK_PAID,3200.00,1001
DEBIT,01/31/2024,SERVICE FEE,(12.00),FEE_TRANSACTION,3188.00,
";

    const LEDGER: &str = "\
Date,Num,Memo,Debit,Credit
01/02/2024,,Deposit,,1250.00
01/20/2024,1002,Office rent,900.00,
";

    #[test]
    fn test_analyze_bank_file() {
        let analysis = analyze_csv(CHASE).unwrap();
        assert_eq!(analysis.row_count, 3);
        assert!(analysis.first_row_has_currency_symbol);

        let date = &analysis.date_columns[0];
        assert_eq!(date.column, "Posting Date");
        assert!(date.parseable);
        assert_eq!(date.earliest, NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(date.latest, NaiveDate::from_ymd_opt(2024, 1, 31));

        let amount = analysis
            .amount_columns
            .iter()
            .find(|c| c.column == "Amount")
            .unwrap();
        assert!(amount.has_currency_symbols);
        assert!(amount.has_thousands_separators);
        assert!(amount.has_parentheses);
        assert!(amount.numeric);
        assert_eq!(amount.sum, BigDecimal::from_str("1188.00").unwrap());
        assert_eq!(amount.min, Some(BigDecimal::from(-50)));

        let reference = &analysis.reference_columns[0];
        assert_eq!(reference.non_empty, 1);
        assert_eq!(reference.samples, vec!["1001".to_string()]);

        let checks = analysis.columns.iter().find(|c| c.name == "Check or Slip #").unwrap();
        assert_eq!(checks.empty, 2);
    }

    #[test]
    fn test_suggest_mapping() {
        let headers: Vec<String> = ["Posting Date", "Details", "Amount", "Check or Slip #", "Balance"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let mapping = suggest_mapping(&headers);

        assert_eq!(mapping.date.as_deref(), Some("Posting Date"));
        assert_eq!(mapping.description.as_deref(), Some("Details"));
        assert_eq!(mapping.debit.as_deref(), Some("Amount"));
        assert!(mapping.single_amount_column);
        assert_eq!(mapping.reference.as_deref(), Some("Check or Slip #"));
        assert_eq!(mapping.balance.as_deref(), Some("Balance"));
        assert!(mapping.missing_fields().is_empty());
    }

    #[test]
    fn test_compare_files() {
        let bank = analyze_csv(CHASE).unwrap();
        let ledger = analyze_csv(LEDGER).unwrap();
        let comparison = compare_files(&bank, &ledger);

        assert_eq!(
            comparison.overlap,
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 20).unwrap()
            ))
        );
        assert_eq!(comparison.count_difference, 1);
        assert!(!comparison.large_count_difference);
    }

    #[test]
    fn test_large_count_difference_and_no_overlap() {
        let mut bank_csv = String::from("Date,Description,Amount\n");
        for day in 1..=12 {
            bank_csv.push_str(&format!("03/{:02}/2024,Item,1.00\n", day));
        }
        let bank = analyze_csv(&bank_csv).unwrap();
        let ledger = analyze_csv("Date,Description,Amount\n01/01/2024,Item,1.00\n").unwrap();

        let comparison = compare_files(&bank, &ledger);
        assert_eq!(comparison.count_difference, 11);
        assert!(comparison.large_count_difference);
        assert_eq!(comparison.overlap, None);

        let advice = recommendations(Some(&bank), Some(&ledger));
        assert!(advice.iter().any(|r| r.contains("do not overlap")));
    }

    #[test]
    fn test_recommendations_for_clean_files() {
        let ledger = analyze_csv(LEDGER).unwrap();
        let clean = analyze_csv("Date,Description,Amount\n01/02/2024,Deposit,1250.00\n").unwrap();
        let advice = recommendations(Some(&clean), Some(&ledger));
        assert_eq!(advice[0], "Files appear to be properly formatted");

        let bank = analyze_csv(CHASE).unwrap();
        let advice = recommendations(Some(&bank), None);
        assert!(advice.iter().any(|r| r.contains("currency symbols")));
        assert!(advice.iter().any(|r| r.contains("missing/null")));
    }
}
