//! Amount and date parsing shared by the statement parsers

use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};
use std::str::FromStr;

/// Date formats tried after a parser's primary format fails
pub const FALLBACK_DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%d/%m/%Y", "%d/%m/%y", "%Y/%m/%d", "%m-%d-%Y",
    "%d-%m-%Y",
];

/// An amount parsed from statement text, with the formatting it carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAmount {
    pub value: BigDecimal,
    pub had_currency_symbol: bool,
    pub had_thousands_separator: bool,
    pub parenthesized: bool,
}

/// Parse an amount string, handling `$`, thousands separators and accounting negatives
pub fn parse_amount(raw: &str) -> Result<ParsedAmount, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("amount is empty".to_string());
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();

    // Parentheses mean negative in accounting exports
    let (is_negative, parenthesized, digits) = if let Some(inner) = cleaned
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        (true, true, inner.trim())
    } else if let Some(rest) = cleaned.strip_prefix('-') {
        (true, false, rest.trim_start())
    } else {
        (false, false, cleaned)
    };

    // Anything left besides digits and one decimal point is malformed
    if !digits.chars().any(|c| c.is_ascii_digit())
        || !digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        || digits.matches('.').count() > 1
    {
        return Err(format!("could not parse amount '{}'", raw));
    }

    let value = BigDecimal::from_str(digits)
        .map_err(|e| format!("could not parse amount '{}': {}", raw, e))?;

    Ok(ParsedAmount {
        value: if is_negative { -value } else { value },
        had_currency_symbol: trimmed.contains('$'),
        had_thousands_separator: trimmed.contains(','),
        parenthesized,
    })
}

/// Parse an amount that may legitimately be blank (split debit/credit columns)
pub fn parse_optional_amount(raw: &str) -> Result<Option<ParsedAmount>, String> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse_amount(raw).map(Some)
    }
}

/// Parse a date with the primary format first, then the fallback formats
///
/// Returns the date and whether a fallback format was needed. Four-digit year
/// formats that swallow a two-digit year are skipped.
pub fn parse_date(raw: &str, primary_format: &str) -> Result<(NaiveDate, bool), String> {
    let s = raw.trim();

    if let Some(date) = try_format(s, primary_format) {
        return Ok((date, false));
    }

    for format in FALLBACK_DATE_FORMATS {
        if format == primary_format {
            continue;
        }
        if let Some(date) = try_format(s, format) {
            return Ok((date, true));
        }
    }

    Err(format!("could not parse date '{}'", s))
}

fn try_format(s: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, format)
        .ok()
        .filter(|date| date.year() >= 1000)
}

/// Split a signed amount into (debit, credit)
pub fn split_signed(amount: BigDecimal) -> (BigDecimal, BigDecimal) {
    let zero = BigDecimal::from(0);
    if amount < zero {
        (-amount, zero)
    } else {
        (zero, amount)
    }
}

/// Format money rounded to cents
pub fn format_money(amount: &BigDecimal) -> String {
    amount.round(2).with_scale(2).to_string()
}

/// Per-file tally of formatting quirks, reported once per kind as warnings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatTally {
    pub currency_symbols: usize,
    pub thousands_separators: usize,
    pub parenthesized: usize,
    pub fallback_dates: usize,
    pub first_fallback_date: Option<String>,
}

impl FormatTally {
    /// Record the formatting of one parsed amount
    pub fn record_amount(&mut self, amount: &ParsedAmount) {
        if amount.had_currency_symbol {
            self.currency_symbols += 1;
        }
        if amount.had_thousands_separator {
            self.thousands_separators += 1;
        }
        if amount.parenthesized {
            self.parenthesized += 1;
        }
    }

    /// Record a date that only parsed with a fallback format
    pub fn record_fallback_date(&mut self, raw: &str) {
        self.fallback_dates += 1;
        if self.first_fallback_date.is_none() {
            self.first_fallback_date = Some(raw.trim().to_string());
        }
    }

    /// Warnings describing the recorded quirks
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.currency_symbols > 0 {
            warnings.push(format!(
                "{} amount(s) contained currency symbols that were stripped",
                self.currency_symbols
            ));
        }
        if self.thousands_separators > 0 {
            warnings.push(format!(
                "{} amount(s) contained thousands separators",
                self.thousands_separators
            ));
        }
        if self.parenthesized > 0 {
            warnings.push(format!(
                "{} amount(s) used parentheses and were read as negative",
                self.parenthesized
            ));
        }
        if let Some(first) = &self.first_fallback_date {
            warnings.push(format!(
                "{} date(s) did not match the expected format and may be ambiguous (first: '{}')",
                self.fallback_dates, first
            ));
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount_formats() {
        assert_eq!(parse_amount("1,234.56").unwrap().value, dec("1234.56"));
        assert_eq!(parse_amount("-45.99").unwrap().value, dec("-45.99"));

        let parsed = parse_amount("($250.00)").unwrap();
        assert_eq!(parsed.value, dec("-250.00"));
        assert!(parsed.parenthesized);
        assert!(parsed.had_currency_symbol);

        let parsed = parse_amount("-$1,000.10").unwrap();
        assert_eq!(parsed.value, dec("-1000.10"));
        assert!(parsed.had_thousands_separator);
    }

    #[test]
    fn test_parse_amount_rejects_text() {
        assert!(parse_amount("").is_err());
        assert!(parse_amount("n/a").is_err());
        assert!(parse_amount("12.3.4").is_err());
        assert_eq!(parse_optional_amount("  ").unwrap(), None);
    }

    #[test]
    fn test_parse_amount_rejects_malformed_numbers() {
        for raw in ["12abc34", "1.5E+3", "-1e3", "--5", "(-5.00)", "+5", "pending 3", "1 234"] {
            assert!(parse_amount(raw).is_err(), "'{}' should not parse", raw);
        }
        assert_eq!(parse_amount(" $ 12.50 ").unwrap().value, dec("12.50"));
        assert_eq!(parse_amount("( 7.00 )").unwrap().value, dec("-7.00"));
    }

    #[test]
    fn test_parse_date_primary_and_fallback() {
        let (date, fallback) = parse_date("01/05/2024", "%m/%d/%Y").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert!(!fallback);

        let (date, fallback) = parse_date("2024-01-05", "%m/%d/%Y").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert!(fallback);

        let (date, fallback) = parse_date("01/05/24", "%m/%d/%Y").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert!(fallback);

        assert!(parse_date("yesterday", "%m/%d/%Y").is_err());
    }

    #[test]
    fn test_split_signed_and_format() {
        assert_eq!(split_signed(dec("-50.00")), (dec("50.00"), BigDecimal::from(0)));
        assert_eq!(split_signed(dec("100")), (BigDecimal::from(0), dec("100")));
        assert_eq!(format_money(&dec("1234.5")), "1234.50");
        assert_eq!(format_money(&dec("-12.345678")), "-12.35");
    }

    #[test]
    fn test_tally_warnings() {
        let mut tally = FormatTally::default();
        tally.record_amount(&parse_amount("$5.00").unwrap());
        tally.record_amount(&parse_amount("(1.00)").unwrap());
        tally.record_fallback_date("2024-01-01");
        let warnings = tally.warnings();
        assert_eq!(warnings.len(), 3);
        assert!(warnings[2].contains("2024-01-01"));
    }
}
