//! File diagnostics example
//!
//! Usage: `cargo run --example diagnose_files -- [bank_csv] [ledger_csv]`

use bank_reconciliation::utils::diagnostics::{
    analyze_path, compare_files, recommendations, FileAnalysis,
};
use bank_reconciliation::utils::format_money;
use std::path::Path;

fn describe(label: &str, analysis: &FileAnalysis) {
    println!("\nAnalyzing {} file", label);
    println!("  ✓ Loaded {} rows", analysis.row_count);

    println!("\n  Columns:");
    for column in &analysis.columns {
        println!("    • {:30} Filled: {:5} Empty: {}", column.name, column.non_empty, column.empty);
    }

    println!("\n  Date columns:");
    for report in &analysis.date_columns {
        println!("    {} (samples: {:?})", report.column, report.samples);
        match (report.parseable, report.earliest, report.latest) {
            (true, Some(earliest), Some(latest)) => {
                println!("      ✓ Parses as dates, {} to {}", earliest, latest)
            }
            _ => println!("      ✗ {} value(s) do not parse as dates", report.unparsed),
        }
    }

    println!("\n  Amount columns:");
    for report in &analysis.amount_columns {
        println!("    {} (samples: {:?})", report.column, report.samples);
        if report.has_currency_symbols {
            println!("      ⚠ Contains $ symbols");
        }
        if report.has_thousands_separators {
            println!("      ⚠ Contains commas");
        }
        if report.has_parentheses {
            println!("      ⚠ Contains parentheses (negative values?)");
        }
        if let (Some(min), Some(max)) = (&report.min, &report.max) {
            println!(
                "      Range: ${} to ${}, sum ${}",
                format_money(min),
                format_money(max),
                format_money(&report.sum)
            );
        }
        if !report.numeric {
            println!("      ✗ {} value(s) are not numeric", report.invalid);
        }
    }

    println!("\n  Reference columns:");
    for report in &analysis.reference_columns {
        println!(
            "    {}: {}/{} filled, samples {:?}",
            report.column, report.non_empty, report.total, report.samples
        );
    }

    let mapping = &analysis.suggested_mapping;
    println!("\n  Suggested mapping:");
    let fields = [
        ("Date", &mapping.date),
        ("Description", &mapping.description),
        ("Debit", &mapping.debit),
        ("Credit", &mapping.credit),
        ("Reference", &mapping.reference),
        ("Balance", &mapping.balance),
    ];
    for (field, column) in fields {
        println!("    {:12} → {}", field, column.as_deref().unwrap_or("Not found"));
    }
}

fn load(label: &str, path: &str) -> Option<FileAnalysis> {
    match analyze_path(Path::new(path)) {
        Ok(analysis) => Some(analysis),
        Err(e) => {
            println!("✗ Could not read {} file {}: {}", label, path, e);
            None
        }
    }
}

fn main() {
    println!("🔍 Bank Reconciliation - File Diagnostics\n");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let bank_path = args.first().map(String::as_str).unwrap_or("data/input/bank_statement.csv");
    let ledger_path = args.get(1).map(String::as_str).unwrap_or("data/input/ledger_export.csv");

    let bank = load("bank", bank_path);
    let ledger = load("ledger", ledger_path);

    if bank.is_none() && ledger.is_none() {
        println!("\nNo files found to analyze");
        println!("Usage: diagnose_files [bank_csv] [ledger_csv]");
        return;
    }

    if let Some(analysis) = &bank {
        describe("bank", analysis);
    }
    if let Some(analysis) = &ledger {
        describe("ledger", analysis);
    }

    if let (Some(bank), Some(ledger)) = (&bank, &ledger) {
        let comparison = compare_files(bank, ledger);
        println!("\nFile comparison:");
        match comparison.overlap {
            Some((start, end)) => println!("  ✓ Date ranges overlap: {} to {}", start, end),
            None => println!("  ✗ No date overlap - files may be from different periods"),
        }
        println!(
            "  Transactions: bank {}, ledger {}",
            comparison.bank_count, comparison.ledger_count
        );
        if comparison.large_count_difference {
            println!(
                "  ⚠ Large difference ({} transactions)",
                comparison.count_difference
            );
        }
    }

    println!("\nRECOMMENDATIONS:");
    for (i, recommendation) in recommendations(bank.as_ref(), ledger.as_ref())
        .iter()
        .enumerate()
    {
        println!("  {}. {}", i + 1, recommendation);
    }
}
