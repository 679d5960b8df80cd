//! Basic reconciliation example
//!
//! Run with no arguments to reconcile the built-in sample files, or pass
//! `<bank_format> <bank_csv> [ledger_csv]` to reconcile your own. Without a
//! ledger file the bank transactions are written out in import format.

use bank_reconciliation::export::{statement_totals, write_ledger_import_csv};
use bank_reconciliation::utils::format_money;
use bank_reconciliation::{
    BankFormat, LedgerExportParser, ParsedStatement, ReconciliationConfig, ReconciliationEngine,
    StatementParser,
};
use std::path::Path;

const SAMPLE_BANK: &str = "\
Details,Posting Date,Description,Amount,Type,Balance,Check or Slip #
CREDIT,01/02/2024,REMOTE ONLINE DEPOSIT,\"1,250.00\",DEPOSIT,3250.00,,
CHECK,01/05/2024,CHECK 1001,-50.00,CHECK_PAID,3200.00,1001,
DEBIT,01/12/2024,ONLINE TRANSFER TO SAV,-200.00,ACCT_XFER,3000.00,,
CREDIT,01/29/2024,INTEREST PAYMENT,0.42,ACCT_INTEREST,3000.42,,
DEBIT,01/31/2024,MONTHLY SERVICE FEE,-12.00,FEE_TRANSACTION,2988.42,,
";

const SAMPLE_LEDGER: &str = "\
Date,Transaction Type,Num,Name,Memo/Description,Debit,Credit
01/03/2024,Deposit,,Acme Corp,Invoice 7,,1250.00
01/04/2024,Check,1001,Paper Co,Supplies,50.00,
01/12/2024,Transfer,,Savings,Transfer to savings,200.00,
01/20/2024,Check,1002,Landlord LLC,Office rent,900.00,
01/26/2024,Check,1003,Utility Co,Electricity,84.17,
01/30/2024,Deposit,,Beta LLC,Invoice 8,,300.00
";

fn print_warnings(label: &str, statement: &ParsedStatement) {
    if statement.warnings.is_empty() {
        return;
    }
    println!("⚠ Data validation issues in {}:", label);
    for warning in &statement.warnings {
        println!("  - {}", warning);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🏦 Bank Reconciliation - Basic Example\n");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let format: BankFormat = args.first().map(String::as_str).unwrap_or("chase").parse()?;
    let parser = format.parser();
    let config = ReconciliationConfig::default();

    println!("Configuration:");
    println!("  Bank Type: {}", format);
    println!("  Match Threshold: ${}", config.matching.amount_tolerance);
    println!("  Date Window: {} days\n", config.matching.date_window_days);

    let bank = match args.get(1) {
        Some(path) => parser.parse_path(Path::new(path))?,
        None => parser.parse(SAMPLE_BANK)?,
    };
    print_warnings("bank statement", &bank);

    let ledger = match (args.get(1), args.get(2)) {
        (_, Some(path)) => Some(LedgerExportParser::new().parse_path(Path::new(path))?),
        (None, None) => Some(LedgerExportParser::new().parse(SAMPLE_LEDGER)?),
        (Some(_), None) => None,
    };

    let Some(ledger) = ledger else {
        println!("No ledger file provided - showing bank transactions only\n");
        let stdout = std::io::stdout();
        write_ledger_import_csv(stdout.lock(), &bank.transactions)?;

        let totals = statement_totals(&bank.transactions);
        println!("\n  Total transactions: {}", totals.count);
        println!("  Total debits: ${}", format_money(&totals.total_debits));
        println!("  Total credits: ${}", format_money(&totals.total_credits));
        return Ok(());
    };
    print_warnings("ledger export", &ledger);

    let engine = ReconciliationEngine::new(config);
    let summary = engine.reconcile_statements(&bank, &ledger)?;

    println!("\n📊 Reconciliation Summary");
    println!("  Matched pairs: {}", summary.match_count());
    println!("  Matched amount: ${}", format_money(&summary.totals.matched_amount));
    println!(
        "  In bank, not in books: ${}",
        format_money(&summary.totals.unmatched_bank_amount)
    );
    println!(
        "  In books, not in bank: ${}",
        format_money(&summary.totals.unmatched_ledger_amount)
    );
    println!("  Difference: ${}", format_money(&summary.totals.difference));
    println!("  Verdict: {}", summary.verdict);

    let items = engine.action_items(&summary);
    println!("\n📋 ACTION ITEMS:");

    if items.bank_not_ledger_count > 0 {
        println!(
            "\n  1. Review {} transactions in bank not in books:",
            items.bank_not_ledger_count
        );
        for line in &items.bank_not_ledger {
            println!(
                "     • {}: {} items totaling ${}",
                line.category,
                line.count,
                format_money(&line.sum)
            );
        }
        println!("\n     Actions needed:");
        println!("     - Record bank fees in the books");
        println!("     - Enter missing deposits");
        println!("     - Investigate any unrecognized transactions");
    }

    if items.ledger_not_bank_count > 0 {
        println!(
            "\n  2. Review {} transactions in books not in bank:",
            items.ledger_not_bank_count
        );
        let outstanding = &items.outstanding_checks;
        if outstanding.count > 0 {
            println!(
                "     • Outstanding checks: {} totaling ${}",
                outstanding.count,
                format_money(&outstanding.total)
            );
            for check in &outstanding.shown {
                println!(
                    "       - Check #{}: ${} ({})",
                    check.reference,
                    format_money(&check.amount),
                    check.date
                );
            }
            if outstanding.remaining > 0 {
                println!("       ... and {} more", outstanding.remaining);
            }
        }
        println!("\n     Actions needed:");
        println!("     - Follow up on outstanding checks");
        println!("     - Verify deposits in transit");
        println!("     - Correct any data entry errors");
    }

    println!("\n✅ Bank-only transactions in import format:\n");
    write_ledger_import_csv(std::io::stdout().lock(), &summary.unmatched_bank)?;

    Ok(())
}
