use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::aliases::{GroupEdit, Grouping};
use crate::cli::{open_db, ImportArgs};
use crate::db::save_ledger;
use crate::error::{LedgerError, Result};
use crate::fmt::{hundredths, money};
use crate::importer::{compute_checksum, parse_session_csv};
use crate::ledger::{confirm, preview, SessionMeta, SettlementPreview};
use crate::models::Denomination;
use crate::settings::load_settings;

fn session_date(raw: Option<&str>) -> Result<String> {
    match raw {
        Some(d) => chrono::NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .map_err(|_| LedgerError::InvalidInput(format!("invalid date '{d}' (expected YYYY-MM-DD)"))),
        None => Ok(chrono::Local::now().format("%Y-%m-%d").to_string()),
    }
}

fn print_groups(grouping: &Grouping, settlement: &SettlementPreview, denomination: Denomination) {
    let mut table = Table::new();
    table.set_header(vec!["#", "Player", "Aliases", "Buy-in", "Cash-out", "Net"]);
    for (i, (group, position)) in grouping.groups().iter().zip(&settlement.positions).enumerate() {
        let aliases: Vec<&str> = group.members.iter().map(String::as_str).collect();
        let net_cell = if position.net < 0 {
            hundredths(position.net).red()
        } else {
            hundredths(position.net).green()
        };
        table.add_row(vec![
            Cell::new(i),
            Cell::new(&group.canonical_name),
            Cell::new(aliases.join(", ")),
            Cell::new(money(group.totals.buy_in, denomination)),
            Cell::new(money(group.totals.combined, denomination)),
            Cell::new(net_cell),
        ]);
    }
    println!("Players\n{table}");
}

pub fn run(args: ImportArgs) -> Result<()> {
    let settings = load_settings();
    let file_path = PathBuf::from(&args.file);
    let denomination = match args.denomination.as_deref() {
        Some(d) => d.parse()?,
        None => settings.default_denomination,
    };
    let edits = args
        .edits
        .iter()
        .map(|e| e.parse::<GroupEdit>())
        .collect::<Result<Vec<_>>>()?;

    let session = parse_session_csv(&file_path)?;
    if session.defaulted > 0 {
        println!(
            "{}",
            format!("{} money fields were not numbers and were read as 0", session.defaulted).yellow()
        );
    }

    let mut grouping = Grouping::from_rows(&session.rows, settings.similarity_threshold);
    for edit in &edits {
        grouping = grouping.apply(edit)?;
    }
    let settlement = preview(&grouping, denomination)?;
    print_groups(&grouping, &settlement, denomination);

    let mut table = Table::new();
    table.set_header(vec!["From", "To", "Amount"]);
    for txn in &settlement.transactions {
        table.add_row(vec![
            Cell::new(&txn.from),
            Cell::new(&txn.to),
            Cell::new(&txn.amount),
        ]);
    }
    println!("Settle up\n{table}");
    if settlement.imbalance != 0 {
        println!(
            "{}",
            format!("Net positions are off by {}", hundredths(settlement.imbalance)).yellow()
        );
    }

    if !args.save {
        println!("Preview only. Re-run with --save to store this ledger.");
        return Ok(());
    }

    let source_file = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string();
    let name = args.name.clone().unwrap_or_else(|| {
        file_path
            .file_stem()
            .and_then(|n| n.to_str())
            .unwrap_or("session")
            .to_string()
    });
    let meta = SessionMeta {
        name,
        date: session_date(args.date.as_deref())?,
        denomination,
        source_file,
        checksum: Some(compute_checksum(&file_path)?),
    };

    let ledger = confirm(meta, &grouping, settings.balance_tolerance, args.allow_unbalanced)?;
    let mut conn = open_db()?;
    let id = save_ledger(&mut conn, &ledger)?;
    println!("{} ledger {id}: {}", "Saved".green().bold(), ledger.name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_date() {
        assert_eq!(session_date(Some("2025-01-10")).unwrap(), "2025-01-10");
        assert!(matches!(
            session_date(Some("01/10/2025")),
            Err(LedgerError::InvalidInput(_))
        ));
        assert_eq!(session_date(None).unwrap().len(), 10);
    }
}
