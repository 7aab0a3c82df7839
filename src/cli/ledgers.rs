use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::db;
use crate::error::Result;
use crate::fmt::money;

pub fn list() -> Result<()> {
    let conn = open_db()?;
    let ledgers = db::list_ledgers(&conn)?;
    if ledgers.is_empty() {
        println!("No ledgers saved yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Name", "Units", "Players", "Payments"]);
    for l in ledgers {
        table.add_row(vec![
            Cell::new(l.id),
            Cell::new(l.date),
            Cell::new(l.name),
            Cell::new(l.denomination),
            Cell::new(l.players),
            Cell::new(l.transactions),
        ]);
    }
    println!("Ledgers\n{table}");
    Ok(())
}

pub fn show(id: i64, json: bool) -> Result<()> {
    let conn = open_db()?;
    let ledger = db::get_ledger(&conn, id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ledger)?);
        return Ok(());
    }

    println!("{} ({}, {})", ledger.name, ledger.date, ledger.source_file);

    let mut players = Table::new();
    players.set_header(vec!["Player", "Aliases", "Buy-in", "Cash-out", "Net"]);
    for p in &ledger.players {
        players.add_row(vec![
            Cell::new(&p.name),
            Cell::new(p.aliases.join(", ")),
            Cell::new(money(p.buy_in, ledger.denomination)),
            Cell::new(money(p.cash_out, ledger.denomination)),
            Cell::new(money(p.cash_out - p.buy_in, ledger.denomination)),
        ]);
    }
    println!("{players}");

    let mut payments = Table::new();
    payments.set_header(vec!["From", "To", "Amount"]);
    for t in &ledger.transactions {
        payments.add_row(vec![Cell::new(&t.from), Cell::new(&t.to), Cell::new(&t.amount)]);
    }
    println!("Settle up\n{payments}");
    Ok(())
}

pub fn rename(id: i64, name: &str) -> Result<()> {
    let conn = open_db()?;
    db::rename_ledger(&conn, id, name)?;
    println!("Renamed ledger {id} to {}", name.trim());
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = open_db()?;
    db::delete_ledger(&conn, id)?;
    println!("Deleted ledger {id}");
    Ok(())
}
