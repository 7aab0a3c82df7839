use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::open_db;
use crate::error::Result;
use crate::fmt::dollars;
use crate::reports;

fn signed(val: f64) -> colored::ColoredString {
    if val < 0.0 {
        dollars(val).red()
    } else {
        dollars(val).green()
    }
}

pub fn run(player: Option<String>) -> Result<()> {
    let conn = open_db()?;
    match player {
        Some(name) => history(&conn, &name),
        None => summary(&conn),
    }
}

fn summary(conn: &rusqlite::Connection) -> Result<()> {
    let entries = reports::get_bankroll(conn, None)?;
    if entries.is_empty() {
        println!("No ledgers saved yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Player", "Sessions", "Buy-ins", "Cash-outs", "Net"]);
    for e in &entries {
        table.add_row(vec![
            Cell::new(&e.player),
            Cell::new(e.sessions),
            Cell::new(dollars(e.total_buy_in)),
            Cell::new(dollars(e.total_cash_out)),
            Cell::new(signed(e.net)),
        ]);
    }
    println!("Bankroll\n{table}");
    Ok(())
}

fn history(conn: &rusqlite::Connection, player: &str) -> Result<()> {
    let sessions = reports::get_player_history(conn, player)?;
    if sessions.is_empty() {
        println!("No sessions found for {player}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Ledger", "Buy-in", "Cash-out", "Net", "Running"]);
    for s in &sessions {
        table.add_row(vec![
            Cell::new(&s.date),
            Cell::new(format!("{} (#{})", s.ledger_name, s.ledger_id)),
            Cell::new(dollars(s.buy_in)),
            Cell::new(dollars(s.cash_out)),
            Cell::new(signed(s.net)),
            Cell::new(signed(s.cumulative)),
        ]);
    }
    println!("{}\n{table}", player.bold());
    Ok(())
}
