use std::path::Path;

use rusqlite::{Connection, OptionalExtension};

use crate::error::{LedgerError, Result};
use crate::models::{Denomination, Ledger, LedgerPlayer, Transaction};

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS ledgers (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    session_date TEXT NOT NULL,
    denomination TEXT NOT NULL DEFAULT 'cents',
    source_file TEXT NOT NULL,
    checksum TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS ledger_players (
    id INTEGER PRIMARY KEY,
    ledger_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    aliases TEXT NOT NULL DEFAULT '[]',
    buy_in REAL NOT NULL,
    cash_out REAL NOT NULL,
    FOREIGN KEY (ledger_id) REFERENCES ledgers(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS ledger_transactions (
    id INTEGER PRIMARY KEY,
    ledger_id INTEGER NOT NULL,
    position INTEGER NOT NULL,
    from_player TEXT NOT NULL,
    to_player TEXT NOT NULL,
    amount TEXT NOT NULL,
    FOREIGN KEY (ledger_id) REFERENCES ledgers(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_ledger_players_name ON ledger_players(name COLLATE NOCASE);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Ledger id already holding this source checksum, if any.
pub fn find_by_checksum(conn: &Connection, checksum: &str) -> Result<Option<i64>> {
    Ok(conn
        .query_row(
            "SELECT id FROM ledgers WHERE checksum = ?1",
            [checksum],
            |row| row.get(0),
        )
        .optional()?)
}

pub fn save_ledger(conn: &mut Connection, ledger: &Ledger) -> Result<i64> {
    if let Some(checksum) = &ledger.checksum {
        if let Some(existing) = find_by_checksum(conn, checksum)? {
            return Err(LedgerError::DuplicateSession(existing.to_string()));
        }
    }

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO ledgers (name, session_date, denomination, source_file, checksum) VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            ledger.name,
            ledger.date,
            ledger.denomination.key(),
            ledger.source_file,
            ledger.checksum,
        ],
    )?;
    let ledger_id = tx.last_insert_rowid();

    for player in &ledger.players {
        tx.execute(
            "INSERT INTO ledger_players (ledger_id, name, aliases, buy_in, cash_out) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                ledger_id,
                player.name,
                serde_json::to_string(&player.aliases)?,
                player.buy_in,
                player.cash_out,
            ],
        )?;
    }
    for (position, txn) in ledger.transactions.iter().enumerate() {
        tx.execute(
            "INSERT INTO ledger_transactions (ledger_id, position, from_player, to_player, amount) VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![ledger_id, position as i64, txn.from, txn.to, txn.amount],
        )?;
    }
    tx.commit()?;

    log::info!(
        "saved ledger {ledger_id} '{}' ({} players, {} transactions)",
        ledger.name,
        ledger.players.len(),
        ledger.transactions.len()
    );
    Ok(ledger_id)
}

pub struct LedgerSummary {
    pub id: i64,
    pub name: String,
    pub date: String,
    pub denomination: Denomination,
    pub players: i64,
    pub transactions: i64,
}

fn parse_denomination(raw: String) -> Denomination {
    raw.parse().unwrap_or(Denomination::Cents)
}

pub fn list_ledgers(conn: &Connection) -> Result<Vec<LedgerSummary>> {
    let mut stmt = conn.prepare(
        "SELECT l.id, l.name, l.session_date, l.denomination, \
         (SELECT count(*) FROM ledger_players p WHERE p.ledger_id = l.id), \
         (SELECT count(*) FROM ledger_transactions t WHERE t.ledger_id = l.id) \
         FROM ledgers l ORDER BY l.session_date DESC, l.id DESC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(LedgerSummary {
            id: row.get(0)?,
            name: row.get(1)?,
            date: row.get(2)?,
            denomination: parse_denomination(row.get(3)?),
            players: row.get(4)?,
            transactions: row.get(5)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn get_ledger(conn: &Connection, id: i64) -> Result<Ledger> {
    let header = conn
        .query_row(
            "SELECT name, session_date, denomination, source_file, checksum FROM ledgers WHERE id = ?1",
            [id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                ))
            },
        )
        .optional()?
        .ok_or_else(|| LedgerError::UnknownLedger(id.to_string()))?;

    let mut stmt = conn.prepare(
        "SELECT name, aliases, buy_in, cash_out FROM ledger_players WHERE ledger_id = ?1 ORDER BY id",
    )?;
    let raw_players: Vec<(String, String, f64, f64)> = stmt
        .query_map([id], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let mut players = Vec::with_capacity(raw_players.len());
    for (name, aliases, buy_in, cash_out) in raw_players {
        players.push(LedgerPlayer {
            name,
            aliases: serde_json::from_str(&aliases)?,
            buy_in,
            cash_out,
        });
    }

    let mut stmt = conn.prepare(
        "SELECT from_player, to_player, amount FROM ledger_transactions WHERE ledger_id = ?1 ORDER BY position",
    )?;
    let transactions = stmt
        .query_map([id], |row| {
            Ok(Transaction {
                from: row.get(0)?,
                to: row.get(1)?,
                amount: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let (name, date, denomination, source_file, checksum) = header;
    Ok(Ledger {
        id: Some(id),
        name,
        date,
        denomination: parse_denomination(denomination),
        source_file,
        checksum,
        players,
        transactions,
    })
}

pub fn rename_ledger(conn: &Connection, id: i64, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::InvalidInput("ledger name cannot be empty".to_string()));
    }
    let changed = conn.execute("UPDATE ledgers SET name = ?1 WHERE id = ?2", rusqlite::params![name, id])?;
    if changed == 0 {
        return Err(LedgerError::UnknownLedger(id.to_string()));
    }
    Ok(())
}

pub fn delete_ledger(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute("DELETE FROM ledgers WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(LedgerError::UnknownLedger(id.to_string()));
    }
    log::info!("deleted ledger {id}");
    Ok(())
}
