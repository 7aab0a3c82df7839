use rusqlite::Connection;

use crate::error::Result;

/// SQL expression scaling a ledger's stored values to display units.
const SCALE: &str = "(CASE l.denomination WHEN 'cents' THEN 100.0 ELSE 1.0 END)";

// ---------------------------------------------------------------------------
// Bankroll summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BankrollEntry {
    pub player: String,
    pub sessions: i64,
    pub total_buy_in: f64,
    pub total_cash_out: f64,
    pub net: f64,
}

pub fn get_bankroll(conn: &Connection, player: Option<&str>) -> Result<Vec<BankrollEntry>> {
    let sql = format!(
        "SELECT MIN(p.name), COUNT(DISTINCT p.ledger_id), \
         SUM(p.buy_in / {SCALE}), SUM(p.cash_out / {SCALE}) \
         FROM ledger_players p JOIN ledgers l ON p.ledger_id = l.id \
         WHERE ?1 IS NULL OR p.name = ?1 COLLATE NOCASE \
         GROUP BY lower(p.name)"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([player], |row| {
        let total_buy_in: f64 = row.get(2)?;
        let total_cash_out: f64 = row.get(3)?;
        Ok(BankrollEntry {
            player: row.get(0)?,
            sessions: row.get(1)?,
            total_buy_in,
            total_cash_out,
            net: total_cash_out - total_buy_in,
        })
    })?;
    let mut entries = rows.collect::<std::result::Result<Vec<_>, _>>()?;
    entries.sort_by(|a, b| b.net.total_cmp(&a.net).then_with(|| a.player.cmp(&b.player)));
    Ok(entries)
}

// ---------------------------------------------------------------------------
// Per-player history
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SessionResult {
    pub ledger_id: i64,
    pub ledger_name: String,
    pub date: String,
    pub buy_in: f64,
    pub cash_out: f64,
    pub net: f64,
    pub cumulative: f64,
}

pub fn get_player_history(conn: &Connection, player: &str) -> Result<Vec<SessionResult>> {
    let sql = format!(
        "SELECT l.id, l.name, l.session_date, \
         SUM(p.buy_in / {SCALE}), SUM(p.cash_out / {SCALE}) \
         FROM ledger_players p JOIN ledgers l ON p.ledger_id = l.id \
         WHERE p.name = ?1 COLLATE NOCASE \
         GROUP BY l.id ORDER BY l.session_date, l.id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows: Vec<(i64, String, String, f64, f64)> = stmt
        .query_map([player], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut cumulative = 0.0;
    Ok(rows
        .into_iter()
        .map(|(ledger_id, ledger_name, date, buy_in, cash_out)| {
            let net = cash_out - buy_in;
            cumulative += net;
            SessionResult {
                ledger_id,
                ledger_name,
                date,
                buy_in,
                cash_out,
                net,
                cumulative,
            }
        })
        .collect())
}
