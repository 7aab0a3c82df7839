use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// One player row from an uploaded session CSV, after boundary defaulting.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub player_nickname: String,
    pub buy_in: f64,
    pub buy_out: f64,
    pub stack: f64,
}

/// Money totals shared by per-nickname summaries and alias groups.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub buy_in: f64,
    pub buy_out: f64,
    pub stack: f64,
    pub combined: f64,
}

impl Totals {
    pub fn add(&mut self, other: &Totals) {
        self.buy_in += other.buy_in;
        self.buy_out += other.buy_out;
        self.stack += other.stack;
        self.combined += other.combined;
    }

    /// Cash-out plus remaining stack, minus buy-in.
    pub fn net(&self) -> f64 {
        self.combined - self.buy_in
    }
}

/// Aggregated totals for a single exact nickname.
pub type AliasSummary = Totals;

/// A cluster of nicknames believed to be the same real player.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasGroup {
    pub members: BTreeSet<String>,
    pub canonical_name: String,
    pub totals: Totals,
}

/// A player's final position in hundredths of the display unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetPosition {
    pub name: String,
    pub net: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub amount: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Denomination {
    Cents,
    Dollars,
}

impl Denomination {
    /// Stored units per display unit.
    pub fn scale(&self) -> f64 {
        match self {
            Self::Cents => 100.0,
            Self::Dollars => 1.0,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            Self::Cents => "cents",
            Self::Dollars => "dollars",
        }
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Denomination {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cents" => Ok(Self::Cents),
            "dollars" => Ok(Self::Dollars),
            other => Err(LedgerError::Settings(format!(
                "unknown denomination '{other}' (expected cents or dollars)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerPlayer {
    pub name: String,
    pub aliases: Vec<String>,
    pub buy_in: f64,
    pub cash_out: f64,
}

/// The persisted record of a confirmed session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub date: String,
    pub denomination: Denomination,
    pub source_file: String,
    #[serde(default)]
    pub checksum: Option<String>,
    pub players: Vec<LedgerPlayer>,
    pub transactions: Vec<Transaction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denomination_parse() {
        assert_eq!("cents".parse::<Denomination>().unwrap(), Denomination::Cents);
        assert_eq!(" Dollars ".parse::<Denomination>().unwrap(), Denomination::Dollars);
        assert!("euros".parse::<Denomination>().is_err());
    }

    #[test]
    fn test_totals_add_and_net() {
        let mut t = Totals::default();
        t.add(&Totals { buy_in: 100.0, buy_out: 50.0, stack: 80.0, combined: 130.0 });
        t.add(&Totals { buy_in: 20.0, buy_out: 0.0, stack: 0.0, combined: 0.0 });
        assert_eq!(t.buy_in, 120.0);
        assert_eq!(t.combined, 130.0);
        assert_eq!(t.net(), 10.0);
    }

    #[test]
    fn test_ledger_json_shape() {
        let ledger = Ledger {
            id: None,
            name: "Friday".to_string(),
            date: "2025-01-10".to_string(),
            denomination: Denomination::Cents,
            source_file: "ledger.csv".to_string(),
            checksum: None,
            players: vec![LedgerPlayer {
                name: "Mike".to_string(),
                aliases: vec!["Mike".to_string(), "Mike22".to_string()],
                buy_in: 2000.0,
                cash_out: 3500.0,
            }],
            transactions: vec![Transaction {
                from: "Bob".to_string(),
                to: "Mike".to_string(),
                amount: "15.00".to_string(),
            }],
        };
        let value = serde_json::to_value(&ledger).unwrap();
        assert_eq!(value["denomination"], "cents");
        assert_eq!(value["sourceFile"], "ledger.csv");
        assert_eq!(value["players"][0]["buyIn"], 2000.0);
        assert_eq!(value["players"][0]["cashOut"], 3500.0);
        assert_eq!(value["transactions"][0]["amount"], "15.00");
        assert!(value.get("id").is_none());
    }
}
