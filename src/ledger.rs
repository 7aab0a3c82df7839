use std::collections::HashSet;

use crate::aliases::Grouping;
use crate::error::{LedgerError, Result};
use crate::models::{Denomination, Ledger, LedgerPlayer, NetPosition, Transaction};
use crate::settlement::{check_balanced, imbalance, net_positions, settle};

#[derive(Debug, Clone)]
pub struct SessionMeta {
    pub name: String,
    pub date: String,
    pub denomination: Denomination,
    pub source_file: String,
    pub checksum: Option<String>,
}

/// Derived view of a grouping; recomputed after every edit.
#[derive(Debug, Clone)]
pub struct SettlementPreview {
    pub positions: Vec<NetPosition>,
    pub transactions: Vec<Transaction>,
    pub imbalance: i64,
}

pub fn preview(grouping: &Grouping, denomination: Denomination) -> Result<SettlementPreview> {
    let positions = net_positions(grouping.groups(), denomination)?;
    let transactions = settle(&positions);
    Ok(SettlementPreview {
        imbalance: imbalance(&positions)?,
        positions,
        transactions,
    })
}

/// Freeze a grouping into a ledger ready to persist.
pub fn confirm(
    meta: SessionMeta,
    grouping: &Grouping,
    tolerance: i64,
    allow_unbalanced: bool,
) -> Result<Ledger> {
    let mut seen = HashSet::new();
    for group in grouping.groups() {
        if !seen.insert(group.canonical_name.to_lowercase()) {
            return Err(LedgerError::InvalidGroupOperation(format!(
                "two players are named '{}'; rename or merge them first",
                group.canonical_name
            )));
        }
    }

    let positions = net_positions(grouping.groups(), meta.denomination)?;
    if let Err(e) = check_balanced(&positions, tolerance) {
        if !allow_unbalanced {
            return Err(e);
        }
        log::warn!("saving '{}' anyway: {e}", meta.name);
    }

    let players = grouping
        .groups()
        .iter()
        .map(|g| LedgerPlayer {
            name: g.canonical_name.clone(),
            aliases: g.members.iter().cloned().collect(),
            buy_in: g.totals.buy_in,
            cash_out: g.totals.combined,
        })
        .collect();

    Ok(Ledger {
        id: None,
        name: meta.name,
        date: meta.date,
        denomination: meta.denomination,
        source_file: meta.source_file,
        checksum: meta.checksum,
        players,
        transactions: settle(&positions),
    })
}
