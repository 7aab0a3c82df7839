use crate::error::{LedgerError, Result};
use crate::fmt::hundredths;
use crate::models::{AliasGroup, Denomination, NetPosition, Transaction};

/// Largest net position accepted, in hundredths. Every value up to it is
/// exact in an `f64`.
pub const MAX_NET: i64 = 1 << 53;

/// Convert confirmed groups into net positions, in hundredths of the
/// display unit. Rounding happens here, once per player.
pub fn net_positions(groups: &[AliasGroup], denomination: Denomination) -> Result<Vec<NetPosition>> {
    groups
        .iter()
        .map(|g| {
            let net = (g.totals.net() / denomination.scale() * 100.0).round();
            if !net.is_finite() || net.abs() > MAX_NET as f64 {
                return Err(LedgerError::AmountOutOfRange(g.canonical_name.clone()));
            }
            Ok(NetPosition {
                name: g.canonical_name.clone(),
                net: net as i64,
            })
        })
        .collect()
}

/// Sum of all nets; zero when chips are conserved.
pub fn imbalance(positions: &[NetPosition]) -> Result<i64> {
    positions.iter().try_fold(0i64, |acc, p| {
        acc.checked_add(p.net)
            .ok_or_else(|| LedgerError::AmountOutOfRange(p.name.clone()))
    })
}

pub fn check_balanced(positions: &[NetPosition], tolerance: i64) -> Result<()> {
    let off = imbalance(positions)?;
    if off.unsigned_abs() > tolerance.unsigned_abs() {
        return Err(LedgerError::Unbalanced {
            imbalance: hundredths(off),
        });
    }
    Ok(())
}

/// Greedy settle-up: the largest debtor pays the largest creditor until one
/// side runs out. Emits at most `creditors + debtors - 1` transfers.
///
/// Stable sorts keep ties in input order. Any residue left when the input
/// does not balance is dropped; use [`check_balanced`] first when that
/// matters.
pub fn settle(positions: &[NetPosition]) -> Vec<Transaction> {
    let mut creditors: Vec<(&str, i64)> = positions
        .iter()
        .filter(|p| p.net > 0)
        .map(|p| (p.name.as_str(), p.net))
        .collect();
    let mut debtors: Vec<(&str, i64)> = positions
        .iter()
        .filter(|p| p.net < 0)
        .map(|p| (p.name.as_str(), p.net))
        .collect();
    creditors.sort_by(|a, b| b.1.cmp(&a.1));
    debtors.sort_by(|a, b| a.1.cmp(&b.1));

    let mut transactions = Vec::new();
    let (mut d, mut c) = (0usize, 0usize);
    while d < debtors.len() && c < creditors.len() {
        // never above the creditor's balance, so it fits back in an i64
        let transfer = (creditors[c].1 as u64).min(debtors[d].1.unsigned_abs()) as i64;
        log::debug!("{} pays {} {}", debtors[d].0, creditors[c].0, hundredths(transfer));
        transactions.push(Transaction {
            from: debtors[d].0.to_string(),
            to: creditors[c].0.to_string(),
            amount: hundredths(transfer),
        });
        debtors[d].1 += transfer;
        creditors[c].1 -= transfer;
        if debtors[d].1 == 0 {
            d += 1;
        }
        if creditors[c].1 == 0 {
            c += 1;
        }
    }

    if d < debtors.len() || c < creditors.len() {
        let residue: i64 = debtors[d..]
            .iter()
            .chain(&creditors[c..])
            .fold(0i64, |acc, (_, net)| acc.saturating_add(*net));
        log::warn!("settlement left {} unmatched", hundredths(residue));
    }
    transactions
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::models::Totals;

    fn pos(name: &str, net: i64) -> NetPosition {
        NetPosition {
            name: name.to_string(),
            net,
        }
    }

    fn cents(amount: &str) -> i64 {
        let (whole, frac) = amount.split_once('.').unwrap();
        whole.parse::<i64>().unwrap() * 100 + frac.parse::<i64>().unwrap()
    }

    fn txn(from: &str, to: &str, amount: &str) -> Transaction {
        Transaction {
            from: from.to_string(),
            to: to.to_string(),
            amount: amount.to_string(),
        }
    }

    #[test]
    fn test_settle_example() {
        let positions = vec![pos("A", 3000), pos("B", -1000), pos("C", -2000)];
        assert_eq!(
            settle(&positions),
            vec![txn("C", "A", "20.00"), txn("B", "A", "10.00")]
        );
    }

    #[test]
    fn test_settle_zero_sum_per_party() {
        let positions = vec![
            pos("Ann", 4550),
            pos("Ben", -1275),
            pos("Cat", 1200),
            pos("Dan", -3000),
            pos("Eve", 0),
            pos("Fay", -1475),
        ];
        let txns = settle(&positions);
        let mut flows: HashMap<&str, i64> = HashMap::new();
        for t in &txns {
            *flows.entry(t.from.as_str()).or_default() -= cents(&t.amount);
            *flows.entry(t.to.as_str()).or_default() += cents(&t.amount);
        }
        for p in &positions {
            assert_eq!(flows.get(p.name.as_str()).copied().unwrap_or(0), p.net, "{}", p.name);
        }
        assert!(txns.iter().all(|t| t.from != "Eve" && t.to != "Eve"));
    }

    #[test]
    fn test_settle_transaction_bound() {
        let positions = vec![
            pos("A", 100),
            pos("B", 200),
            pos("C", 300),
            pos("D", -150),
            pos("E", -150),
            pos("F", -300),
        ];
        let txns = settle(&positions);
        assert!(txns.len() <= positions.len() - 1);
    }

    #[test]
    fn test_settle_is_deterministic_with_ties() {
        let positions = vec![
            pos("A", 500),
            pos("B", 500),
            pos("C", -500),
            pos("D", -500),
        ];
        let first = settle(&positions);
        assert_eq!(first, settle(&positions));
        assert_eq!(first, vec![txn("C", "A", "5.00"), txn("D", "B", "5.00")]);
    }

    #[test]
    fn test_settle_empty() {
        assert!(settle(&[]).is_empty());
    }

    #[test]
    fn test_settle_unbalanced_drops_residue() {
        let txns = settle(&[pos("A", 1000), pos("B", -400)]);
        assert_eq!(txns, vec![txn("B", "A", "4.00")]);
        assert!(settle(&[pos("Lonely", 250)]).is_empty());
    }

    #[test]
    fn test_check_balanced() {
        assert!(check_balanced(&[pos("A", 100), pos("B", -100)], 1).is_ok());
        assert!(check_balanced(&[pos("A", 101), pos("B", -100)], 1).is_ok());
        let err = check_balanced(&[pos("A", 1000), pos("B", -400)], 1).err().unwrap();
        match err {
            LedgerError::Unbalanced { imbalance } => assert_eq!(imbalance, "6.00"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_net_positions_scale_denomination() {
        let group = |name: &str, buy_in: f64, combined: f64| AliasGroup {
            members: [name.to_string()].into_iter().collect(),
            canonical_name: name.to_string(),
            totals: Totals {
                buy_in,
                buy_out: combined,
                stack: 0.0,
                combined,
            },
        };
        let groups = vec![group("A", 2000.0, 3550.0), group("B", 2000.0, 450.0)];
        assert_eq!(
            net_positions(&groups, Denomination::Cents).unwrap(),
            vec![pos("A", 1550), pos("B", -1550)]
        );
        assert_eq!(
            net_positions(&groups, Denomination::Dollars).unwrap(),
            vec![pos("A", 155000), pos("B", -155000)]
        );
    }

    #[test]
    fn test_net_positions_round_float_drift() {
        let groups = vec![AliasGroup {
            members: ["A".to_string()].into_iter().collect(),
            canonical_name: "A".to_string(),
            totals: Totals {
                buy_in: 0.1 + 0.2,
                buy_out: 0.0,
                stack: 0.3,
                combined: 0.3,
            },
        }];
        assert_eq!(net_positions(&groups, Denomination::Dollars).unwrap()[0].net, 0);
    }

    #[test]
    fn test_net_positions_reject_huge_amounts() {
        let groups = vec![AliasGroup {
            members: ["Ann".to_string()].into_iter().collect(),
            canonical_name: "Ann".to_string(),
            totals: Totals {
                buy_in: 1e17,
                buy_out: 0.0,
                stack: 0.0,
                combined: 0.0,
            },
        }];
        match net_positions(&groups, Denomination::Dollars) {
            Err(LedgerError::AmountOutOfRange(name)) => assert_eq!(name, "Ann"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(net_positions(&groups, Denomination::Cents).is_err());
        let mut small = groups.clone();
        small[0].totals.buy_in = 1e12;
        assert_eq!(
            net_positions(&small, Denomination::Cents).unwrap()[0].net,
            -1_000_000_000_000
        );
    }

    #[test]
    fn test_imbalance_overflow_is_an_error() {
        assert_eq!(imbalance(&[pos("A", 300), pos("B", -100)]).unwrap(), 200);
        let err = imbalance(&[pos("A", i64::MAX), pos("B", 1)]).err().unwrap();
        assert!(matches!(err, LedgerError::AmountOutOfRange(_)));
        assert!(check_balanced(&[pos("A", i64::MAX), pos("B", i64::MAX)], 1).is_err());
    }

    #[test]
    fn test_settle_extreme_positions_do_not_overflow() {
        let txns = settle(&[pos("Zed", i64::MAX), pos("Ann", i64::MIN)]);
        assert_eq!(txns, vec![txn("Ann", "Zed", &hundredths(i64::MAX))]);

        let txns = settle(&[pos("A", i64::MAX / 2), pos("B", i64::MAX / 2), pos("C", i64::MIN)]);
        assert_eq!(txns.len(), 2);
        assert!(txns.iter().all(|t| !t.amount.starts_with('-')));
    }
}
