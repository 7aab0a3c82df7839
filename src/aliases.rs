use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{LedgerError, Result};
use crate::models::{AliasGroup, AliasSummary, RawRow, Totals};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.70;

/// Names at or below this length only match when equal ignoring case.
const SHORT_NAME_LEN: usize = 3;

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Sum every row into a per-nickname summary, keyed by the trimmed nickname.
pub fn aggregate(rows: &[RawRow]) -> HashMap<String, AliasSummary> {
    let mut summaries: HashMap<String, AliasSummary> = HashMap::new();
    for row in rows {
        let nickname = row.player_nickname.trim();
        if nickname.is_empty() {
            continue;
        }
        let entry = summaries.entry(nickname.to_string()).or_default();
        entry.buy_in += row.buy_in;
        entry.buy_out += row.buy_out;
        entry.stack += row.stack;
        entry.combined = entry.buy_out + entry.stack;
    }
    summaries
}

// ---------------------------------------------------------------------------
// Similarity
// ---------------------------------------------------------------------------

fn alpha_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\p{Alphabetic}+").expect("static pattern"))
}

/// Leading run of letters, lower-cased: "Mike23" -> "mike", "J_Smith" -> "j".
pub fn base_name(nickname: &str) -> String {
    alpha_run()
        .find(nickname)
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_default()
}

fn bigrams(s: &str) -> HashMap<(char, char), usize> {
    let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
    let mut counts = HashMap::new();
    for pair in chars.windows(2) {
        *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
    }
    counts
}

/// Dice coefficient over character bigrams, in [0, 1].
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_clean: String = a.chars().filter(|c| !c.is_whitespace()).collect();
    let b_clean: String = b.chars().filter(|c| !c.is_whitespace()).collect();
    if a_clean == b_clean {
        return 1.0;
    }
    if a_clean.chars().count() < 2 || b_clean.chars().count() < 2 {
        return 0.0;
    }

    let a_pairs = bigrams(&a_clean);
    let mut b_pairs = bigrams(&b_clean);
    let a_total: usize = a_pairs.values().sum();
    let b_total: usize = b_pairs.values().sum();

    let mut shared = 0usize;
    for (pair, count) in &a_pairs {
        if let Some(other) = b_pairs.get_mut(pair) {
            let overlap = (*count).min(*other);
            shared += overlap;
            *other -= overlap;
        }
    }
    (2.0 * shared as f64) / (a_total + b_total) as f64
}

pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    let base_a = base_name(a);
    if !base_a.is_empty() && base_a == base_name(b) {
        return true;
    }
    let (lower_a, lower_b) = (a.to_lowercase(), b.to_lowercase());
    if a.chars().count() <= SHORT_NAME_LEN && b.chars().count() <= SHORT_NAME_LEN {
        return lower_a == lower_b;
    }
    similarity(&lower_a, &lower_b) >= threshold
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

fn totals_for<'a>(
    members: impl IntoIterator<Item = &'a String>,
    summaries: &HashMap<String, AliasSummary>,
) -> Totals {
    let mut totals = Totals::default();
    for member in members {
        if let Some(summary) = summaries.get(member) {
            totals.add(summary);
        }
    }
    totals
}

/// Seed-based clustering: every candidate is compared with the group's
/// seed only, never with members added after it.
pub fn group_nicknames(
    nicknames: &[String],
    summaries: &HashMap<String, AliasSummary>,
    threshold: f64,
) -> Vec<AliasGroup> {
    let sorted: Vec<&String> = nicknames.iter().collect::<BTreeSet<_>>().into_iter().collect();
    let mut assigned = vec![false; sorted.len()];
    let mut groups = Vec::new();

    for i in 0..sorted.len() {
        if assigned[i] {
            continue;
        }
        assigned[i] = true;
        let seed = sorted[i];
        let mut members = BTreeSet::from([seed.clone()]);

        for j in (i + 1)..sorted.len() {
            if !assigned[j] && is_similar(seed, sorted[j], threshold) {
                assigned[j] = true;
                members.insert(sorted[j].clone());
            }
        }

        if members.len() > 1 {
            log::debug!("grouped {members:?} under {seed}");
        }
        let totals = totals_for(&members, summaries);
        groups.push(AliasGroup {
            members,
            canonical_name: seed.clone(),
            totals,
        });
    }
    groups
}

/// User edit applied to a grouping, parsed from `rename:IDX:NAME`,
/// `split:IDX:NICK` or `merge:SRC:DST`.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupEdit {
    Rename { index: usize, name: String },
    Split { index: usize, nickname: String },
    Merge { source: usize, destination: usize },
}

impl FromStr for GroupEdit {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || LedgerError::InvalidEdit(s.to_string());
        let mut parts = s.splitn(3, ':');
        let op = parts.next().unwrap_or("").trim().to_lowercase();
        let index: usize = parts
            .next()
            .and_then(|v| v.trim().parse().ok())
            .ok_or_else(invalid)?;
        let arg = parts.next().ok_or_else(invalid)?;

        match op.as_str() {
            "rename" => Ok(Self::Rename {
                index,
                name: arg.to_string(),
            }),
            "split" => Ok(Self::Split {
                index,
                nickname: arg.to_string(),
            }),
            "merge" => Ok(Self::Merge {
                source: index,
                destination: arg.trim().parse().map_err(|_| invalid())?,
            }),
            _ => Err(invalid()),
        }
    }
}

/// The alias groups for one session, plus the per-nickname summaries they
/// are totalled from. Edits never mutate in place; each returns a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping {
    groups: Vec<AliasGroup>,
    summaries: HashMap<String, AliasSummary>,
}

impl Grouping {
    pub fn from_rows(rows: &[RawRow], threshold: f64) -> Self {
        let summaries = aggregate(rows);
        let nicknames: Vec<String> = summaries.keys().cloned().collect();
        let groups = group_nicknames(&nicknames, &summaries, threshold);
        log::info!(
            "{} nicknames resolved into {} players",
            nicknames.len(),
            groups.len()
        );
        Self { groups, summaries }
    }

    pub fn groups(&self) -> &[AliasGroup] {
        &self.groups
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.groups.len() {
            return Err(LedgerError::InvalidGroupOperation(format!(
                "group {index} does not exist ({} groups)",
                self.groups.len()
            )));
        }
        Ok(())
    }

    pub fn rename_canonical(&self, index: usize, new_name: &str) -> Result<Self> {
        self.check_index(index)?;
        let name = new_name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidGroupOperation(
                "canonical name cannot be empty".to_string(),
            ));
        }
        let mut next = self.clone();
        next.groups[index].canonical_name = name.to_string();
        Ok(next)
    }

    pub fn split_member(&self, index: usize, nickname: &str) -> Result<Self> {
        self.check_index(index)?;
        let group = &self.groups[index];
        if !group.members.contains(nickname) {
            return Err(LedgerError::InvalidGroupOperation(format!(
                "'{nickname}' is not in group {index}"
            )));
        }
        if group.members.len() == 1 {
            return Err(LedgerError::InvalidGroupOperation(format!(
                "group {index} has a single member"
            )));
        }

        let mut next = self.clone();
        let source = &mut next.groups[index];
        source.members.remove(nickname);
        source.totals = totals_for(&source.members, &self.summaries);
        if source.members.len() == 1 || source.canonical_name == nickname {
            if let Some(first) = source.members.iter().next() {
                source.canonical_name = first.clone();
            }
        }

        let members = BTreeSet::from([nickname.to_string()]);
        let totals = totals_for(&members, &self.summaries);
        next.groups.push(AliasGroup {
            members,
            canonical_name: nickname.to_string(),
            totals,
        });
        Ok(next)
    }

    /// Fold `source` into `destination`, keeping the destination's name.
    pub fn merge_groups(&self, source: usize, destination: usize) -> Result<Self> {
        self.check_index(source)?;
        self.check_index(destination)?;
        if source == destination {
            return Ok(self.clone());
        }

        let mut next = self.clone();
        let moved = next.groups.remove(source);
        let dest_index = if source < destination {
            destination - 1
        } else {
            destination
        };
        let dest = &mut next.groups[dest_index];
        dest.members.extend(moved.members);
        dest.totals = totals_for(&dest.members, &self.summaries);
        Ok(next)
    }

    pub fn apply(&self, edit: &GroupEdit) -> Result<Self> {
        match edit {
            GroupEdit::Rename { index, name } => self.rename_canonical(*index, name),
            GroupEdit::Split { index, nickname } => self.split_member(*index, nickname),
            GroupEdit::Merge {
                source,
                destination,
            } => self.merge_groups(*source, *destination),
        }
    }
}
