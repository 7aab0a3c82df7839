use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::{LedgerError, Result};
use crate::models::RawRow;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a money cell such as `1,234.56`, `$15` or `(20.00)`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| -v);
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

fn normalize_header(raw: &str) -> String {
    raw.trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

const NICKNAME_HEADERS: &[&str] = &["playernickname", "nickname", "player", "name"];
const BUY_IN_HEADERS: &[&str] = &["buyin"];
const BUY_OUT_HEADERS: &[&str] = &["buyout", "cashout"];
const STACK_HEADERS: &[&str] = &["stack"];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Columns {
    nickname: usize,
    buy_in: Option<usize>,
    buy_out: Option<usize>,
    stack: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
        let find = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| normalized.iter().position(|h| h == name))
        };

        let nickname = find(NICKNAME_HEADERS)
            .ok_or_else(|| LedgerError::MissingColumn("player_nickname".to_string()))?;
        let buy_in = find(BUY_IN_HEADERS);
        let buy_out = find(BUY_OUT_HEADERS);
        if buy_in.is_none() && buy_out.is_none() {
            return Err(LedgerError::MissingColumn("buy_in / buy_out".to_string()));
        }
        Ok(Self {
            nickname,
            buy_in,
            buy_out,
            stack: find(STACK_HEADERS),
        })
    }
}

// ---------------------------------------------------------------------------
// Session parsing
// ---------------------------------------------------------------------------

pub struct ParsedSession {
    pub rows: Vec<RawRow>,
    /// Non-empty money cells that could not be parsed and were read as 0.
    pub defaulted: usize,
}

pub fn parse_session_csv(file_path: &Path) -> Result<ParsedSession> {
    let file = std::fs::File::open(file_path)?;
    parse_session_reader(std::io::BufReader::new(file), &file_path.display().to_string())
}

pub fn parse_session_reader<R: Read>(reader: R, source: &str) -> Result<ParsedSession> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let columns = Columns::locate(rdr.headers()?)?;

    let mut rows = Vec::new();
    let mut defaulted = 0usize;

    for (line, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("{source}: skipping unreadable record {}: {e}", line + 2);
                continue;
            }
        };
        let nickname = record.get(columns.nickname).unwrap_or("").trim();
        if nickname.is_empty() {
            continue;
        }

        let mut field = |idx: Option<usize>, label: &str| -> f64 {
            let raw = idx.and_then(|i| record.get(i)).unwrap_or("").trim();
            if raw.is_empty() {
                return 0.0;
            }
            parse_amount(raw).unwrap_or_else(|| {
                log::warn!("{source}: {label} '{raw}' for {nickname} is not a number, using 0");
                defaulted += 1;
                0.0
            })
        };

        let buy_in = field(columns.buy_in, "buy_in");
        let buy_out = field(columns.buy_out, "buy_out");
        let stack = field(columns.stack, "stack");
        rows.push(RawRow {
            player_nickname: nickname.to_string(),
            buy_in,
            buy_out,
            stack,
        });
    }

    if rows.is_empty() {
        return Err(LedgerError::EmptySession(source.to_string()));
    }
    log::info!("{source}: parsed {} rows ({defaulted} defaulted fields)", rows.len());
    Ok(ParsedSession { rows, defaulted })
}
