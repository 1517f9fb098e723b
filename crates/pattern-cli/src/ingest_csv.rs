//! Minimal `--local` bar loader. Full CSV/API ingestion is explicitly out
//! of scope (spec.md §1); this is the thin concrete adapter the CLI needs
//! to hand a bar series to [`pattern_search::BarIngest`] for local demo and
//! test runs, not a general-purpose data-ingestion subsystem.

use std::path::Path;

use chrono::{DateTime, Utc};
use pattern_core::{Bar, PatternError, PatternResult};
use pattern_search::BarIngest;
use rust_decimal::Decimal;

/// Reads a CSV file of `timestamp,open,high,low,close,volume` rows
/// (RFC3339 timestamps) in ascending time order, rejecting any row that
/// violates ordering via [`BarIngest`] (spec.md §6 `DataOrderError`).
pub fn load_csv(path: &Path) -> PatternResult<Vec<Bar>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| PatternError::DataRange(format!("reading {}: {e}", path.display())))?;

    let mut ingest = BarIngest::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let bar = parse_row(line).map_err(|e| {
            PatternError::DataRange(format!("{}:{}: {e}", path.display(), line_no + 1))
        })?;
        ingest.push(bar)?;
    }
    Ok(ingest.into_bars())
}

fn parse_row(line: &str) -> Result<Bar, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 6 {
        return Err(format!("expected 6 columns, got {}", fields.len()));
    }
    let t: DateTime<Utc> = fields[0]
        .parse()
        .map_err(|e| format!("bad timestamp {}: {e}", fields[0]))?;
    let parse_dec = |s: &str| -> Result<Decimal, String> {
        s.parse().map_err(|e| format!("bad decimal {s}: {e}"))
    };
    Ok(Bar {
        t,
        o: parse_dec(fields[1])?,
        h: parse_dec(fields[2])?,
        l: parse_dec(fields[3])?,
        c: parse_dec(fields[4])?,
        v: fields[5]
            .parse()
            .map_err(|e| format!("bad volume {}: {e}", fields[5]))?,
    })
}
