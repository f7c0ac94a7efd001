//! The `.rat` flat file: one `price,amount` record per line, no header.

use crate::errors::RatError;
use crate::models::{ListingQuery, OrderRecord};
use chrono::{DateTime, TimeZone};
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

/// How to treat a line that is not a valid `price,amount` record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Drop the line and keep going.
    #[default]
    Lenient,
    /// Stop at the first bad line.
    Strict,
}

/// Reads every record from `reader`. Blank lines are ignored under both policies;
/// a line that is not UTF-8 counts as malformed.
pub fn parse<R: BufRead>(reader: R, policy: ParsePolicy) -> Result<Vec<OrderRecord>, RatError> {
    let mut records = Vec::new();

    for (idx, raw) in reader.split(b'\n').enumerate() {
        let raw = raw?;
        let parsed = match std::str::from_utf8(&raw) {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                parse_line(text)
            }
            Err(e) => Err(format!("not valid UTF-8: {e}")),
        };

        match parsed {
            Ok(record) => records.push(record),
            Err(reason) => match policy {
                ParsePolicy::Lenient => {
                    tracing::debug!("skipping line {}: {reason}", idx + 1);
                }
                ParsePolicy::Strict => {
                    return Err(RatError::Malformed {
                        line: idx + 1,
                        reason,
                    });
                }
            },
        }
    }

    Ok(records)
}

fn parse_line(line: &str) -> Result<OrderRecord, String> {
    let mut fields = line.split(',');
    let (Some(price_str), Some(amount_str), None) = (fields.next(), fields.next(), fields.next())
    else {
        return Err(format!("expected 2 fields in {line:?}"));
    };

    let price = price_str
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid price {price_str:?}: {e}"))?;
    let amount = amount_str
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid amount {amount_str:?}: {e}"))?;

    OrderRecord::new(price, amount)
        .ok_or_else(|| format!("price must be > 0 and amount >= 0, got {price},{amount}"))
}

/// Writes one `price,amount` line per record. `{:?}` keeps floats in
/// shortest round-trip form with a fractional part (`1.0`, not `1`).
pub fn write<W: Write>(mut writer: W, records: &[OrderRecord]) -> std::io::Result<()> {
    for record in records {
        writeln!(writer, "{:?},{:?}", record.price, record.amount)?;
    }
    writer.flush()
}

pub fn write_file(path: &Path, records: &[OrderRecord]) -> Result<(), RatError> {
    let file = File::create(path)?;
    write(BufWriter::new(file), records)?;
    Ok(())
}

/// `{FIAT}_{ASSET}_{YYYYMMDDHHMM}_{BUY|SELL}.rat`
pub fn file_name<Tz>(query: &ListingQuery, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}_{}_{}.rat",
        query.fiat,
        query.asset,
        at.format("%Y%m%d%H%M"),
        query.side
    )
}

/// Saves `records` under `dir` using the conventional file name and returns the path.
pub fn save<Tz>(
    dir: &Path,
    query: &ListingQuery,
    at: &DateTime<Tz>,
    records: &[OrderRecord],
) -> Result<PathBuf, RatError>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let path = dir.join(file_name(query, at));
    write_file(&path, records)?;
    Ok(path)
}
