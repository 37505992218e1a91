//! Line parsers for the simulator's log files.
//!
//! Every log is whitespace-separated text with one record per line. Blank
//! lines are skipped; anything else that does not parse aborts with the file
//! name and line number.

use crate::model::{AsyncRecord, ChurnKind, ChurnRecord, ProcessId};
use anyhow::{anyhow, Context, Result};
use std::collections::BTreeSet;
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Open a log for line-by-line reading.
pub fn open_input(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Parse field `idx` of a split line.
fn field<T>(fields: &[&str], idx: usize) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = fields
        .get(idx)
        .ok_or_else(|| anyhow!("expected at least {} fields, found {}", idx + 1, fields.len()))?;
    raw.parse::<T>()
        .with_context(|| format!("field {} ({raw:?}) is not a valid number", idx + 1))
}

/// Run `parse_line` over every non-blank line, attaching source and line
/// number to any failure.
fn parse_lines<R, T, F>(reader: R, source: &dyn Display, mut parse_line: F) -> Result<Vec<T>>
where
    R: BufRead,
    F: FnMut(&[&str]) -> Result<T>,
{
    let mut out = Vec::new();
    for (n, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read {source}"))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let record = parse_line(&fields).with_context(|| format!("{source}:{}", n + 1))?;
        out.push(record);
    }
    Ok(out)
}

/// Latency logs hold exactly one integer per line.
pub fn parse_latencies<R: BufRead>(reader: R, source: &dyn Display) -> Result<Vec<i64>> {
    parse_lines(reader, source, |fields| {
        if fields.len() != 1 {
            return Err(anyhow!("expected a single latency value, found {} fields", fields.len()));
        }
        field(fields, 0)
    })
}

/// First column of any log, as integers.
pub fn parse_first_column<R: BufRead>(reader: R, source: &dyn Display) -> Result<Vec<i64>> {
    parse_lines(reader, source, |fields| field(fields, 0))
}

/// Asynchrony logs: `time process`.
pub fn parse_async<R: BufRead>(reader: R, source: &dyn Display) -> Result<Vec<AsyncRecord>> {
    parse_lines(reader, source, |fields| {
        Ok(AsyncRecord {
            time: field(fields, 0)?,
            process: field(fields, 1)?,
        })
    })
}

/// Churn logs: `time kind delta count [id,id,..]`.
pub fn parse_churn<R: BufRead>(reader: R, source: &dyn Display) -> Result<Vec<ChurnRecord>> {
    parse_lines(reader, source, |fields| {
        let kind = fields
            .get(1)
            .ok_or_else(|| anyhow!("missing churn kind"))?
            .parse::<ChurnKind>()?;
        let participants = match fields.get(4) {
            Some(raw) => parse_id_set(raw)?,
            None => BTreeSet::new(),
        };
        Ok(ChurnRecord {
            time: field(fields, 0)?,
            kind,
            delta: field(fields, 2)?,
            count: field(fields, 3)?,
            participants,
        })
    })
}

/// Decode a list or set literal of process ids such as `[1,2,3]` or `{4, 5}`.
pub fn parse_id_set(raw: &str) -> Result<BTreeSet<ProcessId>> {
    let raw = raw.trim();
    if raw == "set()" {
        return Ok(BTreeSet::new());
    }
    let inner = match (raw.chars().next(), raw.chars().last()) {
        (Some('['), Some(']')) | (Some('{'), Some('}')) | (Some('('), Some(')')) => {
            &raw[1..raw.len() - 1]
        }
        _ => return Err(anyhow!("expected a bracketed id list, found {raw:?}")),
    };
    inner
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<ProcessId>()
                .with_context(|| format!("invalid process id {s:?} in {raw:?}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SRC: &str = "test.dat";

    #[test]
    fn latencies_one_per_line() {
        let v = parse_latencies("12\n7\n\n30\n".as_bytes(), &SRC).unwrap();
        assert_eq!(v, vec![12, 7, 30]);
    }

    #[test]
    fn latency_line_with_extra_field_fails() {
        let err = parse_latencies("12\n7 8\n".as_bytes(), &SRC).unwrap_err();
        assert!(format!("{err:#}").contains("test.dat:2"), "{err:#}");
    }

    #[test]
    fn non_numeric_token_fails() {
        let err = parse_first_column("1 2\nabc 3\n".as_bytes(), &SRC).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("test.dat:2"), "{msg}");
        assert!(msg.contains("abc"), "{msg}");
    }

    #[test]
    fn async_records() {
        let v = parse_async("10 1\n12 2\n".as_bytes(), &SRC).unwrap();
        assert_eq!(
            v,
            vec![
                AsyncRecord { time: 10, process: 1 },
                AsyncRecord { time: 12, process: 2 }
            ]
        );
        assert!(parse_async("10\n".as_bytes(), &SRC).is_err());
    }

    #[test]
    fn churn_records() {
        let v = parse_churn("100 join 1 3 [4,5,6]\n200 leave -1 2 [5,9]\n".as_bytes(), &SRC)
            .unwrap();
        assert_eq!(v.len(), 2);
        assert_eq!(v[0].kind, ChurnKind::Join);
        assert_eq!(v[0].net_change(), 3);
        assert_eq!(v[1].net_change(), -2);
        assert!(v[1].participants.contains(&9));
        assert!(!v[0].participants.contains(&9));
    }

    #[test]
    fn unknown_churn_kind_fails() {
        assert!(parse_churn("100 explode 1 3 [1]\n".as_bytes(), &SRC).is_err());
    }

    #[test]
    fn id_set_literals() {
        assert_eq!(parse_id_set("[1,2,3]").unwrap(), BTreeSet::from([1, 2, 3]));
        assert_eq!(parse_id_set("{4, 5}").unwrap(), BTreeSet::from([4, 5]));
        assert!(parse_id_set("[]").unwrap().is_empty());
        assert!(parse_id_set("set()").unwrap().is_empty());
        assert!(parse_id_set("1,2").is_err());
        assert!(parse_id_set("[1,x]").is_err());
    }
}
