//! Churn drivers: running total of live processes over simulated time.

use crate::metrics;
use crate::model::{ChurnRecord, OutputRecord, ProcessId};
use crate::parse;
use crate::stats;
use crate::storage::{self, Column, GnuplotTable};
use anyhow::Result;
use std::path::{Path, PathBuf};

const CHURN_DIR: &str = "churn-plot";
const CHURN_CAPTION: &str = "Churn";

fn read_churn(root: &Path) -> Result<(PathBuf, Vec<ChurnRecord>)> {
    let input = root.join(CHURN_DIR).join("churn.dat");
    let records = parse::parse_churn(parse::open_input(&input)?, &input.display())?;
    Ok((input, records))
}

/// Prefix-sum the second column and export `time, total` rows.
fn export_running_total(
    input: PathBuf,
    output: PathBuf,
    name: &str,
    points: Vec<(i64, i64)>,
) -> Result<OutputRecord> {
    let (times, mut totals): (Vec<i64>, Vec<i64>) = points.into_iter().unzip();
    stats::cumulative(&mut totals);

    let series: Vec<(f64, f64)> = times
        .iter()
        .zip(&totals)
        .map(|(t, v)| (*t as f64, *v as f64))
        .collect();
    let table = GnuplotTable::new(CHURN_CAPTION, vec![Column::Int(times), Column::Int(totals)]);
    let rows = storage::export_gnuplot(&output, &table)?;
    log::info!("{name}: {} events -> {}", rows, output.display());

    Ok(OutputRecord {
        name: name.to_string(),
        input: Some(input),
        output,
        caption: CHURN_CAPTION.to_string(),
        rows,
        summary: metrics::compute_series_metrics(&series),
        percentiles: Vec::new(),
    })
}

/// Live process count after every churn event.
pub(crate) fn run_churn(root: &Path) -> Result<OutputRecord> {
    let (input, records) = read_churn(root)?;
    let points = records.iter().map(|r| (r.time, r.net_change())).collect();
    export_running_total(
        input,
        root.join(CHURN_DIR).join("churn-transformed.dat"),
        "churn",
        points,
    )
}

/// Churn as seen by process `id`: only the events it took part in.
pub(crate) fn run_churn_for_process(root: &Path, id: ProcessId) -> Result<OutputRecord> {
    let (input, records) = read_churn(root)?;
    let points: Vec<(i64, i64)> = records
        .iter()
        .filter(|r| r.participants.contains(&id))
        .map(|r| (r.time, r.delta))
        .collect();
    log::debug!(
        "process {id} took part in {} of {} churn events",
        points.len(),
        records.len()
    );
    export_running_total(
        input,
        root.join(CHURN_DIR).join("churn-transformed-process_perspective.dat"),
        "churn-process",
        points,
    )
}
