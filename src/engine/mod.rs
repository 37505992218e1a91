mod asynchrony;
mod churn;
mod latency;

use crate::metrics;
use crate::model::{Dataset, OutputRecord, RunConfig, RunResult};
use crate::stats::{self, PercentileOptions};
use crate::storage::{self, Column, GnuplotTable};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Bucket count for the network latency CDFs.
pub const LATENCY_CDF_PRECISION: usize = 40;

/// Bucket count for the asynchrony CDFs.
pub const ASYNC_CDF_PRECISION: usize = 10;

pub struct Engine {
    cfg: RunConfig,
}

impl Engine {
    pub fn new(cfg: RunConfig) -> Self {
        Self { cfg }
    }

    /// Read the configured dataset, transform it and write the gnuplot files.
    pub fn run(&self) -> Result<RunResult> {
        let root = self.cfg.root.as_path();
        log::info!("{} run in {}", self.cfg.dataset.label(), root.display());

        let mut median_latency = None;
        let outputs = match &self.cfg.dataset {
            Dataset::Latency => latency::run_latency_cdfs(root)?,
            Dataset::Churn => vec![churn::run_churn(root)?],
            Dataset::ChurnProcess { id } => vec![churn::run_churn_for_process(root, *id)?],
            Dataset::Async(view) => asynchrony::run_async_cdfs(root, *view)?,
            Dataset::LatencyTable {
                input,
                nodes,
                default_latency,
                seed,
            } => {
                let (record, median) = latency::run_latency_table(
                    root,
                    latency::LatencyTableParams {
                        input: input.as_deref(),
                        nodes: *nodes,
                        default_latency: *default_latency,
                        seed: *seed,
                    },
                )?;
                median_latency = median;
                vec![record]
            }
            Dataset::Summary { input } => vec![run_summary(input)?],
            Dataset::Average { inputs, output } => vec![run_average(inputs, output)?],
        };

        Ok(RunResult {
            timestamp_utc: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_else(|_| "now".into()),
            dataset: self.cfg.dataset.clone(),
            root: self.cfg.root.clone(),
            outputs,
            median_latency,
        })
    }
}

/// Widen integer samples for the statistics routines.
pub(crate) fn to_samples(values: &[i64]) -> Vec<f64> {
    values.iter().map(|v| *v as f64).collect()
}

/// Parameters for exporting a CDF of one sample sequence.
pub(crate) struct CdfExport<'a> {
    pub name: &'a str,
    pub input: Option<&'a Path>,
    pub output: PathBuf,
    pub caption: &'a str,
    pub precision: usize,
}

/// Compute the CDF of `samples` and write its evaluation points next to the
/// normalized cumulative frequencies.
pub(crate) fn export_cdf(params: CdfExport<'_>, samples: &[f64]) -> Result<OutputRecord> {
    let CdfExport {
        name,
        input,
        output,
        caption,
        precision,
    } = params;

    if samples.is_empty() {
        log::warn!("{name}: no samples, writing an empty CDF");
    }
    let cdf = stats::compute_cdf(samples, precision);
    // one more evaluation point than buckets; rows stop at the last bucket
    let mut values = cdf.values.clone();
    values.truncate(cdf.freqs.len());
    let table = GnuplotTable::new(
        caption,
        vec![Column::Float(values), Column::Float(cdf.freqs_normalized().collect())],
    );
    let rows = storage::export_gnuplot(&output, &table)?;
    log::info!("{name}: {} samples -> {}", samples.len(), output.display());

    Ok(OutputRecord {
        name: name.to_string(),
        input: input.map(Path::to_path_buf),
        output,
        caption: caption.to_string(),
        rows,
        summary: metrics::compute_metrics(samples),
        percentiles: Vec::new(),
    })
}

/// Percentile table of the first column of any log, written next to it.
fn run_summary(input: &Path) -> Result<OutputRecord> {
    let reader = crate::parse::open_input(input)?;
    let samples = to_samples(&crate::parse::parse_first_column(reader, &input.display())?);
    let table = stats::percentiles(&samples, &PercentileOptions::default());

    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("{} has no file name", input.display()))?;
    let output = input.with_file_name(format!("{stem}-percentiles.dat"));
    let caption = format!("Percentiles of {stem}");

    let (percs, values): (Vec<f64>, Vec<f64>) = table
        .iter()
        .filter_map(|e| match e {
            stats::PercentileEntry::Paired { percentile, value } => Some((*percentile, *value)),
            stats::PercentileEntry::Bare(_) => None,
        })
        .unzip();
    let gnuplot = GnuplotTable::new(&caption, vec![Column::Float(percs), Column::Float(values)]);
    let rows = storage::export_gnuplot(&output, &gnuplot)?;
    log::info!("summary: {} samples -> {}", samples.len(), output.display());

    Ok(OutputRecord {
        name: stem.to_string(),
        input: Some(input.to_path_buf()),
        output,
        caption,
        rows,
        summary: metrics::compute_metrics(&samples),
        percentiles: table,
    })
}

/// Elementwise mean of the first column of several runs. Shorter runs are
/// left-padded with zeros; rows carry a 0-based index.
fn run_average(inputs: &[PathBuf], output: &Path) -> Result<OutputRecord> {
    let runs = inputs
        .iter()
        .map(|input| {
            let reader = crate::parse::open_input(input)?;
            Ok(to_samples(&crate::parse::parse_first_column(
                reader,
                &input.display(),
            )?))
        })
        .collect::<Result<Vec<_>>>()?;
    if runs.len() == 1 {
        log::info!("single run, nothing to average");
    }

    let averaged = stats::compute_average(&runs);
    let caption = format!("Average of {} runs", runs.len());
    let table = GnuplotTable::new(&caption, vec![Column::Float(averaged.clone())]).with_row_index();
    let rows = storage::export_gnuplot(output, &table)?;
    log::info!("average: {} runs -> {}", runs.len(), output.display());

    Ok(OutputRecord {
        name: "average".to_string(),
        input: inputs.first().cloned(),
        output: output.to_path_buf(),
        caption,
        rows,
        summary: metrics::compute_metrics(&averaged),
        percentiles: Vec::new(),
    })
}
