//! Asynchrony drivers: CDFs of the delays the simulator injected.

use super::{export_cdf, to_samples, CdfExport, ASYNC_CDF_PRECISION};
use crate::model::{AsyncView, OutputRecord, ASYNC_FAMILIES};
use crate::parse;
use crate::stats::{self, DEFAULT_CDF_PRECISION};
use anyhow::Result;
use std::path::Path;

const ASYNC_DATA_DIR: &str = "async-plot/data";
const ASYNC_CAPTION: &str = "Asynchrony";

/// One CDF per asynchrony family for the chosen view.
pub(crate) fn run_async_cdfs(root: &Path, view: AsyncView) -> Result<Vec<OutputRecord>> {
    let data_dir = root.join(ASYNC_DATA_DIR);
    let out_dir = data_dir.join(view.out_dir());

    ASYNC_FAMILIES
        .iter()
        .map(|name| {
            let input = data_dir.join("original").join(format!("{name}.dat"));
            let reader = parse::open_input(&input)?;

            // only the per-process views need the process column
            let samples: Vec<f64> = match view {
                AsyncView::Cdf | AsyncView::Values | AsyncView::Precision => {
                    to_samples(&parse::parse_first_column(reader, &input.display())?)
                }
                AsyncView::Process { id } => {
                    let records = parse::parse_async(reader, &input.display())?;
                    let times: Vec<i64> = records
                        .iter()
                        .filter(|r| r.process == id)
                        .map(|r| r.time)
                        .collect();
                    log::debug!(
                        "{name}: {} of {} samples from process {id}",
                        times.len(),
                        records.len()
                    );
                    to_samples(&times)
                }
                AsyncView::Delta => {
                    let records = parse::parse_async(reader, &input.display())?;
                    stats::deltas_by_key(records.iter().map(|r| (r.process, r.time as f64)))
                }
            };

            let file_name = match view {
                AsyncView::Process { id } => format!("{name}{id}.dat"),
                _ => format!("{name}.dat"),
            };
            let precision = match view {
                AsyncView::Precision => DEFAULT_CDF_PRECISION,
                _ => ASYNC_CDF_PRECISION,
            };

            export_cdf(
                CdfExport {
                    name,
                    input: Some(&input),
                    output: out_dir.join(file_name),
                    caption: ASYNC_CAPTION,
                    precision,
                },
                &samples,
            )
        })
        .collect()
}
