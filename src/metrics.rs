use crate::model::SampleSummary;
use crate::stats::{self, MeanInput};

/// Compute summary metrics (count, min, mean, median, 25th percentile, 75th percentile, max) from samples
pub fn compute_metrics(samples: &[f64]) -> Option<SampleSummary> {
    if samples.is_empty() {
        return None;
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let at = |p: f64| stats::score_at_percentile(&sorted, p, None, true);
    Some(SampleSummary {
        count: sorted.len(),
        min: at(0.0)?,
        mean: stats::mean(MeanInput::Series(samples)),
        median: at(50.0)?,
        p25: at(25.0)?,
        p75: at(75.0)?,
        max: at(100.0)?,
    })
}

/// Compute summary metrics from paired points (x, y), using only the y-values
pub fn compute_series_metrics(points: &[(f64, f64)]) -> Option<SampleSummary> {
    let values: Vec<f64> = points.iter().map(|(_, y)| *y).collect();
    compute_metrics(&values)
}
