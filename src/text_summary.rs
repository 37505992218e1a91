//! Text summary builder for CLI output.
//!
//! This module formats human-readable lines for text mode.

use crate::model::{OutputRecord, RunResult};
use crate::stats::PercentileEntry;

/// Pre-formatted lines for text output.
pub struct TextSummary {
    pub lines: Vec<String>,
}

fn output_lines(out: &OutputRecord, lines: &mut Vec<String>) {
    lines.push(format!(
        "{}: {} rows -> {}",
        out.name,
        out.rows,
        out.output.display()
    ));
    match out.summary.as_ref() {
        Some(s) => lines.push(format!(
            "  n {} min {:.2} avg {:.2} med {:.2} p25 {:.2} p75 {:.2} max {:.2}",
            s.count, s.min, s.mean, s.median, s.p25, s.p75, s.max
        )),
        None => lines.push("  no samples".to_string()),
    }
    if !out.percentiles.is_empty() {
        let cells: Vec<String> = out
            .percentiles
            .iter()
            .map(|e| match e {
                PercentileEntry::Paired { percentile, value } => format!("p{percentile}={value}"),
                PercentileEntry::Bare(value) => value.to_string(),
            })
            .collect();
        lines.push(format!("  {}", cells.join(" ")));
    }
}

/// Build a text summary from a finished run.
pub fn build_text_summary(result: &RunResult) -> TextSummary {
    let mut lines = vec![format!(
        "{} ({})",
        result.dataset.label(),
        result.root.display()
    )];
    if let Some(median) = result.median_latency {
        lines.push(format!("Median link latency: {median} ms"));
    }
    for out in &result.outputs {
        output_lines(out, &mut lines);
    }
    TextSummary { lines }
}
