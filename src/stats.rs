//! Descriptive statistics over in-memory sample sequences.
//!
//! Everything here works on plain `f64` slices. Integer log values are widened
//! by the parsers before they reach this module.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// Percentiles reported when the caller does not ask for specific ones.
pub const DEFAULT_PERCENTILES: [f64; 9] = [0.0, 1.0, 5.0, 25.0, 50.0, 75.0, 95.0, 99.0, 100.0];

/// Bucket count used by [`compute_cdf`] callers that have no preference.
pub const DEFAULT_CDF_PRECISION: usize = 1000;

fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

fn interpolate(a: f64, b: f64, fraction: f64) -> f64 {
    a + (b - a) * fraction
}

/// Value at percentile `per` (0..=100) of `data`.
///
/// The continuous index is `per / 100 * (n - 1)`. An integral index returns
/// that order statistic exactly, anything else interpolates linearly between
/// the two bracketing order statistics. `limit` keeps only values inside the
/// inclusive `(low, high)` range before indexing.
///
/// Returns `None` when no samples remain.
pub fn score_at_percentile(
    data: &[f64],
    per: f64,
    limit: Option<(f64, f64)>,
    is_sorted: bool,
) -> Option<f64> {
    let owned;
    let mut values: &[f64] = if is_sorted {
        data
    } else {
        owned = sorted_copy(data);
        &owned
    };

    let filtered;
    if let Some((low, high)) = limit {
        filtered = values
            .iter()
            .copied()
            .filter(|v| low <= *v && *v <= high)
            .collect::<Vec<_>>();
        values = &filtered;
    }

    if values.is_empty() {
        return None;
    }

    let last = values.len() - 1;
    let idx = (per / 100.0 * last as f64).clamp(0.0, last as f64);
    let lower = idx.floor() as usize;
    let fraction = idx - idx.floor();

    if fraction == 0.0 || lower >= last {
        Some(values[lower])
    } else {
        Some(interpolate(values[lower], values[lower + 1], fraction))
    }
}

/// One row of a percentile table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PercentileEntry {
    Paired { percentile: f64, value: f64 },
    Bare(f64),
}

impl PercentileEntry {
    pub fn value(&self) -> f64 {
        match self {
            PercentileEntry::Paired { value, .. } => *value,
            PercentileEntry::Bare(value) => *value,
        }
    }
}

/// Options for [`percentiles`].
#[derive(Debug, Clone)]
pub struct PercentileOptions<'a> {
    pub percentiles: &'a [f64],
    pub paired: bool,
    pub round_places: Option<u32>,
}

impl Default for PercentileOptions<'_> {
    fn default() -> Self {
        Self {
            percentiles: &DEFAULT_PERCENTILES,
            paired: true,
            round_places: None,
        }
    }
}

fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Values of `data` at each requested percentile. Sorts once.
pub fn percentiles(data: &[f64], opts: &PercentileOptions<'_>) -> Vec<PercentileEntry> {
    let sorted = sorted_copy(data);
    if sorted.is_empty() {
        return Vec::new();
    }

    opts.percentiles
        .iter()
        .filter_map(|&p| {
            let mut score = score_at_percentile(&sorted, p, None, true)?;
            if let Some(places) = opts.round_places {
                score = round_to(score, places);
            }
            Some(if opts.paired {
                PercentileEntry::Paired {
                    percentile: p,
                    value: score,
                }
            } else {
                PercentileEntry::Bare(score)
            })
        })
        .collect()
}

/// Empirical CDF of a sample sequence.
///
/// `values[i]` is the score at percentile `i * 100 / precision`, `freqs` is
/// the cumulative histogram over `precision` bins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cdf {
    pub values: Vec<f64>,
    pub freqs: Vec<f64>,
    /// Number of samples the histogram was built from.
    pub total: usize,
}

impl Cdf {
    /// Cumulative frequencies divided by the sample count.
    ///
    /// The divisor is the number of samples, not the last cumulative count.
    pub fn freqs_normalized(&self) -> impl Iterator<Item = f64> + '_ {
        let total = self.total as f64;
        self.freqs.iter().map(move |f| f / total)
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Cumulative frequency histogram with `numbins` equal-width bins.
///
/// The range is widened by half a bin on each side of the data so the
/// extreme values sit in the middle of the first and last bins. Constant data
/// gets the range `[v - 0.5, v + 0.5]`.
pub fn cumulative_frequency(data: &[f64], numbins: usize) -> Vec<f64> {
    if data.is_empty() || numbins == 0 {
        return Vec::new();
    }

    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = if numbins > 1 {
        (max - min) / (2.0 * (numbins as f64 - 1.0))
    } else {
        0.0
    };
    let (mut low, mut high) = (min - spread, max + spread);
    if low == high {
        low -= 0.5;
        high += 0.5;
    }

    let step = (high - low) / numbins as f64;
    let mut edges: Vec<f64> = (0..=numbins).map(|i| low + i as f64 * step).collect();
    edges[numbins] = high;

    let norm = numbins as f64 / (high - low);
    let last = numbins - 1;
    let mut counts = vec![0.0; numbins];
    for &v in data {
        if v < low || v > high {
            continue;
        }
        // candidate bin, then settle it against the real edges: half-open
        // bins, the last one closed on the right
        let mut bin = (((v - low) * norm) as usize).min(last);
        if bin > 0 && v < edges[bin] {
            bin -= 1;
        } else if bin < last && v >= edges[bin + 1] {
            bin += 1;
        }
        counts[bin] += 1.0;
    }

    let mut running = 0.0;
    for c in counts.iter_mut() {
        running += *c;
        *c = running;
    }
    counts
}

/// Empirical CDF over `precision` buckets. Empty input yields an empty CDF.
pub fn compute_cdf(data: &[f64], precision: usize) -> Cdf {
    if data.is_empty() || precision == 0 {
        return Cdf::default();
    }

    let sorted = sorted_copy(data);
    let values = (0..=precision)
        .filter_map(|i| {
            let per = i as f64 * 100.0 / precision as f64;
            score_at_percentile(&sorted, per, None, true)
        })
        .collect();

    Cdf {
        values,
        freqs: cumulative_frequency(&sorted, precision),
        total: data.len(),
    }
}

/// Left-pads every series with `default` up to the longest length.
pub fn pad_to_same_size<T: Clone>(data: &[Vec<T>], default: T) -> Vec<Vec<T>> {
    let max_size = data.iter().map(Vec::len).max().unwrap_or(0);
    data.iter()
        .map(|series| {
            let mut padded = vec![default.clone(); max_size - series.len()];
            padded.extend(series.iter().cloned());
            padded
        })
        .collect()
}

/// Elementwise mean of series of different lengths.
///
/// Shorter series are left-padded with zeros. A single series comes back as
/// is.
pub fn compute_average(data: &[Vec<f64>]) -> Vec<f64> {
    match data {
        [] => Vec::new(),
        [single] => single.clone(),
        _ => {
            let padded = pad_to_same_size(data, 0.0);
            let runs = padded.len() as f64;
            let mut sums = vec![0.0; padded[0].len()];
            for series in &padded {
                for (acc, v) in sums.iter_mut().zip(series) {
                    *acc += v;
                }
            }
            sums.into_iter().map(|s| s / runs).collect()
        }
    }
}

/// Input to [`mean`]: either an already reduced value or a series.
#[derive(Debug, Clone, Copy)]
pub enum MeanInput<'a> {
    Scalar(f64),
    Series(&'a [f64]),
}

/// Arithmetic mean. An empty series averages to 0, a scalar is its own mean.
pub fn mean(input: MeanInput<'_>) -> f64 {
    match input {
        MeanInput::Scalar(v) => v,
        MeanInput::Series([]) => 0.0,
        MeanInput::Series(s) => s.iter().sum::<f64>() / s.len() as f64,
    }
}

/// Index of the first element not less than `value` in sorted `data`.
///
/// A query above every element maps to the last index.
pub fn closest_index(data: &[f64], value: f64) -> Option<usize> {
    if data.is_empty() {
        return None;
    }
    let idx = data.partition_point(|x| *x < value);
    Some(idx.min(data.len() - 1))
}

/// In-place prefix sum: every element from index 1 on becomes itself plus
/// all the elements before it.
pub fn cumulative<T>(values: &mut [T])
where
    T: Copy + std::ops::AddAssign,
{
    for i in 1..values.len() {
        let prev = values[i - 1];
        values[i] += prev;
    }
}

/// Groups `(key, value)` pairs by key and turns each group's values into
/// successive differences, keeping the first value of a group.
///
/// Groups are emitted in the order their key first appears.
pub fn deltas_by_key<K, I>(pairs: I) -> Vec<f64>
where
    K: Eq + Hash + Copy,
    I: IntoIterator<Item = (K, f64)>,
{
    let mut order = Vec::new();
    let mut groups: HashMap<K, Vec<f64>> = HashMap::new();
    for (key, value) in pairs {
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(value);
    }

    let mut out = Vec::new();
    for key in order {
        if let Some(values) = groups.get(&key) {
            out.push(values[0]);
            out.extend(values.windows(2).map(|w| w[1] - w[0]));
        }
    }
    out
}
