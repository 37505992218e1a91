use crate::stats::PercentileEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

pub type ProcessId = u32;

/// Asynchrony log families written by the simulator, one file each.
pub const ASYNC_FAMILIES: [&str; 4] = ["no-async", "uniform-async", "normal-async", "weibull-async"];

/// Network latency log families.
pub const LATENCY_FAMILIES: [&str; 2] = ["constant", "matrix"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory the simulator wrote its logs to; every path is relative to it.
    pub root: PathBuf,
    pub dataset: Dataset,
}

/// Which CDF view of the asynchrony logs to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AsyncView {
    Cdf,
    Values,
    Precision,
    Process { id: ProcessId },
    Delta,
}

impl AsyncView {
    /// Output directory under `async-plot/data/`.
    pub fn out_dir(self) -> &'static str {
        match self {
            AsyncView::Cdf => "cdf",
            AsyncView::Values => "values-cdf",
            AsyncView::Precision => "1000precision",
            AsyncView::Process { .. } => "cdf-process_perspective",
            AsyncView::Delta => "delta",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Dataset {
    Latency,
    Churn,
    ChurnProcess {
        id: ProcessId,
    },
    Async(AsyncView),
    LatencyTable {
        input: Option<PathBuf>,
        nodes: Option<u32>,
        default_latency: u64,
        seed: u64,
    },
    Summary {
        input: PathBuf,
    },
    Average {
        inputs: Vec<PathBuf>,
        output: PathBuf,
    },
}

impl Dataset {
    pub fn label(&self) -> &'static str {
        match self {
            Dataset::Latency => "latency",
            Dataset::Churn => "churn",
            Dataset::ChurnProcess { .. } => "churn-process",
            Dataset::Async(AsyncView::Cdf) => "async",
            Dataset::Async(AsyncView::Values) => "async-values",
            Dataset::Async(AsyncView::Precision) => "async-precision",
            Dataset::Async(AsyncView::Process { .. }) => "async-process",
            Dataset::Async(AsyncView::Delta) => "async-delta",
            Dataset::LatencyTable { .. } => "latency-table",
            Dataset::Summary { .. } => "summary",
            Dataset::Average { .. } => "average",
        }
    }
}

/// Kind of a churn event, as logged by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChurnKind {
    Join,
    Leave,
    Fail,
    Recover,
    End,
}

impl std::str::FromStr for ChurnKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "join" => Ok(ChurnKind::Join),
            "leave" => Ok(ChurnKind::Leave),
            "fail" => Ok(ChurnKind::Fail),
            "recover" => Ok(ChurnKind::Recover),
            "end" => Ok(ChurnKind::End),
            other => Err(anyhow::anyhow!("unknown churn kind {other:?}")),
        }
    }
}

/// One line of `churn.dat`: `time kind delta count [ids]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnRecord {
    pub time: i64,
    pub kind: ChurnKind,
    pub delta: i64,
    pub count: i64,
    pub participants: BTreeSet<ProcessId>,
}

impl ChurnRecord {
    /// Signed number of processes that joined (positive) or left (negative).
    pub fn net_change(&self) -> i64 {
        self.delta * self.count
    }
}

/// One line of an asynchrony log: `time process`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncRecord {
    pub time: i64,
    pub process: ProcessId,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleSummary {
    pub count: usize,
    pub min: f64,
    pub mean: f64,
    pub median: f64,
    pub p25: f64,
    pub p75: f64,
    pub max: f64,
}

/// One exported gnuplot file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputRecord {
    pub name: String,
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub caption: String,
    pub rows: usize,
    pub summary: Option<SampleSummary>,
    #[serde(default)]
    pub percentiles: Vec<PercentileEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(default)]
    pub timestamp_utc: String,
    pub dataset: Dataset,
    pub root: PathBuf,
    pub outputs: Vec<OutputRecord>,
    /// Rounded-up median latency, only for latency tables.
    #[serde(default)]
    pub median_latency: Option<u64>,
}
