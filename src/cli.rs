use crate::engine::Engine;
use crate::model::{AsyncView, Dataset, ProcessId, RunConfig, RunResult};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "simplot",
    version,
    about = "Turn simulation logs into gnuplot-ready CDF and percentile data"
)]
pub struct Cli {
    /// Directory the simulator wrote its logs to
    #[arg(long, default_value = "output", global = true)]
    pub root: PathBuf,

    /// Print the run result as JSON instead of a text summary
    #[arg(long, global = true)]
    pub json: bool,

    /// Only log warnings and errors
    #[arg(long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// CDF of the constant and matrix network latencies
    Latency,
    /// Running total of live processes after each churn event
    Churn,
    /// Churn restricted to the events one process took part in
    ChurnProcess {
        /// Process id
        #[arg(default_value_t = 9)]
        id: ProcessId,
    },
    /// CDF of the asynchrony delays (cdf/)
    Async,
    /// CDF of the asynchrony delays (values-cdf/)
    AsyncValues,
    /// CDF of the asynchrony delays with 1000 buckets
    AsyncPrecision,
    /// CDF of the asynchrony delays injected into one process
    AsyncProcess {
        /// Process id
        #[arg(default_value_t = 1)]
        id: ProcessId,
    },
    /// CDF of the gaps between successive delays of each process
    AsyncDelta,
    /// Load or build a latency table, extend it and export its CDF
    LatencyTable {
        /// Square latency matrix, one row per node
        #[arg(long)]
        input: Option<PathBuf>,
        /// Number of nodes the table must cover
        #[arg(long)]
        nodes: Option<u32>,
        /// Latency in ms used when no matrix is given
        #[arg(long, default_value_t = 100)]
        default_latency: u64,
        /// Seed for the latencies drawn for new nodes
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Percentile table of the first column of any log
    Summary {
        input: PathBuf,
    },
    /// Average the first column of several runs, aligned at their last line
    Average {
        /// Where to write the averaged series
        #[arg(long, short)]
        output: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

impl Command {
    fn dataset(&self) -> Dataset {
        match self {
            Command::Latency => Dataset::Latency,
            Command::Churn => Dataset::Churn,
            Command::ChurnProcess { id } => Dataset::ChurnProcess { id: *id },
            Command::Async => Dataset::Async(AsyncView::Cdf),
            Command::AsyncValues => Dataset::Async(AsyncView::Values),
            Command::AsyncPrecision => Dataset::Async(AsyncView::Precision),
            Command::AsyncProcess { id } => Dataset::Async(AsyncView::Process { id: *id }),
            Command::AsyncDelta => Dataset::Async(AsyncView::Delta),
            Command::LatencyTable {
                input,
                nodes,
                default_latency,
                seed,
            } => Dataset::LatencyTable {
                input: input.clone(),
                nodes: *nodes,
                default_latency: *default_latency,
                seed: *seed,
            },
            Command::Summary { input } => Dataset::Summary {
                input: input.clone(),
            },
            Command::Average { output, inputs } => Dataset::Average {
                inputs: inputs.clone(),
                output: output.clone(),
            },
        }
    }
}

/// Build a `RunConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> RunConfig {
    RunConfig {
        root: args.root.clone(),
        dataset: args.command.dataset(),
    }
}

pub fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let result = Engine::new(cfg)
        .run()
        .with_context(|| format!("{} failed", args.command.dataset().label()))?;
    print_result(&args, &result)
}

fn print_result(args: &Cli, result: &RunResult) -> Result<()> {
    if args.json {
        let out = serde_json::to_string_pretty(result)?;
        println!("{out}");
        return Ok(());
    }
    let summary = crate::text_summary::build_text_summary(result);
    for line in summary.lines {
        println!("{line}");
    }
    Ok(())
}
