//! Descriptive statistics for simulation logs, exported as gnuplot data files.

pub mod cli;
pub mod engine;
pub mod metrics;
pub mod model;
pub mod network;
pub mod parse;
pub mod stats;
pub mod storage;
pub mod text_summary;
