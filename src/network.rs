//! Node-to-node latency tables used by the network simulation.

use crate::stats;
use anyhow::{anyhow, Context, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::io::BufRead;

pub type NodeId = u32;

/// Latency in ms from every node to every other node. A node has no entry
/// for itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatencyTable {
    links: BTreeMap<NodeId, BTreeMap<NodeId, u64>>,
}

impl LatencyTable {
    /// Every link gets the same latency.
    pub fn constant(nodes: u32, latency: u64) -> Self {
        let links = (0..nodes)
            .map(|n| {
                let row = (0..nodes).filter(|m| *m != n).map(|m| (m, latency)).collect();
                (n, row)
            })
            .collect();
        Self { links }
    }

    /// Load a square latency matrix: row `i` lists the latency from node `i`
    /// to every node in ascending order. The diagonal is dropped.
    pub fn from_matrix<R: BufRead>(reader: R, source: &dyn Display) -> Result<Self> {
        let mut rows: Vec<Vec<u64>> = Vec::new();
        for (n, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("read {source}"))?;
            if line.trim().is_empty() {
                continue;
            }
            let row = line
                .split_whitespace()
                .map(str::parse::<u64>)
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("{source}:{}", n + 1))?;
            rows.push(row);
        }

        let size = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != size) {
            return Err(anyhow!(
                "{source}: row {} has {} entries, expected {} for a {size}x{size} matrix",
                i + 1,
                row.len(),
                size
            ));
        }

        let links = rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| {
                let from = i as NodeId;
                let targets = row
                    .into_iter()
                    .enumerate()
                    .filter(|(j, _)| *j != i)
                    .map(|(j, latency)| (j as NodeId, latency))
                    .collect();
                (from, targets)
            })
            .collect();
        Ok(Self { links })
    }

    pub fn node_count(&self) -> usize {
        self.links.len()
    }

    pub fn latency(&self, from: NodeId, to: NodeId) -> Option<u64> {
        self.links.get(&from)?.get(&to).copied()
    }

    /// Every link latency, row by row.
    pub fn latencies(&self) -> Vec<u64> {
        self.links.values().flat_map(|row| row.values().copied()).collect()
    }

    pub(crate) fn latencies_f64(&self) -> Vec<f64> {
        self.latencies().into_iter().map(|l| l as f64).collect()
    }

    /// Median link latency, rounded up.
    pub fn median_latency(&self) -> Option<u64> {
        let median = stats::score_at_percentile(&self.latencies_f64(), 50.0, None, false)?;
        Some(median.ceil() as u64)
    }

    /// Percentile rank (0..=100) of `latency` among the table's links, taken
    /// at the first link latency not below it.
    pub fn rank_of(&self, latency: u64) -> Option<f64> {
        let mut sorted = self.latencies_f64();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let idx = stats::closest_index(&sorted, latency as f64)?;
        if sorted.len() == 1 {
            return Some(100.0);
        }
        Some(idx as f64 * 100.0 / (sorted.len() - 1) as f64)
    }

    /// Grow the table to `nodes` nodes. New links reuse latencies drawn at
    /// random from the existing ones. Returns the number of nodes added.
    pub fn extend_to<R: Rng + ?Sized>(&mut self, nodes: u32, rng: &mut R) -> Result<u32> {
        let available = self.node_count() as u32;
        if nodes <= available {
            return Ok(0);
        }
        let pool = self.latencies();
        if pool.is_empty() {
            return Err(anyhow!("cannot extend a latency table without any links"));
        }

        for row in self.links.values_mut() {
            for target in available..nodes {
                row.insert(target, pick(&pool, rng));
            }
        }
        for node in available..nodes {
            let row = (0..nodes)
                .filter(|m| *m != node)
                .map(|m| (m, pick(&pool, rng)))
                .collect();
            self.links.insert(node, row);
        }
        Ok(nodes - available)
    }
}

fn pick<R: Rng + ?Sized>(pool: &[u64], rng: &mut R) -> u64 {
    pool.choose(rng).copied().unwrap_or_default()
}

/// Outcome of [`check_latency_nodes`].
#[derive(Debug, Clone)]
pub struct LatencyCheck {
    pub table: LatencyTable,
    pub median_latency: Option<u64>,
    pub added_nodes: u32,
    pub constant: bool,
}

/// Make sure a latency table covers `nodes` nodes.
///
/// Without a table, a constant table is built from `default_latency`.
/// Otherwise the table is extended as needed and its median latency is
/// reported alongside.
pub fn check_latency_nodes<R: Rng + ?Sized>(
    table: Option<LatencyTable>,
    nodes: u32,
    default_latency: Option<u64>,
    rng: &mut R,
) -> Result<LatencyCheck> {
    let mut table = match (table, default_latency) {
        (Some(table), _) => table,
        (None, Some(latency)) => {
            log::warn!("using constant latency of {latency} ms for {nodes} nodes");
            return Ok(LatencyCheck {
                table: LatencyTable::constant(nodes, latency),
                median_latency: Some(latency),
                added_nodes: 0,
                constant: true,
            });
        }
        (None, None) => return Err(anyhow!("no latency table and no default latency")),
    };

    let median_latency = table.median_latency();
    let added_nodes = table.extend_to(nodes, rng)?;
    if added_nodes > 0 {
        log::warn!("added {added_nodes} nodes to the latency table");
    }
    Ok(LatencyCheck {
        table,
        median_latency,
        added_nodes,
        constant: false,
    })
}
