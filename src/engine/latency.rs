use super::{export_cdf, to_samples, CdfExport, LATENCY_CDF_PRECISION};
use crate::model::{OutputRecord, LATENCY_FAMILIES};
use crate::network::{self, LatencyTable};
use crate::parse;
use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

const NETWORK_DIR: &str = "network-plot";

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// CDF of the received-message latencies of each network family.
pub(crate) fn run_latency_cdfs(root: &Path) -> Result<Vec<OutputRecord>> {
    let dir = root.join(NETWORK_DIR);
    LATENCY_FAMILIES
        .iter()
        .map(|name| {
            let input = dir.join(format!("latency-{name}.dat"));
            let reader = parse::open_input(&input)?;
            let samples = to_samples(&parse::parse_latencies(reader, &input.display())?);
            let caption = format!("{} network latency", capitalize(name));
            export_cdf(
                CdfExport {
                    name,
                    input: Some(&input),
                    output: dir.join(format!("latency-{name}-cdf.dat")),
                    caption: &caption,
                    precision: LATENCY_CDF_PRECISION,
                },
                &samples,
            )
        })
        .collect()
}

/// Parameters for [`run_latency_table`].
pub(crate) struct LatencyTableParams<'a> {
    pub input: Option<&'a Path>,
    pub nodes: Option<u32>,
    pub default_latency: u64,
    pub seed: u64,
}

/// Load (or build) a latency table, grow it to the requested node count and
/// export the CDF of its link latencies.
pub(crate) fn run_latency_table(
    root: &Path,
    params: LatencyTableParams<'_>,
) -> Result<(OutputRecord, Option<u64>)> {
    let LatencyTableParams {
        input,
        nodes,
        default_latency,
        seed,
    } = params;

    let table = match input {
        Some(path) => Some(LatencyTable::from_matrix(
            parse::open_input(path)?,
            &path.display(),
        )?),
        None => None,
    };
    let nodes = match (nodes, &table) {
        (Some(n), _) => n,
        (None, Some(t)) => t.node_count() as u32,
        (None, None) => return Err(anyhow!("--nodes is required without an input matrix")),
    };

    let mut rng = StdRng::seed_from_u64(seed);
    let check = network::check_latency_nodes(table, nodes, Some(default_latency), &mut rng)?;
    if let Some(median) = check.median_latency {
        log::info!("median link latency: {median} ms");
    }
    if !check.constant {
        if let Some(rank) = check.table.rank_of(default_latency) {
            log::info!("default latency of {default_latency} ms sits at p{rank:.1}");
        }
    }

    let record = export_cdf(
        CdfExport {
            name: "latency-table",
            input,
            output: root.join(NETWORK_DIR).join("latency-table-cdf.dat"),
            caption: "Latency table",
            precision: LATENCY_CDF_PRECISION,
        },
        &check.table.latencies_f64(),
    )?;
    Ok((record, check.median_latency))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caption_is_capitalized() {
        assert_eq!(capitalize("constant"), "Constant");
        assert_eq!(capitalize(""), "");
    }
}
