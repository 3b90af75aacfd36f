use crate::ledger::ContactLedger;
use crate::partition::ChainPartition;
use crate::topology::{HardwareTopology, LogicalRequirementGraph};

/// Everything wrong with an embedding, recomputed from scratch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddingReport {
    pub unsatisfied: Vec<(usize, usize)>,
    pub empty_chains: Vec<usize>,
    pub disconnected_chains: Vec<usize>,
}

impl EmbeddingReport {
    pub fn is_valid(&self) -> bool {
        self.unsatisfied.is_empty()
            && self.empty_chains.is_empty()
            && self.disconnected_chains.is_empty()
    }
}

/// Splits one chain into its connected pieces within the hardware graph.
pub fn chain_components(
    hardware: &HardwareTopology,
    partition: &ChainPartition,
    vertex: usize,
) -> Vec<Vec<usize>> {
    let mut visited = vec![false; partition.num_nodes()];
    let mut output = Vec::new();

    for start in partition.chain(vertex) {
        if visited[start] {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start];
        visited[start] = true;

        while let Some(v) = stack.pop() {
            component.push(v);
            for &w in hardware.neighbors_of(v) {
                if !visited[w] && partition.owner_of(w) == vertex {
                    visited[w] = true;
                    stack.push(w);
                }
            }
        }

        component.sort_unstable();
        output.push(component);
    }

    output
}

/// Checks that every required edge is realised and that every chain of a vertex with required
/// edges is non-empty and connected. Not used on the repair hot path.
///
/// # Panics
///
/// Will panic if the partition does not cover the hardware nodes.
pub fn check_embedding(
    hardware: &HardwareTopology,
    logical: &LogicalRequirementGraph,
    partition: &ChainPartition,
) -> EmbeddingReport {
    let ledger = ContactLedger::from_partition(hardware, partition);
    let mut report = EmbeddingReport {
        unsatisfied: ledger.unsatisfied_edges(logical),
        ..EmbeddingReport::default()
    };

    for vertex in 0..logical.num_vertices() {
        if logical.degree(vertex) == 0 {
            continue;
        }
        match chain_components(hardware, partition, vertex).len() {
            0 => report.empty_chains.push(vertex),
            1 => {}
            _ => report.disconnected_chains.push(vertex),
        }
    }

    report
}
