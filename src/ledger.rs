//! # Contact Ledger
//!
//! Counts, for every unordered pair of distinct chains, the couplers whose endpoints lie one in
//! each chain. The counters live in a flat triangular arena indexed by the canonical `(min, max)`
//! pair, so a lookup is a single array read and a node move touches only the counters of the
//! moved node's couplers.

use crate::error::{EmbeddingError, Result};
use crate::partition::ChainPartition;
use crate::topology::{HardwareTopology, LogicalRequirementGraph};
use ndarray::Array1;

/// Net change of one chain pair's contact weight. `a < b` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairDelta {
    pub a: usize,
    pub b: usize,
    pub delta: i64,
}

/// Position of the pair `(a, b)`, `a != b`, in the lower-triangular arena.
#[inline]
fn pair_index(a: usize, b: usize) -> usize {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    hi * (hi - 1) / 2 + lo
}

fn accumulate(deltas: &mut Vec<PairDelta>, x: usize, y: usize, delta: i64) {
    let (a, b) = if x < y { (x, y) } else { (y, x) };
    match deltas.iter_mut().find(|d| d.a == a && d.b == b) {
        Some(d) => d.delta += delta,
        None => deltas.push(PairDelta { a, b, delta }),
    }
}

/// Walks the couplers of `node` and returns the contact changes caused by moving it from chain
/// `old` to chain `new`, merged per chain pair. Pairs whose changes cancel are kept with a zero
/// delta. The partition must still list `node` under `old`.
///
/// Hardware degrees are small, so the merge is a linear scan rather than a map.
pub(crate) fn shift_deltas(
    hardware: &HardwareTopology,
    partition: &ChainPartition,
    node: usize,
    old: usize,
    new: usize,
) -> Vec<PairDelta> {
    let mut deltas = Vec::new();
    if old == new {
        return deltas;
    }

    for &n in hardware.neighbors_of(node) {
        let other = partition.owner_of(n);
        if other == old {
            // intra-chain coupler of `old` now joins `old` and `new`
            accumulate(&mut deltas, old, new, 1);
        } else if other == new {
            accumulate(&mut deltas, old, new, -1);
        } else {
            accumulate(&mut deltas, old, other, -1);
            accumulate(&mut deltas, new, other, 1);
        }
    }

    deltas
}

/// Inter-chain contact weights of an embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactLedger {
    weights: Array1<u32>,
    num_chains: usize,
}

impl ContactLedger {
    /// An all-zero ledger for `num_chains` chains.
    pub fn new(num_chains: usize) -> Self {
        let len = num_chains * num_chains.saturating_sub(1) / 2;
        Self {
            weights: Array1::<u32>::zeros(len),
            num_chains,
        }
    }

    /// Recomputes every weight from scratch by classifying each coupler by the owners of its
    /// endpoints. This is O(|couplers|) and only meant for session start and cross-checks.
    ///
    /// # Panics
    ///
    /// Will panic if the partition covers fewer nodes than the hardware.
    pub fn from_partition(hardware: &HardwareTopology, partition: &ChainPartition) -> Self {
        let mut ledger = Self::new(partition.num_chains());
        for (p, q) in hardware.couplers() {
            let a = partition.owner_of(p);
            let b = partition.owner_of(q);
            if a != b {
                ledger.weights[pair_index(a, b)] += 1;
            }
        }
        ledger
    }

    pub fn num_chains(&self) -> usize {
        self.num_chains
    }

    /// Current contact count between chains `a` and `b`. Identical or unknown chains read as 0.
    #[inline]
    pub fn weight(&self, a: usize, b: usize) -> u32 {
        if a == b || a >= self.num_chains || b >= self.num_chains {
            return 0;
        }
        self.weights[pair_index(a, b)]
    }

    pub fn is_connected(&self, a: usize, b: usize) -> bool {
        self.weight(a, b) > 0
    }

    /// Applies the contact changes of moving `node` from chain `old` to chain `new`. Must be
    /// called while `partition` still lists `node` under `old`.
    ///
    /// # Errors
    ///
    /// Returns `NodeOutOfRange` for unknown nodes or chains, and `LedgerUnderflow` if the ledger
    /// disagrees with the partition. The ledger is untouched on error.
    pub fn apply_node_move(
        &mut self,
        hardware: &HardwareTopology,
        partition: &ChainPartition,
        node: usize,
        old: usize,
        new: usize,
    ) -> Result<()> {
        if node >= hardware.num_nodes() || node >= partition.num_nodes() {
            return Err(EmbeddingError::NodeOutOfRange {
                node,
                len: hardware.num_nodes().min(partition.num_nodes()),
            });
        }
        for chain in [old, new] {
            if chain >= self.num_chains {
                return Err(EmbeddingError::NodeOutOfRange {
                    node: chain,
                    len: self.num_chains,
                });
            }
        }

        let deltas = shift_deltas(hardware, partition, node, old, new);
        self.apply_deltas(&deltas)
    }

    /// Applies a batch of pair deltas all-or-nothing.
    fn apply_deltas(&mut self, deltas: &[PairDelta]) -> Result<()> {
        for d in deltas {
            if i64::from(self.weight(d.a, d.b)) + d.delta < 0 {
                return Err(EmbeddingError::LedgerUnderflow { a: d.a, b: d.b });
            }
        }

        for d in deltas {
            let slot = &mut self.weights[pair_index(d.a, d.b)];
            // non-negative by the check above
            *slot = (i64::from(*slot) + d.delta) as u32;
        }

        Ok(())
    }

    /// Number of required edges whose chains are in contact.
    pub fn satisfied_count(&self, logical: &LogicalRequirementGraph) -> usize {
        logical
            .required_edges()
            .filter(|&(a, b)| self.is_connected(a, b))
            .count()
    }

    /// Required edges whose chains currently share no coupler.
    pub fn unsatisfied_edges(&self, logical: &LogicalRequirementGraph) -> Vec<(usize, usize)> {
        logical
            .required_edges()
            .filter(|&(a, b)| !self.is_connected(a, b))
            .collect()
    }
}
