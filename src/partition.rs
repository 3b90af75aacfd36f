//! The owner map of an embedding: which logical vertex each hardware node currently serves.

use crate::error::{EmbeddingError, Result, SeedDefect};
use crate::topology::HardwareTopology;
use ndarray::Array1;

/// Total map from hardware node to owning logical vertex, plus the size of every chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainPartition {
    owners: Array1<usize>,
    chain_sizes: Array1<usize>,
}

impl ChainPartition {
    /// Wraps an owner map, `owners[node] = logical vertex`, for `num_chains` logical vertices.
    ///
    /// # Errors
    ///
    /// Returns `MalformedSeed(UnknownOwner)` if any owner is `>= num_chains`.
    pub fn from_owners(owners: Vec<usize>, num_chains: usize) -> Result<Self> {
        let mut chain_sizes = Array1::<usize>::zeros(num_chains);
        for (node, &owner) in owners.iter().enumerate() {
            if owner >= num_chains {
                return Err(EmbeddingError::MalformedSeed(SeedDefect::UnknownOwner {
                    node,
                    owner,
                }));
            }
            chain_sizes[owner] += 1;
        }

        Ok(Self {
            owners: Array1::from_vec(owners),
            chain_sizes,
        })
    }

    /// Builds the owner map from explicit chains, `chains[v]` being the hardware nodes of `v`.
    /// Every node in `0..num_nodes` must appear in exactly one chain.
    ///
    /// # Errors
    ///
    /// Returns `MalformedSeed` for duplicated or missing nodes, `NodeOutOfRange` for unknown ones.
    pub fn from_chains(chains: &[Vec<usize>], num_nodes: usize) -> Result<Self> {
        let mut owners: Vec<Option<usize>> = vec![None; num_nodes];
        for (vertex, chain) in chains.iter().enumerate() {
            for &node in chain {
                let slot = owners.get_mut(node).ok_or(EmbeddingError::NodeOutOfRange {
                    node,
                    len: num_nodes,
                })?;
                if slot.replace(vertex).is_some() {
                    return Err(EmbeddingError::MalformedSeed(SeedDefect::DuplicateNode {
                        node,
                    }));
                }
            }
        }

        let owners = owners
            .into_iter()
            .enumerate()
            .map(|(node, owner)| {
                owner.ok_or(EmbeddingError::MalformedSeed(SeedDefect::UnassignedNode { node }))
            })
            .collect::<Result<Vec<usize>>>()?;

        Self::from_owners(owners, chains.len())
    }

    pub fn num_nodes(&self) -> usize {
        self.owners.len()
    }

    pub fn num_chains(&self) -> usize {
        self.chain_sizes.len()
    }

    /// # Errors
    ///
    /// Returns `NodeOutOfRange` for an unknown hardware node.
    pub fn owner(&self, node: usize) -> Result<usize> {
        self.owners
            .get(node)
            .copied()
            .ok_or(EmbeddingError::NodeOutOfRange {
                node,
                len: self.num_nodes(),
            })
    }

    pub(crate) fn owner_of(&self, node: usize) -> usize {
        self.owners[node]
    }

    pub fn owners(&self) -> &Array1<usize> {
        &self.owners
    }

    /// Number of hardware nodes owned by `vertex`; zero for unknown vertices.
    pub fn chain_size(&self, vertex: usize) -> usize {
        self.chain_sizes.get(vertex).copied().unwrap_or(0)
    }

    /// The hardware nodes owned by `vertex`, in ascending order.
    pub fn chain(&self, vertex: usize) -> Vec<usize> {
        self.owners
            .iter()
            .enumerate()
            .filter(|&(_, &owner)| owner == vertex)
            .map(|(node, _)| node)
            .collect()
    }

    /// All chains, indexed by logical vertex.
    pub fn chains(&self) -> Vec<Vec<usize>> {
        let mut chains = vec![Vec::new(); self.num_chains()];
        for (node, &owner) in self.owners.iter().enumerate() {
            chains[owner].push(node);
        }
        chains
    }

    /// Moves `node` into chain `vertex`. Callers validate both ids.
    pub(crate) fn reassign(&mut self, node: usize, vertex: usize) {
        let old = self.owners[node];
        self.chain_sizes[old] -= 1;
        self.chain_sizes[vertex] += 1;
        self.owners[node] = vertex;
    }

    /// Whether removing `node` from its chain would leave the rest of the chain in more than one
    /// piece. Only the part of the chain reachable from `node` is inspected, so a chain that was
    /// already disconnected elsewhere does not count against the move.
    ///
    /// # Panics
    ///
    /// Will panic if `node` is out of range.
    pub fn removal_splits_chain(&self, hardware: &HardwareTopology, node: usize) -> bool {
        let owner = self.owners[node];
        let same_chain: Vec<usize> = hardware
            .neighbors_of(node)
            .iter()
            .copied()
            .filter(|&n| self.owners[n] == owner)
            .collect();

        let Some((&start, rest)) = same_chain.split_first() else {
            return false;
        };
        if rest.is_empty() {
            return false;
        }

        // flood the chain from one neighbour without passing through `node`
        let mut visited = vec![false; self.num_nodes()];
        visited[node] = true;
        visited[start] = true;
        let mut stack = vec![start];
        while let Some(v) = stack.pop() {
            for &w in hardware.neighbors_of(v) {
                if !visited[w] && self.owners[w] == owner {
                    visited[w] = true;
                    stack.push(w);
                }
            }
        }

        rest.iter().any(|&n| !visited[n])
    }
}
