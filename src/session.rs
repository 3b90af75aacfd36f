//! A repair session owns the mutable half of an embedding: the chain partition and the contact
//! ledger derived from it. The engine borrows a session for every call, reading it to score moves
//! and writing it to commit them.

use crate::error::{EmbeddingError, Result, SeedDefect};
use crate::ledger::ContactLedger;
use crate::partition::ChainPartition;
use crate::topology::{HardwareTopology, LogicalRequirementGraph};

#[derive(Debug, Clone)]
pub struct RepairSession {
    pub(crate) partition: ChainPartition,
    pub(crate) ledger: ContactLedger,
}

impl RepairSession {
    /// Starts a session from a seed embedding and derives its contact ledger.
    ///
    /// # Errors
    ///
    /// Returns `MalformedSeed` if the partition does not cover the hardware exactly, assigns a
    /// node to something that is not a logical vertex, or leaves a vertex with required edges
    /// without a chain.
    pub fn new(
        hardware: &HardwareTopology,
        logical: &LogicalRequirementGraph,
        partition: ChainPartition,
    ) -> Result<Self> {
        if partition.num_nodes() != hardware.num_nodes() {
            return Err(EmbeddingError::MalformedSeed(SeedDefect::WrongLength {
                expected: hardware.num_nodes(),
                found: partition.num_nodes(),
            }));
        }

        if let Some((node, &owner)) = partition
            .owners()
            .iter()
            .enumerate()
            .find(|&(_, &owner)| owner >= logical.num_vertices())
        {
            return Err(EmbeddingError::MalformedSeed(SeedDefect::UnknownOwner {
                node,
                owner,
            }));
        }

        if let Some(vertex) = (0..logical.num_vertices())
            .find(|&v| logical.degree(v) > 0 && partition.chain_size(v) == 0)
        {
            return Err(EmbeddingError::MalformedSeed(SeedDefect::MissingChain {
                vertex,
            }));
        }

        let ledger = ContactLedger::from_partition(hardware, &partition);
        Ok(Self { partition, ledger })
    }

    /// Convenience constructor from a raw owner map.
    ///
    /// # Errors
    ///
    /// See [`RepairSession::new`] and [`ChainPartition::from_owners`].
    pub fn from_owners(
        hardware: &HardwareTopology,
        logical: &LogicalRequirementGraph,
        owners: Vec<usize>,
    ) -> Result<Self> {
        let partition = ChainPartition::from_owners(owners, logical.num_vertices())?;
        Self::new(hardware, logical, partition)
    }

    pub fn partition(&self) -> &ChainPartition {
        &self.partition
    }

    pub fn ledger(&self) -> &ContactLedger {
        &self.ledger
    }

    /// Hands the final embedding to a validator or visualiser.
    pub fn into_partition(self) -> ChainPartition {
        self.partition
    }

    pub fn satisfied_count(&self, logical: &LogicalRequirementGraph) -> usize {
        self.ledger.satisfied_count(logical)
    }

    pub fn unsatisfied_edges(&self, logical: &LogicalRequirementGraph) -> Vec<(usize, usize)> {
        self.ledger.unsatisfied_edges(logical)
    }

    pub fn is_fully_satisfied(&self, logical: &LogicalRequirementGraph) -> bool {
        self.satisfied_count(logical) == logical.num_required()
    }

    /// Cross-checks the incremental ledger against a full recomputation.
    pub fn ledger_is_consistent(&self, hardware: &HardwareTopology) -> bool {
        self.ledger == ContactLedger::from_partition(hardware, &self.partition)
    }
}
