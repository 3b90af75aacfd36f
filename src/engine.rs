//! # Swap-Shift Engine
//!
//! Scores and applies single-node chain reassignments. A shift `(from, to)` takes the hardware
//! node `to` out of its chain and gives it to the chain that owns the adjacent node `from`, so
//! the chain of `from` grows by one node and the chain of `to` shrinks by one.
//!
//! Scoring walks the couplers of `to` once and compares the simulated contact weights of the
//! touched chain pairs with the ledger; nothing is recomputed globally and nothing is written.
//! The engine holds only shared references to the immutable graphs, so any number of threads
//! may score against the same frozen session, while commits take the session mutably.

use crate::error::{EmbeddingError, MoveViolation, RejectReason, Result};
use crate::ledger::shift_deltas;
use crate::options::{ConnectivityPolicy, EngineOptions, SourcePairAccounting};
use crate::session::RepairSession;
use crate::topology::{HardwareTopology, LogicalRequirementGraph};
use rayon::prelude::*;
use smolprng::{Algorithm, PRNG};
use tracing::{debug, trace};

pub struct SwapShiftEngine<'a> {
    pub hardware: &'a HardwareTopology,
    pub logical: &'a LogicalRequirementGraph,
    pub options: EngineOptions,
}

impl<'a> SwapShiftEngine<'a> {
    pub fn new(hardware: &'a HardwareTopology, logical: &'a LogicalRequirementGraph) -> Self {
        Self::with_options(hardware, logical, EngineOptions::new())
    }

    pub const fn with_options(
        hardware: &'a HardwareTopology,
        logical: &'a LogicalRequirementGraph,
        options: EngineOptions,
    ) -> Self {
        Self {
            hardware,
            logical,
            options,
        }
    }

    /// Checks that `(from, to)` names two distinct, adjacent hardware nodes of this session.
    fn validate(&self, session: &RepairSession, from: usize, to: usize) -> Result<()> {
        let len = self.hardware.num_nodes().min(session.partition.num_nodes());
        let reason = if from >= len || to >= len {
            MoveViolation::OutOfRange
        } else if from == to {
            MoveViolation::SameNode
        } else if !self.hardware.are_adjacent(from, to) {
            MoveViolation::NotAdjacent
        } else {
            return Ok(());
        };

        Err(EmbeddingError::InvalidMove { from, to, reason })
    }

    /// Net change in satisfied required edges if `to` joined the chain of `from`.
    ///
    /// Returns 0 when both nodes already share a chain. A required edge is counted at most once
    /// however many of the moved node's couplers touch its chain pair.
    ///
    /// Example:
    /// ``` rust
    /// use ember::topology::{HardwareTopology, LogicalRequirementGraph};
    /// use ember::session::RepairSession;
    /// use ember::engine::SwapShiftEngine;
    ///
    /// let hw = HardwareTopology::new(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
    /// let logical = LogicalRequirementGraph::new(3, &[(0, 2)]).unwrap();
    /// let session = RepairSession::from_owners(&hw, &logical, vec![0, 1, 2, 2]).unwrap();
    /// let engine = SwapShiftEngine::new(&hw, &logical);
    ///
    /// // node 1 joins chain 2 and takes its coupler to node 0 along
    /// assert_eq!(engine.delta_shift(&session, 2, 1), Ok(1));
    /// assert_eq!(engine.delta_shift(&session, 2, 3), Ok(0));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `InvalidMove` if the nodes are identical, not adjacent or out of range.
    pub fn delta_shift(&self, session: &RepairSession, from: usize, to: usize) -> Result<i64> {
        self.validate(session, from, to)?;
        Ok(self.score(session, from, to))
    }

    /// Scoring without validation.
    fn score(&self, session: &RepairSession, from: usize, to: usize) -> i64 {
        let new = session.partition.owner_of(from);
        let old = session.partition.owner_of(to);
        if old == new {
            return 0;
        }

        let source_pair = (old.min(new), old.max(new));
        let mut gain = 0;
        let mut loss = 0;

        for d in shift_deltas(self.hardware, &session.partition, to, old, new) {
            if d.delta == 0 || !self.logical.is_required(d.a, d.b) {
                continue;
            }
            if self.options.source_pair == SourcePairAccounting::Assumed
                && (d.a, d.b) == source_pair
            {
                continue;
            }

            let before = i64::from(session.ledger.weight(d.a, d.b));
            let after = before + d.delta;
            if before == 0 && after > 0 {
                gain += 1;
            } else if before > 0 && after <= 0 {
                loss += 1;
            }
        }

        gain - loss
    }

    /// Whether committing `(from, to)` leaves the chain of `to` non-empty and in one piece.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMove` for an illegal pair.
    pub fn shift_keeps_chain_intact(
        &self,
        session: &RepairSession,
        from: usize,
        to: usize,
    ) -> Result<bool> {
        self.validate(session, from, to)?;
        Ok(self
            .chain_damage(session, to, ConnectivityPolicy::PreserveConnectivity)
            .is_none())
    }

    fn chain_damage(
        &self,
        session: &RepairSession,
        to: usize,
        policy: ConnectivityPolicy,
    ) -> Option<RejectReason> {
        let old = session.partition.owner_of(to);
        match policy {
            ConnectivityPolicy::Unchecked => None,
            _ if session.partition.chain_size(old) <= 1 => Some(RejectReason::WouldEmptyChain),
            ConnectivityPolicy::RejectEmptying => None,
            ConnectivityPolicy::PreserveConnectivity => session
                .partition
                .removal_splits_chain(self.hardware, to)
                .then_some(RejectReason::WouldSplitChain),
        }
    }

    /// Moves `to` into the chain of `from` and updates the ledger incrementally.
    ///
    /// Sharing a chain already makes this a no-op. On any error nothing is modified.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMove` for an illegal pair, `MoveRejected` if the connectivity policy
    /// refuses the move, and `LedgerUnderflow` if the session ledger was corrupted.
    pub fn commit(&self, session: &mut RepairSession, from: usize, to: usize) -> Result<()> {
        self.validate(session, from, to)?;

        let new = session.partition.owner_of(from);
        let old = session.partition.owner_of(to);
        if old == new {
            return Ok(());
        }

        if let Some(reason) = self.chain_damage(session, to, self.options.connectivity) {
            debug!(node = to, chain = old, %reason, "shift rejected by connectivity policy");
            return Err(EmbeddingError::MoveRejected {
                node: to,
                chain: old,
                reason,
            });
        }

        session
            .ledger
            .apply_node_move(self.hardware, &session.partition, to, old, new)?;
        session.partition.reassign(to, new);

        trace!(node = to, old, new, "shift committed");
        Ok(())
    }

    /// Every legal shift whose two nodes sit in different chains, in both orientations.
    pub fn candidate_shifts(&self, session: &RepairSession) -> Vec<(usize, usize)> {
        self.hardware
            .couplers()
            .filter(|&(p, q)| session.partition.owner_of(p) != session.partition.owner_of(q))
            .flat_map(|(p, q)| [(p, q), (q, p)])
            .collect()
    }

    /// Draws a shift uniformly over coupler orientations, or `None` if the hardware has no
    /// couplers. The pair may lie inside one chain, in which case it scores 0.
    pub fn random_shift<T: Algorithm>(
        &self,
        prng: &mut PRNG<T>,
    ) -> Option<(usize, usize)> {
        let num_nodes = self.hardware.num_nodes();
        if self.hardware.num_couplers() == 0 {
            return None;
        }

        loop {
            let to = prng.gen_u64() as usize % num_nodes;
            let neighbors = self.hardware.neighbors_of(to);
            if neighbors.is_empty() {
                continue;
            }
            let from = neighbors[prng.gen_u64() as usize % neighbors.len()];
            return Some((from, to));
        }
    }

    /// Scores many candidate shifts in parallel against the same frozen session.
    pub fn score_shifts(
        &self,
        session: &RepairSession,
        shifts: &[(usize, usize)],
    ) -> Vec<Result<i64>> {
        shifts
            .par_iter()
            .map(|&(from, to)| self.delta_shift(session, from, to))
            .collect()
    }

    /// The highest-scoring legal shift among `shifts`; ties go to the earliest candidate.
    pub fn best_shift(
        &self,
        session: &RepairSession,
        shifts: &[(usize, usize)],
    ) -> Option<((usize, usize), i64)> {
        shifts
            .par_iter()
            .enumerate()
            .filter_map(|(i, &(from, to))| {
                self.delta_shift(session, from, to)
                    .ok()
                    .map(|score| (i, (from, to), score))
            })
            .max_by(|a, b| a.2.cmp(&b.2).then(b.0.cmp(&a.0)))
            .map(|(_, shift, score)| (shift, score))
    }
}
