//! # Ember
//!
//! Incremental repair of graph minor embeddings. An embedding maps every vertex of a logical
//! graph onto a chain of hardware nodes; it is valid once every required logical edge is
//! realised by a coupler between the two chains. Starting from an imperfect seed, the
//! [`engine::SwapShiftEngine`] scores and applies swap-shift moves, each handing one hardware
//! node to the chain of a neighbour, against a [`session::RepairSession`] that keeps the chain
//! partition and the inter-chain contact counts in step.

pub mod engine;
pub mod error;
pub mod ledger;
pub mod options;
pub mod partition;
pub mod repairlogger;
pub mod search;
pub mod session;
pub mod topology;
pub mod validate;

pub use engine::SwapShiftEngine;
pub use error::EmbeddingError;
pub use session::RepairSession;
pub use topology::{HardwareTopology, LogicalRequirementGraph};

#[cfg(test)]
mod tests {
    use crate::error::{EmbeddingError, MoveViolation};
    use crate::ledger::ContactLedger;
    use crate::options::{EngineOptions, SourcePairAccounting};
    use crate::partition::ChainPartition;
    use crate::search;
    use crate::{HardwareTopology, LogicalRequirementGraph, RepairSession, SwapShiftEngine};
    use proptest::prelude::*;
    use smolprng::{Algorithm, JsfLarge, PRNG};

    fn small_grid() -> HardwareTopology {
        HardwareTopology::new(
            6,
            &[(0, 1), (0, 2), (1, 3), (2, 3), (2, 4), (3, 5), (4, 5)],
        )
        .unwrap()
    }

    fn delta_shift(
        num_vertices: usize,
        required: &[(usize, usize)],
        owners: &[usize],
        from: usize,
        to: usize,
    ) -> i64 {
        let hw = small_grid();
        let logical = LogicalRequirementGraph::new(num_vertices, required).unwrap();
        let session = RepairSession::from_owners(&hw, &logical, owners.to_vec()).unwrap();
        SwapShiftEngine::new(&hw, &logical)
            .delta_shift(&session, from, to)
            .unwrap()
    }

    fn exact_options() -> EngineOptions {
        let mut options = EngineOptions::new();
        options.source_pair = SourcePairAccounting::Exact;
        options
    }

    /// Random hardware graph, requirement graph and seed owner map. The first `num_chains`
    /// nodes seed one chain each so that no chain starts empty.
    fn random_instance<T: Algorithm>(
        prng: &mut PRNG<T>,
        num_nodes: usize,
        density: f64,
        num_chains: usize,
        num_required: usize,
    ) -> (HardwareTopology, LogicalRequirementGraph, Vec<usize>) {
        let mut couplers = Vec::new();
        for a in 0..num_nodes {
            for b in a + 1..num_nodes {
                if prng.gen_f64() < density {
                    couplers.push((a, b));
                }
            }
        }

        let mut required = Vec::new();
        for _ in 0..num_required {
            let a = prng.gen_u64() as usize % num_chains;
            let b = prng.gen_u64() as usize % num_chains;
            required.push((a, b));
        }

        let owners = (0..num_nodes)
            .map(|i| {
                if i < num_chains {
                    i
                } else {
                    prng.gen_u64() as usize % num_chains
                }
            })
            .collect();

        (
            HardwareTopology::new(num_nodes, &couplers).unwrap(),
            LogicalRequirementGraph::new(num_chains, &required).unwrap(),
            owners,
        )
    }

    #[test]
    fn test_delta_shift_simple_gain() {
        let owners = [0, 0, 1, 1, 2, 2];
        assert_eq!(delta_shift(3, &[(0, 2)], &owners, 1, 3), 1);
        assert_eq!(delta_shift(3, &[(0, 2)], &owners, 0, 2), 1);
        assert_eq!(delta_shift(3, &[(0, 2)], &owners, 4, 2), 1);
        assert_eq!(delta_shift(3, &[(0, 2)], &owners, 5, 3), 1);
    }

    #[test]
    fn test_delta_shift_simple_gain_two_edges() {
        let owners = [0, 1, 2, 3, 4, 4];
        assert_eq!(delta_shift(5, &[(0, 3), (0, 4)], &owners, 0, 2), 2);
    }

    #[test]
    fn test_delta_shift_parallel_couplers_count_once() {
        // node 2 brings two couplers into chain 3, the edge still counts once
        let owners = [0, 1, 2, 3, 3, 3];
        assert_eq!(delta_shift(4, &[(0, 3)], &owners, 0, 2), 1);
    }

    #[test]
    fn test_delta_shift_no_gain_already_connected() {
        let owners = [0, 0, 1, 2, 2, 2];
        assert_eq!(delta_shift(3, &[(0, 2)], &owners, 0, 2), 0);
        assert_eq!(delta_shift(3, &[(0, 2)], &owners, 1, 3), 0);

        let owners = [0, 0, 0, 1, 2, 2];
        assert_eq!(delta_shift(3, &[(0, 1), (0, 2)], &owners, 0, 2), 0);
        assert_eq!(delta_shift(3, &[(0, 1), (0, 2)], &owners, 1, 3), 0);
    }

    #[test]
    fn test_delta_shift_simple_loss() {
        let owners = [0, 0, 0, 1, 2, 2];
        assert_eq!(delta_shift(3, &[(0, 2)], &owners, 3, 2), -1);
    }

    #[test]
    fn test_delta_shift_multi_loss() {
        let owners = [0, 0, 1, 2, 3, 3];
        let required = [(0, 1), (2, 1), (3, 1)];

        // chains 1 and 3 are taken to stay in contact
        assert_eq!(delta_shift(4, &required, &owners, 4, 2), -2);

        // chain 1 empties, so exact accounting loses (1, 3) too
        let hw = small_grid();
        let logical = LogicalRequirementGraph::new(4, &required).unwrap();
        let session = RepairSession::from_owners(&hw, &logical, owners.to_vec()).unwrap();
        let engine = SwapShiftEngine::with_options(&hw, &logical, exact_options());
        assert_eq!(engine.delta_shift(&session, 4, 2), Ok(-3));
    }

    #[test]
    fn test_delta_shift_no_loss_still_connected() {
        let owners = [0, 0, 1, 2, 2, 2];
        assert_eq!(delta_shift(3, &[(1, 2)], &owners, 1, 3), 0);
    }

    #[test]
    fn test_delta_shift_gain_loss() {
        let owners = [0, 1, 2, 3, 4, 5];
        let required = [(1, 2), (1, 3), (2, 5), (3, 5)];
        assert_eq!(delta_shift(6, &required, &owners, 2, 3), 0);
    }

    #[test]
    fn test_invalid_move_leaves_state() {
        let hw = small_grid();
        let logical = LogicalRequirementGraph::new(3, &[(0, 2)]).unwrap();
        let mut session =
            RepairSession::from_owners(&hw, &logical, vec![0, 0, 1, 1, 2, 2]).unwrap();
        let engine = SwapShiftEngine::new(&hw, &logical);
        let partition = session.partition().clone();
        let ledger = session.ledger().clone();

        assert_eq!(
            engine.delta_shift(&session, 3, 3),
            Err(EmbeddingError::InvalidMove {
                from: 3,
                to: 3,
                reason: MoveViolation::SameNode
            })
        );
        assert_eq!(
            engine.commit(&mut session, 0, 3),
            Err(EmbeddingError::InvalidMove {
                from: 0,
                to: 3,
                reason: MoveViolation::NotAdjacent
            })
        );

        assert_eq!(session.partition(), &partition);
        assert_eq!(session.ledger(), &ledger);
    }

    #[test]
    fn test_commit_matches_recompute() {
        let hw = small_grid();
        let logical = LogicalRequirementGraph::new(3, &[(0, 2)]).unwrap();
        let mut session =
            RepairSession::from_owners(&hw, &logical, vec![0, 0, 1, 1, 2, 2]).unwrap();
        let engine = SwapShiftEngine::new(&hw, &logical);

        for (from, to) in [(1, 3), (4, 2), (5, 3), (0, 1)] {
            engine.commit(&mut session, from, to).unwrap();
            let fresh = ContactLedger::from_partition(&hw, session.partition());
            assert_eq!(session.ledger(), &fresh);
        }
    }

    #[test]
    fn test_fuzz_exact_scores_and_ledger() {
        let mut prng = PRNG {
            generator: JsfLarge::from(42u64),
        };
        let (hw, logical, owners) = random_instance(&mut prng, 40, 0.12, 8, 14);
        let mut session = RepairSession::from_owners(&hw, &logical, owners).unwrap();
        let exact = SwapShiftEngine::with_options(&hw, &logical, exact_options());
        let assumed = SwapShiftEngine::new(&hw, &logical);

        for step in 0..5000 {
            let (from, to) = exact.random_shift(&mut prng).unwrap();
            let delta = exact.delta_shift(&session, from, to).unwrap();
            assert_eq!(exact.delta_shift(&session, from, to), Ok(delta));

            // the two accountings only differ when `to` has no neighbour left in its chain
            let old = session.partition().owner(to).unwrap();
            let keeps_contact = hw
                .neighbors(to)
                .unwrap()
                .iter()
                .any(|&n| session.partition().owner(n) == Ok(old));
            if keeps_contact {
                assert_eq!(assumed.delta_shift(&session, from, to), Ok(delta));
            }

            let before = session.satisfied_count(&logical);
            exact.commit(&mut session, from, to).unwrap();
            let after = session.satisfied_count(&logical);
            assert_eq!(after as i64 - before as i64, delta, "step {step}");

            // undoing the move scores the exact opposite
            if let Some(&back) = hw
                .neighbors(to)
                .unwrap()
                .iter()
                .find(|&&n| session.partition().owner(n) == Ok(old))
            {
                assert_eq!(exact.delta_shift(&session, back, to), Ok(-delta));
            }

            if step % 100 == 0 {
                assert!(session.ledger_is_consistent(&hw), "step {step}");
            }
        }

        assert!(session.ledger_is_consistent(&hw));
    }

    #[test]
    fn test_search_on_random_instance() {
        let mut prng = PRNG {
            generator: JsfLarge::from(3u64),
        };
        let (hw, logical, owners) = random_instance(&mut prng, 60, 0.1, 6, 8);
        let mut session = RepairSession::from_owners(&hw, &logical, owners).unwrap();
        let engine = SwapShiftEngine::new(&hw, &logical);

        let start = session.satisfied_count(&logical);
        let report = search::steepest_ascent(&engine, &mut session);

        assert!(report.satisfied >= start);
        assert_eq!(report.satisfied, session.satisfied_count(&logical));
        assert!(session.ledger_is_consistent(&hw));
    }

    proptest! {
        #[test]
        fn prop_ledger_consistent_under_random_moves(
            seed in any::<u64>(),
            num_nodes in 6usize..30,
            moves in prop::collection::vec((any::<usize>(), any::<usize>()), 1..200),
        ) {
            let mut prng = PRNG {
                generator: JsfLarge::from(seed),
            };
            let (hw, logical, owners) = random_instance(&mut prng, num_nodes, 0.3, 4, 5);
            let mut session = RepairSession::from_owners(&hw, &logical, owners).unwrap();
            let engine = SwapShiftEngine::new(&hw, &logical);

            for (x, y) in moves {
                let to = x % num_nodes;
                let neighbors = hw.neighbors(to).unwrap();
                if neighbors.is_empty() {
                    continue;
                }
                let from = neighbors[y % neighbors.len()];
                engine.commit(&mut session, from, to).unwrap();
            }

            let fresh = ContactLedger::from_partition(&hw, session.partition());
            prop_assert_eq!(session.ledger(), &fresh);
        }

        #[test]
        fn prop_same_chain_moves_score_zero(seed in any::<u64>(), x in any::<usize>()) {
            let mut prng = PRNG {
                generator: JsfLarge::from(seed),
            };
            let (hw, logical, owners) = random_instance(&mut prng, 20, 0.3, 3, 3);
            let mut session = RepairSession::from_owners(&hw, &logical, owners).unwrap();
            let engine = SwapShiftEngine::new(&hw, &logical);

            let to = x % 20;
            let owner = session.partition().owner(to).unwrap();
            let same: Vec<usize> = hw
                .neighbors(to)
                .unwrap()
                .iter()
                .copied()
                .filter(|&n| session.partition().owner(n) == Ok(owner))
                .collect();

            let before: ChainPartition = session.partition().clone();
            for from in same {
                prop_assert_eq!(engine.delta_shift(&session, from, to), Ok(0));
                engine.commit(&mut session, from, to).unwrap();
                prop_assert_eq!(session.partition(), &before);
            }
        }
    }
}
