//! # Repair drivers
//!
//! Reference loops around the swap-shift engine. The acceptance decision always belongs to the
//! caller through [`AcceptancePolicy`]; the drivers only generate candidates, ask the engine for
//! scores and commit what the policy accepts. These are:
//! - Policy driven random search
//! - Steepest ascent with parallel candidate scoring

use crate::engine::SwapShiftEngine;
use crate::error::EmbeddingError;
use crate::repairlogger::RepairLogger;
use crate::session::RepairSession;
use smolprng::{Algorithm, JsfLarge, PRNG};
use tracing::warn;

/// Decides whether a scored shift is committed. `step` counts candidates drawn so far, which is
/// what a temperature schedule would be keyed on.
pub trait AcceptancePolicy {
    fn accept(&mut self, delta: i64, step: usize) -> bool;
}

impl<F: FnMut(i64, usize) -> bool> AcceptancePolicy for F {
    fn accept(&mut self, delta: i64, step: usize) -> bool {
        self(delta, step)
    }
}

/// Outcome of a repair run. `found` means every required edge ended up satisfied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairReport {
    pub steps: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub satisfied: usize,
    pub required: usize,
    pub found: bool,
}

impl RepairReport {
    fn refresh(&mut self, engine: &SwapShiftEngine, session: &RepairSession) {
        self.satisfied = session.satisfied_count(engine.logical);
        self.required = engine.logical.num_required();
        self.found = self.satisfied == self.required;
    }
}

/// Draws random shifts, scores each and commits those the policy accepts, until every required
/// edge is satisfied or `engine.options.max_steps` candidates were drawn. Shifts refused by the
/// connectivity policy count as rejected.
///
/// Example:
/// ``` rust
/// use ember::topology::{HardwareTopology, LogicalRequirementGraph};
/// use ember::session::RepairSession;
/// use ember::engine::SwapShiftEngine;
/// use ember::search::run_repair;
/// use smolprng::{PRNG, JsfLarge};
///
/// let hw = HardwareTopology::new(6, &[(0, 1), (0, 2), (1, 3), (2, 3), (2, 4), (3, 5), (4, 5)]).unwrap();
/// let logical = LogicalRequirementGraph::new(3, &[(0, 2)]).unwrap();
/// let mut session = RepairSession::from_owners(&hw, &logical, vec![0, 0, 1, 1, 2, 2]).unwrap();
/// let engine = SwapShiftEngine::new(&hw, &logical);
///
/// let mut prng = PRNG {
///    generator: JsfLarge::default(),
/// };
///
/// // greedy: only improving shifts
/// let report = run_repair(&engine, &mut session, |delta: i64, _: usize| delta > 0, &mut prng);
/// assert!(report.found);
/// ```
pub fn run_repair<T: Algorithm, P: AcceptancePolicy>(
    engine: &SwapShiftEngine,
    session: &mut RepairSession,
    mut policy: P,
    prng: &mut PRNG<T>,
) -> RepairReport {
    let logger = RepairLogger::new(engine.options.verbose);
    logger.output_header(engine.hardware, engine.logical, session);

    let mut report = RepairReport::default();
    report.refresh(engine, session);
    let log_every = (engine.options.max_steps / 10).max(1);

    while !report.found && report.steps < engine.options.max_steps {
        let Some((from, to)) = engine.random_shift(prng) else {
            break;
        };
        report.steps += 1;

        match engine.delta_shift(session, from, to) {
            Ok(delta) if policy.accept(delta, report.steps) => {
                match engine.commit(session, from, to) {
                    Ok(()) => {
                        report.accepted += 1;
                        logger.output_shift(from, to, delta);
                        if delta != 0 {
                            report.refresh(engine, session);
                        }
                    }
                    Err(EmbeddingError::MoveRejected { .. }) => report.rejected += 1,
                    Err(err) => {
                        warn!(%err, from, to, "repair stopped");
                        break;
                    }
                }
            }
            Ok(_) => report.rejected += 1,
            Err(err) => {
                warn!(%err, from, to, "repair stopped, shift could not be scored");
                break;
            }
        }

        if report.steps % log_every == 0 {
            logger.generate_output_line(&report);
        }
    }

    report.refresh(engine, session);
    logger.generate_exit_line(&report);
    report
}

/// [`run_repair`] with a `JsfLarge` generator seeded from `engine.options.seed`, so a run is
/// reproducible from its options alone.
pub fn run_seeded_repair<P: AcceptancePolicy>(
    engine: &SwapShiftEngine,
    session: &mut RepairSession,
    policy: P,
) -> RepairReport {
    let mut prng = PRNG {
        generator: JsfLarge::from(engine.options.seed as u64),
    };
    run_repair(engine, session, policy, &mut prng)
}

/// Repeatedly commits the best strictly improving shift, scoring all candidates in parallel,
/// until no shift improves or `engine.options.max_steps` shifts were committed. Candidates
/// refused by the connectivity policy are skipped and only count as rejected.
pub fn steepest_ascent(engine: &SwapShiftEngine, session: &mut RepairSession) -> RepairReport {
    let logger = RepairLogger::new(engine.options.verbose);
    logger.output_header(engine.hardware, engine.logical, session);

    let mut report = RepairReport::default();
    report.refresh(engine, session);

    while !report.found && report.steps < engine.options.max_steps {
        let mut candidates = engine.candidate_shifts(session);
        let mut committed = false;

        while let Some(((from, to), delta)) = engine.best_shift(session, &candidates) {
            if delta <= 0 {
                break;
            }

            match engine.commit(session, from, to) {
                Ok(()) => {
                    report.steps += 1;
                    report.accepted += 1;
                    logger.output_shift(from, to, delta);
                    committed = true;
                    break;
                }
                Err(EmbeddingError::MoveRejected { .. }) => {
                    report.rejected += 1;
                    candidates.retain(|&c| c != (from, to));
                }
                Err(err) => {
                    warn!(%err, "repair stopped");
                    break;
                }
            }
        }

        if !committed {
            break;
        }
        report.refresh(engine, session);
        logger.generate_output_line(&report);
    }

    report.refresh(engine, session);
    logger.generate_exit_line(&report);
    report
}
