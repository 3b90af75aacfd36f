use crate::search::RepairReport;
use crate::session::RepairSession;
use crate::topology::{HardwareTopology, LogicalRequirementGraph};
use tracing::info;

/// This is the main logic behind the repair driver output
///
/// It has varying levels of output, where 0 means nothing is emitted, and each additional level
/// includes everything previous. Lines go to `tracing` at info level.
///
/// 0 - Nothing
/// 1 - Header, Progress Log, and Finish
/// 2 - Each Accepted Shift
///
pub struct RepairLogger {
    pub output_level: usize,
}

impl RepairLogger {
    pub const fn new(level: usize) -> Self {
        Self {
            output_level: level,
        }
    }

    pub fn output_header(
        &self,
        hardware: &HardwareTopology,
        logical: &LogicalRequirementGraph,
        session: &RepairSession,
    ) {
        if self.output_level < 1 {
            return;
        }

        let version_number = env!("CARGO_PKG_VERSION");
        let satisfied = session.satisfied_count(logical);
        let required = logical.num_required();

        info!("Ember: swap-shift embedding repair");
        info!("Version number {version_number}");
        info!(
            "Hardware: {} nodes, {} couplers",
            hardware.num_nodes(),
            hardware.num_couplers()
        );
        info!("Logical: {} vertices, {required} required edges", logical.num_vertices());
        info!("Satisfied at start: {satisfied}/{required}");
        info!("------------------------------------------------------");
        info!("Steps | Accepted | Rejected | Satisfied");
    }

    pub fn generate_output_line(&self, report: &RepairReport) {
        if self.output_level < 1 {
            return;
        }

        let steps = report.steps;
        let accepted = report.accepted;
        let rejected = report.rejected;
        let satisfied = report.satisfied;
        info!("{steps} | {accepted} | {rejected} | {satisfied}");
    }

    pub fn output_shift(&self, from: usize, to: usize, delta: i64) {
        if self.output_level < 2 {
            return;
        }

        info!("shift {to} -> chain of {from}: {delta:+}");
    }

    pub fn generate_exit_line(&self, report: &RepairReport) {
        if self.output_level < 1 {
            return;
        }

        let outcome = if report.found { "found" } else { "not found" };
        info!("------------------------------------------------------");
        info!("Repair Finished");
        info!("Embedding: {outcome}");
        info!("Satisfied: {}/{}", report.satisfied, report.required);
        info!("Steps: {}", report.steps);
        info!("Accepted Shifts: {}", report.accepted);
        info!("------------------------------------------------------");
    }
}
