//! Reconciliation: bring a calendar in line with the desired schedule.

mod change;
mod engine;
mod plan;
mod report;

pub use change::{Change, ChangeKind};
pub use engine::Reconciler;
pub use plan::ReconcilePlan;
pub use report::{BatchReport, ChangeReport, Outcome, ReconcileResult};
