//! Snapshot reconciliation: turns successive process table snapshots into
//! ordered row edit scripts. Pure; knows nothing about terminals or the OS.

pub mod algorithm;
pub mod order;
pub mod row;
pub mod view;

pub use algorithm::{EditOp, EditScript, Reconciliation, ScriptStats, apply, reconcile};
pub use order::{SortMode, ViewFilter};
pub use row::{Parity, RenderedRow, Severity};
pub use view::ProcessView;
