//! # statpar-orchestration
//!
//! The coordinator state machine, process and thread isolation, run timing,
//! mode selection, and cross-mode result analysis.

pub mod coordinator;
pub mod interfaces;
pub mod isolation;
pub mod mode_selection;
pub mod orchestrator;
pub mod process;
pub mod thread;
pub mod timing;

pub use coordinator::Coordinator;
pub use interfaces::{IsolationMode, ResultPresenter, RunReport, SlotOutcome, WorkerExit};
pub use isolation::{Delivery, EngineError, WorkerGroup};
pub use orchestrator::{analyze_comparison_results, execute_runs};
pub use process::{run_worker, WorkerCommand, WORKER_FLAG};
