//! Command sequencing
//!
//! Holds the ordered step model, the per-step dispatcher and the sequencer
//! that drives it, plus the fixed operation sets.

pub mod executor;
pub mod plan;
pub mod sequencer;
pub mod step;


pub use executor::{Dispatcher, ExecutionResult, StepOutcome};
pub use plan::{command_table, Endpoints, Operation};
pub use sequencer::{RunSummary, Sequencer};
pub use step::{CommandTable, Step, Verb};
