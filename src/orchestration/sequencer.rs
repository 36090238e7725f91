use log::{debug, error, info};

use crate::core::FatalDiagnosticError;

use super::{
    executor::{Dispatcher, ExecutionResult},
    step::CommandTable,
};

/// Results of every dispatched step, in execution order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<ExecutionResult>,
}

impl RunSummary {
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }
}

/// Drives a [`Dispatcher`] over a command table in ascending key order.
pub struct Sequencer {
    dispatcher: Dispatcher,
}

impl Sequencer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Run every step, one at a time.
    ///
    /// A failing step never stops the run. Only a failed debug dump does, and
    /// no later step is executed after it.
    pub async fn run(
        &mut self,
        table: CommandTable,
        debug: bool,
    ) -> Result<RunSummary, FatalDiagnosticError> {
        let mut summary = RunSummary::default();

        for step in table.steps() {
            self.dispatcher.reporter_mut().label(&step.label);
            debug!("Step {} {} {}", step.sequence, step.verb, step.target);

            match self.dispatcher.execute(step, debug).await {
                Ok(Some(result)) => summary.results.push(result),
                Ok(None) => {}
                Err(e) => {
                    error!("Aborting run at step {}: {e}", step.sequence);
                    return Err(e);
                }
            }
        }

        info!(
            "Run finished: {} steps dispatched, {} unsuccessful",
            summary.results.len(),
            summary.failed()
        );
        Ok(summary)
    }
}
