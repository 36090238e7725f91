//! Step execution
//!
//! Turns a single [`Step`] into a request, sends it, and reports the outcome.

use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use log::{debug, warn};

use crate::{
    core::{FatalDiagnosticError, Transport},
    utils::{request::RequestBuilder, response::Reporter},
};

use super::step::{Step, Verb};

/// How a dispatched step ended.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// A response came back, whatever its status
    Completed { status: StatusCode, body: Bytes },
    /// The request could not be built
    BuildFailed(String),
    /// The request could not be delivered
    TransportFailed(String),
}

/// Transient per-step record of what happened.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    pub sequence: u32,
    pub verb: Verb,
    pub target: String,
    pub outcome: StepOutcome,
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(&self.outcome, StepOutcome::Completed { status, .. } if status.is_success())
    }

    pub fn status(&self) -> Option<StatusCode> {
        match &self.outcome {
            StepOutcome::Completed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Executes steps one at a time against a transport.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    reporter: Reporter,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, reporter: Reporter) -> Self {
        Self {
            transport,
            reporter,
        }
    }

    pub fn reporter_mut(&mut self) -> &mut Reporter {
        &mut self.reporter
    }

    /// Execute one step.
    ///
    /// Returns `Ok(None)` for PATCH steps, which are skipped. Build and
    /// transport failures are reported and returned inside the result; only a
    /// failed debug dump is an error.
    pub async fn execute(
        &mut self,
        step: &Step,
        debug: bool,
    ) -> Result<Option<ExecutionResult>, FatalDiagnosticError> {
        match step.verb {
            Verb::GET | Verb::POST | Verb::DELETE => self.send(step, debug).await.map(Some),
            Verb::PATCH => {
                debug!("Skipping PATCH step {} [{}]", step.sequence, step.target);
                Ok(None)
            }
        }
    }

    async fn send(
        &mut self,
        step: &Step,
        debug: bool,
    ) -> Result<ExecutionResult, FatalDiagnosticError> {
        let result = |outcome| ExecutionResult {
            sequence: step.sequence,
            verb: step.verb,
            target: step.target.clone(),
            outcome,
        };

        let argument = step.argument.as_deref();
        let request = match RequestBuilder::build(step.verb, &step.target, argument) {
            Ok(request) => request,
            Err(e) => {
                warn!("Step {} failed to build request", step.sequence);
                debug!("Step {} build error: {e}", step.sequence);
                self.reporter.build_error(step.verb, &step.target, &e, debug);
                return Ok(result(StepOutcome::BuildFailed(e.to_string())));
            }
        };

        if debug {
            self.reporter.dump(&request)?;
        }

        debug!(
            "Sending {} {} ({} body bytes)",
            request.method,
            request.target,
            request.body_len()
        );

        match self.transport.send(&request).await {
            Ok(response) => {
                debug!("{} {} -> {}", request.method, request.target, response.status);
                if !response.status.is_success() {
                    warn!(
                        "Step {} returned status {}",
                        step.sequence, response.status
                    );
                }
                self.reporter.response(&response);
                Ok(result(StepOutcome::Completed {
                    status: response.status,
                    body: response.body,
                }))
            }
            Err(e) => {
                warn!("Step {} transport error", step.sequence);
                debug!("Step {} transport error: {e}", step.sequence);
                self.reporter.transport_error(&e, debug);
                Ok(result(StepOutcome::TransportFailed(e.to_string())))
            }
        }
    }
}
