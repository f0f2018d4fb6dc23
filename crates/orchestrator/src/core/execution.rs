//! Phase orchestrator: runs phase specs in order against one session.
//!
//! The orchestrator walks the linear state machine
//! `Init -> Phase(1) -> ... -> Phase(N) -> Done`, leaving it for `Error`
//! on the first failure. It never retries, never skips ahead and never
//! revisits a phase.

use quote_core::SessionHandle;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use events::Event;

use crate::error::{OrchestratorError, Result};
use crate::services::{Capability, Completion};
use crate::state_machine::{RunState, RunStateMachine};

use super::events::ProgressReporter;
use super::phase::{PhaseRole, PhaseSpec};

/// Message of the final success progress event.
pub const COMPLETED_MESSAGE: &str = "Quote completed successfully!";

/// Terminal state of a run.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every phase completed
    Completed { phases_run: usize },
    /// The run stopped on `error` while in `failed_at`; later phases did
    /// not execute
    Failed {
        error: OrchestratorError,
        failed_at: RunState,
    },
}

impl RunOutcome {
    /// Failure raised before any phase ran.
    pub fn failed_at_start(error: OrchestratorError) -> Self {
        RunOutcome::Failed {
            error,
            failed_at: RunState::Init,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

/// Sequences phases against the shared session.
pub struct PhaseOrchestrator {
    capability: Arc<dyn Capability>,
    stabilization_delay: Duration,
    phase_timeout: Option<Duration>,
}

impl PhaseOrchestrator {
    pub fn new(capability: Arc<dyn Capability>) -> Self {
        Self {
            capability,
            stabilization_delay: Duration::ZERO,
            phase_timeout: None,
        }
    }

    /// Pause after every phase except the last.
    pub fn with_stabilization_delay(mut self, delay: Duration) -> Self {
        self.stabilization_delay = delay;
        self
    }

    /// Fail a phase that runs longer than `timeout`.
    pub fn with_phase_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.phase_timeout = timeout;
        self
    }

    /// Run `phases` in index order.
    ///
    /// On failure the terminal error event is emitted here; the caller only
    /// releases the session and converts the outcome.
    pub async fn run(
        &self,
        phases: &[PhaseSpec],
        session: &SessionHandle,
        reporter: &mut ProgressReporter<'_>,
    ) -> RunOutcome {
        let machine = RunStateMachine::new(phases.len());
        let mut state = RunState::Init;

        match self
            .run_phases(phases, session, reporter, &machine, &mut state)
            .await
        {
            Ok(phases_run) => {
                let final_phase = phases
                    .last()
                    .map(|p| p.observer_phase() + 1)
                    .unwrap_or_else(PhaseRole::completed_observer_phase);
                reporter.notify(final_phase, COMPLETED_MESSAGE);
                info!(run_id = %reporter.run_id(), phases_run, "All phases completed");
                RunOutcome::Completed { phases_run }
            }
            Err(error) => {
                // Every non-terminal state has an edge to Error.
                if let Err(e) = machine.validate_transition(state, RunState::Error) {
                    warn!(run_id = %reporter.run_id(), error = %e, "Unexpected error transition");
                }
                debug!(run_id = %reporter.run_id(), from = %state, "Run entered error state");
                reporter.fail(&error.to_string());
                RunOutcome::Failed {
                    error,
                    failed_at: state,
                }
            }
        }
    }

    async fn run_phases(
        &self,
        phases: &[PhaseSpec],
        session: &SessionHandle,
        reporter: &mut ProgressReporter<'_>,
        machine: &RunStateMachine,
        state: &mut RunState,
    ) -> Result<usize> {
        for (position, phase) in phases.iter().enumerate() {
            let next = RunState::Phase(phase.index);
            machine.validate_transition(*state, next)?;
            *state = next;

            reporter.notify(phase.observer_phase(), phase.role.start_message());
            reporter.publish(Event::PhaseStarted {
                run_id: reporter.run_id(),
                index: phase.index,
                role: phase.role.to_string(),
                model: phase.model.clone(),
            });

            let completion = self.execute_phase(phase, session).await?;

            info!(
                run_id = %reporter.run_id(),
                phase = phase.index,
                role = %phase.role,
                steps_used = completion.steps_used,
                "Phase completed"
            );
            reporter.publish(Event::PhaseCompleted {
                run_id: reporter.run_id(),
                index: phase.index,
                role: phase.role.to_string(),
                steps_used: completion.steps_used,
            });

            let is_last = position + 1 == phases.len();
            if !is_last && !self.stabilization_delay.is_zero() {
                debug!(
                    delay_ms = self.stabilization_delay.as_millis() as u64,
                    "Waiting for page to settle"
                );
                tokio::time::sleep(self.stabilization_delay).await;
            }
        }

        machine.validate_transition(*state, RunState::Done)?;
        *state = RunState::Done;
        Ok(phases.len())
    }

    async fn execute_phase(&self, phase: &PhaseSpec, session: &SessionHandle) -> Result<Completion> {
        info!(
            phase = phase.index,
            role = %phase.role,
            model = %phase.model,
            step_budget = phase.step_budget,
            session_id = %session.id(),
            "Executing phase"
        );

        let call = self.capability.execute(
            &phase.instructions,
            &phase.model,
            session,
            phase.step_budget,
        );

        let result = match self.phase_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, call).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        phase = phase.index,
                        timeout_ms = timeout.as_millis() as u64,
                        "Phase deadline expired"
                    );
                    return Err(OrchestratorError::PhaseTimeout {
                        index: phase.index,
                        role: phase.role,
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
            },
            None => call.await,
        };

        result.map_err(|e| {
            let reason = match e {
                OrchestratorError::Capability(reason) => reason,
                other => other.to_string(),
            };
            OrchestratorError::phase_failed(phase.index, phase.role, reason)
        })
    }
}
