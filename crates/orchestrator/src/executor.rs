use quote_core::{RunResult, Vehicle, SETUP_PHASE};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use events::{Event, EventBus};

use crate::builder::build_phases;
use crate::config::ExecutorConfig;
use crate::core::{PhaseOrchestrator, ProgressObserver, ProgressReporter, RunOutcome};
use crate::resources::SessionGuard;
use crate::services::{Capability, SessionManager};

/// Entry point for quote runs.
///
/// One call to [`QuoteExecutor::run`] builds the phases, opens one browser
/// session, runs every phase against it and releases it, whatever happens.
/// Runs share nothing but the collaborators, so separate runs may execute
/// concurrently, each with its own session.
pub struct QuoteExecutor {
    sessions: Arc<dyn SessionManager>,
    capability: Arc<dyn Capability>,
    config: ExecutorConfig,
    event_bus: Option<EventBus>,
}

impl QuoteExecutor {
    pub fn new(
        sessions: Arc<dyn SessionManager>,
        capability: Arc<dyn Capability>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            sessions,
            capability,
            config,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub async fn run(
        &self,
        vehicle: &Vehicle,
        observer: Option<&dyn ProgressObserver>,
    ) -> RunResult {
        let run_id = Uuid::new_v4();
        let mut reporter = ProgressReporter::new(run_id, observer);
        if let Some(ref bus) = self.event_bus {
            reporter = reporter.with_event_bus(bus.clone());
        }

        info!(
            run_id = %run_id,
            brand = %vehicle.brand,
            model = %vehicle.model,
            year = %vehicle.year,
            "Starting quote run"
        );
        reporter.publish(Event::RunStarted {
            run_id,
            vehicle: vehicle.search_query(),
        });

        let outcome = self.run_inner(vehicle, &mut reporter).await;

        match &outcome {
            RunOutcome::Completed { .. } => reporter.publish(Event::RunCompleted { run_id }),
            RunOutcome::Failed { error: e, .. } => reporter.publish(Event::RunFailed {
                run_id,
                message: e.to_string(),
            }),
        }

        RunResult::from(outcome)
    }

    async fn run_inner(&self, vehicle: &Vehicle, reporter: &mut ProgressReporter<'_>) -> RunOutcome {
        reporter.notify(SETUP_PHASE, "Building prompts...");
        let phases = match build_phases(
            vehicle,
            &self.config.models,
            &self.config.step_budgets,
            &self.config.portal,
        ) {
            Ok(phases) => phases,
            Err(e) => {
                reporter.fail(&e.to_string());
                return RunOutcome::failed_at_start(e);
            }
        };

        reporter.notify(SETUP_PHASE, "Starting browser...");
        let guard = match SessionGuard::acquire(Arc::clone(&self.sessions)).await {
            Ok(guard) => guard,
            Err(e) => {
                reporter.fail(&e.to_string());
                return RunOutcome::failed_at_start(e);
            }
        };
        let session_id = guard.handle().id();
        reporter.publish(Event::SessionAcquired {
            run_id: reporter.run_id(),
            session_id,
        });

        let orchestrator = PhaseOrchestrator::new(Arc::clone(&self.capability))
            .with_stabilization_delay(self.config.stabilization_delay())
            .with_phase_timeout(self.config.phase_timeout());
        let outcome = orchestrator.run(&phases, guard.handle(), reporter).await;

        let hold_open = self.config.hold_open();
        if outcome.is_completed() && !hold_open.is_zero() {
            debug!(
                hold_open_ms = hold_open.as_millis() as u64,
                "Keeping browser open before release"
            );
            tokio::time::sleep(hold_open).await;
        }

        let released = guard.release().await;
        reporter.publish(Event::SessionReleased {
            run_id: reporter.run_id(),
            session_id,
            success: released,
        });

        outcome
    }
}
