use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use events::{Event, EventBus};
use orchestrator::{
    Capability, Completion, ExecutorConfig, OrchestratorError, ProgressObserver, QuoteExecutor,
    Result, SessionManager,
};
use quote_core::{RunStatus, SessionHandle, Vehicle};

#[derive(Default)]
struct CountingSessions {
    acquired: AtomicUsize,
    released: AtomicUsize,
    fail_acquire: bool,
    fail_release: bool,
}

#[async_trait]
impl SessionManager for CountingSessions {
    async fn acquire(&self) -> Result<SessionHandle> {
        self.acquired.fetch_add(1, Ordering::SeqCst);
        if self.fail_acquire {
            return Err(OrchestratorError::SessionAcquisition(
                "browser failed to launch".to_string(),
            ));
        }
        Ok(SessionHandle::new("browser-1"))
    }

    async fn release(&self, _handle: SessionHandle) -> Result<()> {
        self.released.fetch_add(1, Ordering::SeqCst);
        if self.fail_release {
            return Err(OrchestratorError::SessionRelease("kill failed".to_string()));
        }
        Ok(())
    }
}

/// Fails the call with the given 1-based number.
#[derive(Default)]
struct ScriptedAgent {
    calls: Mutex<Vec<(String, u32)>>,
    fail_on: Option<(usize, &'static str)>,
    hang_on: Option<usize>,
}

#[async_trait]
impl Capability for ScriptedAgent {
    async fn execute(
        &self,
        _instructions: &str,
        model: &str,
        session: &SessionHandle,
        step_budget: u32,
    ) -> Result<Completion> {
        assert_eq!(session.remote_id(), "browser-1");
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((model.to_string(), step_budget));
            calls.len()
        };
        if self.hang_on == Some(call) {
            tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
        }
        if let Some((fail_on, reason)) = self.fail_on {
            if fail_on == call {
                return Err(OrchestratorError::Capability(reason.to_string()));
            }
        }
        Ok(Completion {
            steps_used: 3,
            output: None,
        })
    }
}

#[derive(Default)]
struct RecordingObserver(Mutex<Vec<(i32, String)>>);

impl ProgressObserver for RecordingObserver {
    fn notify(&self, phase: i32, message: &str) {
        self.0.lock().unwrap().push((phase, message.to_string()));
    }
}

impl RecordingObserver {
    fn events(&self) -> Vec<(i32, String)> {
        self.0.lock().unwrap().clone()
    }

    fn phases(&self) -> Vec<i32> {
        self.events().into_iter().map(|(p, _)| p).collect()
    }
}

fn audi() -> Vehicle {
    Vehicle::new("AUDI", "Q3 S LINE SPORT BACK", "2020").with_zip_code("05100")
}

fn fast_config() -> ExecutorConfig {
    ExecutorConfig::new()
        .with_stabilization_delay(Duration::ZERO)
        .with_hold_open(Duration::ZERO)
        .with_phase_timeout(None)
}

fn executor(
    sessions: &Arc<CountingSessions>,
    agent: &Arc<ScriptedAgent>,
    config: ExecutorConfig,
) -> QuoteExecutor {
    QuoteExecutor::new(sessions.clone(), agent.clone(), config)
}

fn assert_progress_contract(phases: &[i32]) {
    let error_positions: Vec<usize> = phases
        .iter()
        .enumerate()
        .filter(|(_, p)| **p == -1)
        .map(|(i, _)| i)
        .collect();
    assert!(error_positions.len() <= 1, "more than one error event");
    if let Some(&position) = error_positions.first() {
        assert_eq!(position, phases.len() - 1, "error event is not last");
    }
    let numbered: Vec<i32> = phases.iter().copied().filter(|p| *p >= 0).collect();
    assert!(
        numbered.windows(2).all(|w| w[0] <= w[1]),
        "phases regressed: {:?}",
        numbered
    );
}

#[tokio::test]
async fn test_all_phases_succeed() {
    let sessions = Arc::new(CountingSessions::default());
    let agent = Arc::new(ScriptedAgent::default());
    let observer = RecordingObserver::default();

    let result = executor(&sessions, &agent, fast_config())
        .run(&audi(), Some(&observer))
        .await;

    assert_eq!(result.status, RunStatus::Success);
    assert_eq!(result.message, "Quote generated successfully");
    assert_eq!(observer.phases(), vec![0, 0, 1, 2, 2, 3, 4]);
    assert_eq!(
        observer.events().last().unwrap().1,
        "Quote completed successfully!"
    );
    assert_eq!(sessions.acquired.load(Ordering::SeqCst), 1);
    assert_eq!(sessions.released.load(Ordering::SeqCst), 1);

    let calls = agent.calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec![
            ("claude-3-5-haiku-20241022".to_string(), 20),
            ("claude-3-5-haiku-20241022".to_string(), 10),
            ("claude-sonnet-4-5-20250929".to_string(), 10),
            ("claude-3-5-haiku-20241022".to_string(), 20),
        ]
    );
}

#[tokio::test]
async fn test_selection_failure_stops_run() {
    let sessions = Arc::new(CountingSessions::default());
    let agent = Arc::new(ScriptedAgent {
        fail_on: Some((3, "element not found")),
        ..Default::default()
    });
    let observer = RecordingObserver::default();

    let result = executor(&sessions, &agent, fast_config())
        .run(&audi(), Some(&observer))
        .await;

    assert_eq!(result.status, RunStatus::Error);
    assert!(result.message.contains("element not found"));

    let events = observer.events();
    let errors: Vec<_> = events.iter().filter(|(p, _)| *p == -1).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].1.contains("element not found"));
    assert_eq!(observer.phases(), vec![0, 0, 1, 2, 2, -1]);
    assert_progress_contract(&observer.phases());

    assert_eq!(agent.calls.lock().unwrap().len(), 3);
    assert_eq!(sessions.released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_release_once_whichever_phase_fails() {
    for failing_call in 1..=4 {
        let sessions = Arc::new(CountingSessions::default());
        let agent = Arc::new(ScriptedAgent {
            fail_on: Some((failing_call, "boom")),
            ..Default::default()
        });
        let observer = RecordingObserver::default();

        let result = executor(&sessions, &agent, fast_config())
            .run(&audi(), Some(&observer))
            .await;

        assert!(!result.is_success());
        assert_eq!(agent.calls.lock().unwrap().len(), failing_call);
        assert_eq!(sessions.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(sessions.released.load(Ordering::SeqCst), 1);
        assert_progress_contract(&observer.phases());
    }
}

#[tokio::test]
async fn test_empty_model_fails_before_acquire() {
    let sessions = Arc::new(CountingSessions::default());
    let agent = Arc::new(ScriptedAgent::default());
    let observer = RecordingObserver::default();

    let mut vehicle = audi();
    vehicle.model = String::new();
    let result = executor(&sessions, &agent, fast_config())
        .run(&vehicle, Some(&observer))
        .await;

    assert_eq!(result.status, RunStatus::Error);
    assert!(result.message.contains("model"));
    assert_eq!(sessions.acquired.load(Ordering::SeqCst), 0);
    assert_eq!(sessions.released.load(Ordering::SeqCst), 0);
    assert!(agent.calls.lock().unwrap().is_empty());
    assert_eq!(observer.phases(), vec![0, -1]);
}

#[tokio::test]
async fn test_acquire_failure_runs_no_phase() {
    let sessions = Arc::new(CountingSessions {
        fail_acquire: true,
        ..Default::default()
    });
    let agent = Arc::new(ScriptedAgent::default());
    let observer = RecordingObserver::default();

    let result = executor(&sessions, &agent, fast_config())
        .run(&audi(), Some(&observer))
        .await;

    assert_eq!(result.status, RunStatus::Error);
    assert!(result.message.contains("browser failed to launch"));
    assert!(agent.calls.lock().unwrap().is_empty());
    assert_eq!(sessions.released.load(Ordering::SeqCst), 0);
    assert_eq!(observer.phases(), vec![0, 0, -1]);
}

#[tokio::test]
async fn test_release_failure_does_not_mask_result() {
    let sessions = Arc::new(CountingSessions {
        fail_release: true,
        ..Default::default()
    });
    let agent = Arc::new(ScriptedAgent {
        fail_on: Some((2, "dropdown never appeared")),
        ..Default::default()
    });

    let result = executor(&sessions, &agent, fast_config())
        .run(&audi(), None)
        .await;

    assert!(result.message.contains("dropdown never appeared"));
    assert_eq!(sessions.released.load(Ordering::SeqCst), 1);

    let sessions = Arc::new(CountingSessions {
        fail_release: true,
        ..Default::default()
    });
    let agent = Arc::new(ScriptedAgent::default());
    let result = executor(&sessions, &agent, fast_config())
        .run(&audi(), None)
        .await;
    assert!(result.is_success());
}

#[tokio::test(start_paused = true)]
async fn test_hung_phase_times_out_and_releases() {
    let sessions = Arc::new(CountingSessions::default());
    let agent = Arc::new(ScriptedAgent {
        hang_on: Some(2),
        ..Default::default()
    });
    let observer = RecordingObserver::default();
    let config = fast_config().with_phase_timeout(Some(Duration::from_secs(300)));

    let result = executor(&sessions, &agent, config)
        .run(&audi(), Some(&observer))
        .await;

    assert_eq!(result.status, RunStatus::Error);
    assert!(result.message.contains("timed out"));
    assert_eq!(agent.calls.lock().unwrap().len(), 2);
    assert_eq!(sessions.released.load(Ordering::SeqCst), 1);
    assert_eq!(observer.phases().last(), Some(&-1));
}

#[tokio::test(start_paused = true)]
async fn test_default_timing_settles_and_holds_open() {
    let sessions = Arc::new(CountingSessions::default());
    let agent = Arc::new(ScriptedAgent::default());

    let started = tokio::time::Instant::now();
    let result = executor(&sessions, &agent, ExecutorConfig::default())
        .run(&audi(), None)
        .await;

    assert!(result.is_success());
    // three 2s stabilization pauses plus the 10s hold-open
    assert_eq!(started.elapsed(), Duration::from_secs(16));
    assert_eq!(sessions.released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_cancelled_run_still_releases() {
    let sessions = Arc::new(CountingSessions::default());
    let agent = Arc::new(ScriptedAgent {
        hang_on: Some(1),
        ..Default::default()
    });
    let quote = executor(&sessions, &agent, fast_config());

    let vehicle = audi();
    let run = quote.run(&vehicle, None);
    let timed_out = tokio::time::timeout(Duration::from_millis(50), run).await;
    assert!(timed_out.is_err());

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(sessions.acquired.load(Ordering::SeqCst), 1);
    assert_eq!(sessions.released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_lifecycle_events_on_bus() {
    let sessions = Arc::new(CountingSessions::default());
    let agent = Arc::new(ScriptedAgent::default());
    let bus = EventBus::new();
    let mut rx = bus.subscribe();

    let result = executor(&sessions, &agent, fast_config())
        .with_event_bus(bus)
        .run(&audi(), None)
        .await;
    assert!(result.is_success());

    let first = rx.try_recv().unwrap();
    let run_id = match &first.event {
        Event::RunStarted { run_id, vehicle } => {
            assert_eq!(vehicle, "AUDI Q3 S LINE SPORT BACK 2020");
            *run_id
        }
        other => panic!("Expected run.started, got {:?}", other),
    };

    let rest = EventBus::collect_run(rx, run_id).await;
    assert!(matches!(
        rest.first().map(|e| &e.event),
        Some(Event::Progress { phase: 0, .. })
    ));
    assert!(matches!(
        rest.last().map(|e| &e.event),
        Some(Event::RunCompleted { .. })
    ));
    assert!(rest.windows(2).all(|w| w[0].sequence < w[1].sequence));
    assert!(first.sequence < rest[0].sequence);

    let started: Vec<usize> = rest
        .iter()
        .filter_map(|e| match &e.event {
            Event::PhaseStarted { index, .. } => Some(*index),
            _ => None,
        })
        .collect();
    assert_eq!(started, vec![1, 2, 3, 4]);
    assert!(rest.iter().any(|e| matches!(
        e.event,
        Event::SessionReleased { success: true, .. }
    )));
}

#[tokio::test]
async fn test_failed_run_publishes_run_failed() {
    let sessions = Arc::new(CountingSessions::default());
    let agent = Arc::new(ScriptedAgent {
        fail_on: Some((1, "login rejected")),
        ..Default::default()
    });
    let bus = EventBus::new();
    let mut rx = bus.subscribe();

    let result = executor(&sessions, &agent, fast_config())
        .with_event_bus(bus)
        .run(&audi(), None)
        .await;
    assert!(!result.is_success());

    let run_id = rx.try_recv().unwrap().event.run_id();
    let rest = EventBus::collect_run(rx, run_id).await;
    match rest.last().map(|e| &e.event) {
        Some(Event::RunFailed { message, .. }) => assert!(message.contains("login rejected")),
        other => panic!("Expected run.failed, got {:?}", other),
    }
    let terminal_progress = rest
        .iter()
        .filter(|e| matches!(e.event, Event::Progress { terminal_error: true, .. }))
        .count();
    assert_eq!(terminal_progress, 1);
}
