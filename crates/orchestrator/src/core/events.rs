//! Progress reporting with ordering guarantees.
//!
//! [`ProgressReporter`] is the single path through which a run talks to its
//! observer. It enforces the observer contract: phase numbers never go
//! down, and the run-level error event (phase `-1`) is emitted at most once
//! and is always the last event. Every forwarded event is also published on
//! the optional [`EventBus`] through an [`OrderedEventEmitter`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use events::{Event, EventBus, EventEnvelope};
use quote_core::{ProgressEvent, RUN_ERROR_PHASE};

/// Receives phase transitions and the terminal error of a run.
pub trait ProgressObserver: Send + Sync {
    fn notify(&self, phase: i32, message: &str);
}

impl<F> ProgressObserver for F
where
    F: Fn(i32, &str) + Send + Sync,
{
    fn notify(&self, phase: i32, message: &str) {
        self(phase, message)
    }
}

/// Event emitter with per-run sequence numbers.
#[derive(Clone)]
pub struct OrderedEventEmitter {
    bus: EventBus,
    sequence: Arc<AtomicU64>,
}

impl OrderedEventEmitter {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Emit an event with the next sequence number.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.bus.publish(EventEnvelope::new(seq, event));
    }

    pub fn current_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

/// Per-run progress channel to the observer and the event bus.
pub struct ProgressReporter<'a> {
    run_id: Uuid,
    observer: Option<&'a dyn ProgressObserver>,
    emitter: Option<OrderedEventEmitter>,
    last_phase: Option<i32>,
    terminated: bool,
    emitted: usize,
}

impl<'a> ProgressReporter<'a> {
    pub fn new(run_id: Uuid, observer: Option<&'a dyn ProgressObserver>) -> Self {
        Self {
            run_id,
            observer,
            emitter: None,
            last_phase: None,
            terminated: false,
            emitted: 0,
        }
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.emitter = Some(OrderedEventEmitter::new(bus));
        self
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Whether the terminal error event was already sent.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Number of events forwarded to the observer.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Report progress for a numbered phase.
    ///
    /// Events that would break the ordering contract are dropped and logged.
    pub fn notify(&mut self, phase: i32, message: &str) {
        if phase == RUN_ERROR_PHASE {
            self.fail(message);
            return;
        }
        if self.terminated {
            warn!(run_id = %self.run_id, phase, "Progress after terminal error dropped");
            return;
        }
        if let Some(last) = self.last_phase {
            if phase < last {
                warn!(
                    run_id = %self.run_id,
                    phase,
                    last_phase = last,
                    "Out-of-order progress event dropped"
                );
                return;
            }
        }

        debug!(run_id = %self.run_id, phase, text = message, "Progress");
        self.last_phase = Some(phase);
        self.forward(ProgressEvent::new(phase, message));
    }

    /// Report the run-level error. Only the first call is forwarded.
    pub fn fail(&mut self, reason: &str) {
        if self.terminated {
            warn!(run_id = %self.run_id, reason, "Duplicate terminal error dropped");
            return;
        }

        error!(run_id = %self.run_id, reason, "Run failed");
        self.terminated = true;
        self.forward(ProgressEvent::error(format!("Error: {}", reason)));
    }

    /// Publish a lifecycle event on the bus without notifying the observer.
    pub fn publish(&self, event: Event) {
        if let Some(ref emitter) = self.emitter {
            emitter.emit(event);
        }
    }

    fn forward(&mut self, event: ProgressEvent) {
        if let Some(observer) = self.observer {
            observer.notify(event.phase, &event.message);
        }
        self.emitted += 1;
        self.publish(Event::Progress {
            run_id: self.run_id,
            phase: event.phase,
            message: event.message,
            terminal_error: event.is_terminal_error,
        });
    }
}
