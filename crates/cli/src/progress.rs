use indicatif::{ProgressBar, ProgressStyle};
use orchestrator::{PhaseRole, ProgressObserver};
use quote_core::RUN_ERROR_PHASE;

/// Renders run progress as a terminal progress bar.
pub struct BarObserver {
    bar: ProgressBar,
    final_phase: u64,
}

impl BarObserver {
    pub fn new() -> Self {
        let observer = Self::with_bar(ProgressBar::new(0));
        observer.bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        observer
            .bar
            .enable_steady_tick(std::time::Duration::from_millis(120));
        observer
    }

    fn with_bar(bar: ProgressBar) -> Self {
        let final_phase = PhaseRole::completed_observer_phase().max(1) as u64;
        bar.set_length(final_phase);
        Self { bar, final_phase }
    }

    pub fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

impl ProgressObserver for BarObserver {
    fn notify(&self, phase: i32, message: &str) {
        if phase == RUN_ERROR_PHASE {
            self.bar.abandon_with_message(message.to_string());
            return;
        }
        let position = phase.max(0) as u64;
        self.bar.set_position(position);
        self.bar.set_message(message.to_string());
        if position >= self.final_phase {
            self.bar.finish_with_message(message.to_string());
        }
    }
}
