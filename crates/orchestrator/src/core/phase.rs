//! Phase roles and the immutable per-phase execution spec.
//!
//! A quote run is a fixed sequence of phases. Each phase is one capability
//! call against the shared browser session; its role decides the template,
//! the model and step budget defaults, and the phase number observers see.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The job a phase performs on the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseRole {
    /// Log in and reach the vehicle search box
    Navigation,
    /// Search the vehicle and read the suggestions
    Extraction,
    /// Pick the best matching vehicle and the postal zone
    Selection,
    /// Walk the remaining form and print the quote
    Completion,
}

impl PhaseRole {
    /// All roles in execution order.
    pub const ALL: [PhaseRole; 4] = [
        PhaseRole::Navigation,
        PhaseRole::Extraction,
        PhaseRole::Selection,
        PhaseRole::Completion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Navigation => "navigation",
            Self::Extraction => "extraction",
            Self::Selection => "selection",
            Self::Completion => "completion",
        }
    }

    /// Phase number reported to observers.
    ///
    /// Extraction and selection share one bucket.
    /// Observer phase number of the final success event, one past the last role.
    pub fn completed_observer_phase() -> i32 {
        Self::ALL
            .iter()
            .map(PhaseRole::observer_phase)
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn observer_phase(&self) -> i32 {
        match self {
            Self::Navigation => 1,
            Self::Extraction | Self::Selection => 2,
            Self::Completion => 3,
        }
    }

    /// Message announcing the start of the phase.
    pub fn start_message(&self) -> &'static str {
        match self {
            Self::Navigation => "Navigating to quote form...",
            Self::Extraction => "Extracting vehicle options...",
            Self::Selection => "Selecting vehicle...",
            Self::Completion => "Completing quote form...",
        }
    }
}

impl fmt::Display for PhaseRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to run one phase. Built once per run, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSpec {
    /// 1-based position; also the execution order
    pub index: usize,
    pub role: PhaseRole,
    /// Rendered natural-language instructions
    pub instructions: String,
    /// Capability configuration identifier
    pub model: String,
    /// Ceiling on capability actions for this phase
    pub step_budget: u32,
}

impl PhaseSpec {
    pub fn observer_phase(&self) -> i32 {
        self.role.observer_phase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_phase_follows_last_role() {
        assert_eq!(PhaseRole::completed_observer_phase(), 4);
        assert!(PhaseRole::ALL
            .iter()
            .all(|r| r.observer_phase() < PhaseRole::completed_observer_phase()));
    }

    #[test]
    fn test_observer_phases_are_monotonic() {
        let phases: Vec<i32> = PhaseRole::ALL.iter().map(|r| r.observer_phase()).collect();
        assert_eq!(phases, vec![1, 2, 2, 3]);
        assert!(phases.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&PhaseRole::Selection).unwrap();
        assert_eq!(json, "\"selection\"");
        assert_eq!(PhaseRole::Completion.to_string(), "completion");
    }
}
