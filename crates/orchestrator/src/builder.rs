//! Task builder: turns a vehicle into the ordered list of phase specs.

use quote_core::Vehicle;
use tracing::debug;

use crate::config::{PhaseModels, PortalConfig, StepBudgets};
use crate::core::{PhaseRole, PhaseSpec};
use crate::error::Result;
use crate::prompts::PhasePrompts;

/// Build the phase specs for one run.
///
/// Validates the vehicle first, so a missing field is reported before any
/// browser session exists. The output depends only on the arguments.
pub fn build_phases(
    vehicle: &Vehicle,
    models: &PhaseModels,
    budgets: &StepBudgets,
    portal: &PortalConfig,
) -> Result<Vec<PhaseSpec>> {
    vehicle.validate()?;

    let phases: Vec<PhaseSpec> = PhaseRole::ALL
        .iter()
        .enumerate()
        .map(|(offset, &role)| PhaseSpec {
            index: offset + 1,
            role,
            instructions: render(role, vehicle, portal),
            model: models.for_role(role).to_string(),
            step_budget: budgets.for_role(role),
        })
        .collect();

    debug!(
        phase_count = phases.len(),
        total_instruction_length = phases.iter().map(|p| p.instructions.len()).sum::<usize>(),
        "Phases built"
    );

    Ok(phases)
}

fn render(role: PhaseRole, vehicle: &Vehicle, portal: &PortalConfig) -> String {
    match role {
        PhaseRole::Navigation => PhasePrompts::navigation(portal),
        PhaseRole::Extraction => PhasePrompts::extraction(vehicle),
        PhaseRole::Selection => PhasePrompts::selection(vehicle),
        PhaseRole::Completion => PhasePrompts::completion(),
    }
}
