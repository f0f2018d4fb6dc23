//! Run configuration: per-phase models, step budgets, portal access and timing.
//!
//! Every value has a documented default and can be overridden from a config
//! file (serde) or from named keys through [`ExecutorConfig::apply_overrides`].
//! Nothing here reads process state on its own; callers pass the lookup.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::PhaseRole;

pub const DEFAULT_NAVIGATION_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_EXTRACTION_MODEL: &str = "claude-3-5-haiku-20241022";
pub const DEFAULT_SELECTION_MODEL: &str = "claude-sonnet-4-5-20250929";
pub const DEFAULT_COMPLETION_MODEL: &str = "claude-3-5-haiku-20241022";

pub const NAVIGATION_MODEL_KEY: &str = "NAVIGATION_MODEL";
pub const EXTRACTION_MODEL_KEY: &str = "EXTRACT_MODEL";
pub const SELECTION_MODEL_KEY: &str = "SELECT_MODEL";
pub const COMPLETION_MODEL_KEY: &str = "COMPLETION_MODEL";

pub const AGENT_KEY_KEY: &str = "QUALITAS_AGENT_KEY";
pub const ACCOUNT_KEY: &str = "QUALITAS_ACCOUNT";
pub const PASSWORD_KEY: &str = "QUALITAS_PASSWORD";

pub const DEFAULT_LOGIN_URL: &str = "https://agentes360.qualitas.com.mx/web/guest/home";

/// Capability model used by each phase role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhaseModels {
    pub navigation: String,
    pub extraction: String,
    pub selection: String,
    pub completion: String,
}

impl Default for PhaseModels {
    fn default() -> Self {
        Self {
            navigation: DEFAULT_NAVIGATION_MODEL.to_string(),
            extraction: DEFAULT_EXTRACTION_MODEL.to_string(),
            selection: DEFAULT_SELECTION_MODEL.to_string(),
            completion: DEFAULT_COMPLETION_MODEL.to_string(),
        }
    }
}

impl PhaseModels {
    pub fn for_role(&self, role: PhaseRole) -> &str {
        match role {
            PhaseRole::Navigation => &self.navigation,
            PhaseRole::Extraction => &self.extraction,
            PhaseRole::Selection => &self.selection,
            PhaseRole::Completion => &self.completion,
        }
    }

    /// Configuration key that overrides the model of `role`.
    pub fn key_for(role: PhaseRole) -> &'static str {
        match role {
            PhaseRole::Navigation => NAVIGATION_MODEL_KEY,
            PhaseRole::Extraction => EXTRACTION_MODEL_KEY,
            PhaseRole::Selection => SELECTION_MODEL_KEY,
            PhaseRole::Completion => COMPLETION_MODEL_KEY,
        }
    }

    pub fn with_model(mut self, role: PhaseRole, model: impl Into<String>) -> Self {
        let model = model.into();
        match role {
            PhaseRole::Navigation => self.navigation = model,
            PhaseRole::Extraction => self.extraction = model,
            PhaseRole::Selection => self.selection = model,
            PhaseRole::Completion => self.completion = model,
        }
        self
    }

    /// Replace models for which `lookup` returns a non-empty value.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        for role in PhaseRole::ALL {
            if let Some(model) = lookup(Self::key_for(role)).filter(|m| !m.trim().is_empty()) {
                self = self.with_model(role, model.trim());
            }
        }
        self
    }
}

/// Maximum capability actions per phase role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepBudgets {
    pub navigation: u32,
    pub extraction: u32,
    pub selection: u32,
    pub completion: u32,
}

impl Default for StepBudgets {
    fn default() -> Self {
        Self {
            navigation: 20,
            extraction: 10,
            selection: 10,
            completion: 20,
        }
    }
}

impl StepBudgets {
    /// Budget for `role`, never below one step.
    pub fn for_role(&self, role: PhaseRole) -> u32 {
        let budget = match role {
            PhaseRole::Navigation => self.navigation,
            PhaseRole::Extraction => self.extraction,
            PhaseRole::Selection => self.selection,
            PhaseRole::Completion => self.completion,
        };
        budget.max(1)
    }
}

/// Where and as whom the navigation phase logs in.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    pub login_url: String,
    pub agent_key: String,
    pub account: String,
    pub password: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            agent_key: String::new(),
            account: String::new(),
            password: String::new(),
        }
    }
}

impl PortalConfig {
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(AGENT_KEY_KEY) {
            self.agent_key = value;
        }
        if let Some(value) = lookup(ACCOUNT_KEY) {
            self.account = value;
        }
        if let Some(value) = lookup(PASSWORD_KEY) {
            self.password = value;
        }
        self
    }
}

impl std::fmt::Debug for PortalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalConfig")
            .field("login_url", &self.login_url)
            .field("agent_key", &self.agent_key)
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for a [`crate::QuoteExecutor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Pause after each non-final phase so the page can settle
    pub stabilization_delay_ms: u64,
    /// Keep the browser open after a successful quote before releasing it
    pub hold_open_ms: u64,
    /// Wall-clock limit for a single phase; zero disables it
    pub phase_timeout_ms: u64,
    pub models: PhaseModels,
    pub step_budgets: StepBudgets,
    pub portal: PortalConfig,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            stabilization_delay_ms: 2_000,
            hold_open_ms: 10_000,
            phase_timeout_ms: 600_000,
            models: PhaseModels::default(),
            step_budgets: StepBudgets::default(),
            portal: PortalConfig::default(),
        }
    }
}

impl ExecutorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_models(mut self, models: PhaseModels) -> Self {
        self.models = models;
        self
    }

    pub fn with_step_budgets(mut self, budgets: StepBudgets) -> Self {
        self.step_budgets = budgets;
        self
    }

    pub fn with_portal(mut self, portal: PortalConfig) -> Self {
        self.portal = portal;
        self
    }

    pub fn with_stabilization_delay(mut self, delay: Duration) -> Self {
        self.stabilization_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_hold_open(mut self, hold: Duration) -> Self {
        self.hold_open_ms = hold.as_millis() as u64;
        self
    }

    pub fn with_phase_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.phase_timeout_ms = timeout.map_or(0, |t| t.as_millis() as u64);
        self
    }

    pub fn stabilization_delay(&self) -> Duration {
        Duration::from_millis(self.stabilization_delay_ms)
    }

    pub fn hold_open(&self) -> Duration {
        Duration::from_millis(self.hold_open_ms)
    }

    pub fn phase_timeout(&self) -> Option<Duration> {
        match self.phase_timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Apply model and credential overrides from named keys.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        self.models = self.models.apply_overrides(&lookup);
        self.portal = self.portal.apply_overrides(&lookup);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_models() {
        let models = PhaseModels::default();
        assert_eq!(models.for_role(PhaseRole::Navigation), "claude-3-5-haiku-20241022");
        assert_eq!(models.for_role(PhaseRole::Selection), "claude-sonnet-4-5-20250929");
    }

    #[test]
    fn test_model_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [("SELECT_MODEL", "gpt-4.1-mini"), ("EXTRACT_MODEL", "  ")]
            .into_iter()
            .collect();

        let models =
            PhaseModels::default().apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(models.selection, "gpt-4.1-mini");
        assert_eq!(models.extraction, DEFAULT_EXTRACTION_MODEL);
        assert_eq!(models.navigation, DEFAULT_NAVIGATION_MODEL);
    }

    #[test]
    fn test_step_budget_floor() {
        let budgets = StepBudgets {
            extraction: 0,
            ..Default::default()
        };
        assert_eq!(budgets.for_role(PhaseRole::Extraction), 1);
        assert_eq!(budgets.for_role(PhaseRole::Navigation), 20);
    }

    #[test]
    fn test_portal_debug_redacts_password() {
        let portal = PortalConfig {
            password: "hunter2".to_string(),
            ..Default::default()
        };
        let debug = format!("{:?}", portal);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_executor_config_builder() {
        let config = ExecutorConfig::new()
            .with_stabilization_delay(Duration::from_millis(5))
            .with_hold_open(Duration::ZERO)
            .with_phase_timeout(None);

        assert_eq!(config.stabilization_delay(), Duration::from_millis(5));
        assert_eq!(config.hold_open(), Duration::ZERO);
        assert!(config.phase_timeout().is_none());
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: ExecutorConfig =
            serde_json::from_str(r#"{"models":{"completion":"gemini-2.5-flash"},"hold_open_ms":0}"#)
                .unwrap();
        assert_eq!(config.models.completion, "gemini-2.5-flash");
        assert_eq!(config.models.navigation, DEFAULT_NAVIGATION_MODEL);
        assert_eq!(config.hold_open_ms, 0);
        assert_eq!(config.stabilization_delay_ms, 2_000);
    }

    #[test]
    fn test_zero_phase_timeout_disables_deadline() {
        assert_eq!(
            ExecutorConfig::default().phase_timeout(),
            Some(Duration::from_secs(600))
        );

        let config: ExecutorConfig = serde_json::from_str(r#"{"phase_timeout_ms":0}"#).unwrap();
        assert_eq!(config.phase_timeout_ms, 0);
        assert!(config.phase_timeout().is_none());

        let config = ExecutorConfig::new().with_phase_timeout(None);
        assert_eq!(config.phase_timeout_ms, 0);
    }
}
