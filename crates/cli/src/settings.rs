use anyhow::{Context, Result};
use orchestrator::services::DEFAULT_AGENT_URL;
use orchestrator::ExecutorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const AGENT_DIR: &str = ".quote-agent";
pub const CONFIG_FILE: &str = "config.toml";
pub const AGENT_URL_KEY: &str = "BROWSER_AGENT_URL";

const MASK: &str = "********";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub url: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_AGENT_URL.to_string(),
        }
    }
}

/// Contents of `.quote-agent/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub agent: AgentSettings,
    pub executor: ExecutorConfig,
}

impl Settings {
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(AGENT_DIR).join(CONFIG_FILE)
    }

    /// Load from `path`, or defaults when the file does not exist.
    pub async fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Environment wins over the file for the agent URL, models and credentials.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(AGENT_URL_KEY).filter(|u| !u.trim().is_empty()) {
            self.agent.url = url;
        }
        self.executor = self.executor.apply_overrides(&lookup);
        self
    }

    /// Copy safe to print: credentials replaced by a mask.
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        let portal = &mut masked.executor.portal;
        for secret in [&mut portal.password, &mut portal.agent_key] {
            if !secret.is_empty() {
                *secret = MASK.to_string();
            }
        }
        masked
    }
}
