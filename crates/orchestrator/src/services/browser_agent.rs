use async_trait::async_trait;
use quote_core::SessionHandle;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::{OrchestratorError, Result};
use crate::services::{Capability, Completion, SessionManager};

pub const DEFAULT_AGENT_URL: &str = "http://localhost:8765";

#[derive(Debug, Serialize)]
struct CreateSessionRequest {
    keep_alive: bool,
}

#[derive(Debug, Deserialize)]
struct CreateSessionResponse {
    id: String,
}

#[derive(Debug, Serialize)]
struct TaskRequest<'a> {
    task: &'a str,
    model: &'a str,
    max_steps: u32,
}

#[derive(Debug, Deserialize)]
struct TaskResponse {
    success: bool,
    #[serde(default)]
    steps: u32,
    #[serde(default)]
    output: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for a browser-agent service that hosts keep-alive browser
/// sessions and runs instruction-driven agents inside them.
#[derive(Clone)]
pub struct BrowserAgentClient {
    client: Client,
    base_url: String,
}

impl BrowserAgentClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn session_url(&self, session: &SessionHandle) -> String {
        format!(
            "{}/sessions/{}",
            self.base_url,
            urlencoding::encode(session.remote_id())
        )
    }

    async fn check(response: Response, operation: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!(
            status = status.as_u16(),
            operation = operation,
            body = %body,
            "Browser agent request failed"
        );
        let message = if body.is_empty() {
            format!("{} failed", operation)
        } else {
            format!("{} failed: {}", operation, body)
        };
        Err(OrchestratorError::agent_service(Some(status.as_u16()), message))
    }
}

#[async_trait]
impl SessionManager for BrowserAgentClient {
    async fn acquire(&self) -> Result<SessionHandle> {
        let url = format!("{}/sessions", self.base_url);
        info!(url = %url, "Starting browser session");

        let response = self
            .client
            .post(&url)
            .json(&CreateSessionRequest { keep_alive: true })
            .send()
            .await
            .map_err(|e| OrchestratorError::SessionAcquisition(e.to_string()))?;

        let created: CreateSessionResponse = Self::check(response, "create session")
            .await
            .map_err(|e| OrchestratorError::SessionAcquisition(e.to_string()))?
            .json()
            .await
            .map_err(|e| OrchestratorError::SessionAcquisition(e.to_string()))?;

        Ok(SessionHandle::new(created.id))
    }

    async fn release(&self, handle: SessionHandle) -> Result<()> {
        let url = self.session_url(&handle);
        debug!(url = %url, "Closing browser session");

        let response = self
            .client
            .delete(&url)
            .send()
            .await
            .map_err(|e| OrchestratorError::SessionRelease(e.to_string()))?;

        Self::check(response, "close session")
            .await
            .map_err(|e| OrchestratorError::SessionRelease(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Capability for BrowserAgentClient {
    async fn execute(
        &self,
        instructions: &str,
        model: &str,
        session: &SessionHandle,
        step_budget: u32,
    ) -> Result<Completion> {
        let url = format!("{}/tasks", self.session_url(session));
        debug!(
            session_id = %session.id(),
            model = model,
            max_steps = step_budget,
            instruction_length = instructions.len(),
            "Sending task to browser agent"
        );

        let response = self
            .client
            .post(&url)
            .json(&TaskRequest {
                task: instructions,
                model,
                max_steps: step_budget,
            })
            .send()
            .await?;

        let result: TaskResponse = Self::check(response, "run task").await?.json().await?;

        if !result.success {
            let reason = result
                .error
                .unwrap_or_else(|| format!("task did not complete within {} steps", step_budget));
            return Err(OrchestratorError::Capability(reason));
        }

        Ok(Completion {
            steps_used: result.steps,
            output: result.output,
        })
    }
}
