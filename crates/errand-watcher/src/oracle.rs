//! The external AI oracle that judges task completion.
//!
//! Given the task description plus the baseline and latest screenshots,
//! the oracle returns a short natural-language verdict. A primary provider
//! is consulted first; on any failure the call falls back to a secondary
//! provider. A fully failed classification is treated by the watcher as
//! "not yet complete", never as a watch-aborting error.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use errand_types::{ErrandError, OracleEndpoint, OracleSettings};

/// Errors from one classifier call.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider returned error: {0}")]
    Api(String),

    #[error("classifier call exceeded its deadline")]
    Timeout,

    #[error("provider response carried no verdict text")]
    Empty,
}

/// Affirmative keywords interpreted as "the task is complete".
pub const COMPLETION_KEYWORDS: [&str; 7] =
    ["yes", "true", "completed", "finished", "done", "success", "ok"];

/// Whether a verdict text indicates completion.
///
/// Deliberately permissive: case-insensitive substring match, not exact
/// match. A verdict that merely contains "ok" counts as complete, which
/// risks false positives if a provider echoes task text back; a stricter
/// structured-output contract would remove that ambiguity.
pub fn verdict_indicates_complete(verdict: &str) -> bool {
    let verdict = verdict.to_lowercase();
    COMPLETION_KEYWORDS.iter().any(|kw| verdict.contains(kw))
}

/// External judgment on whether the watched task is done.
#[async_trait]
pub trait ChangeOracle: Send + Sync {
    /// Ask whether `task` appears complete given the two screenshots
    /// (base64-encoded PNG, baseline first).
    async fn classify(
        &self,
        task: &str,
        baseline_b64: &str,
        latest_b64: &str,
    ) -> Result<String, OracleError>;
}

/// One OpenAI-compatible chat-completions provider.
pub struct HttpOracle {
    client: reqwest::Client,
    endpoint: OracleEndpoint,
    call_timeout: Duration,
}

impl HttpOracle {
    pub fn new(endpoint: OracleEndpoint, call_timeout: Duration) -> Result<Self, ErrandError> {
        let client = reqwest::Client::builder()
            .timeout(call_timeout)
            .build()
            .map_err(|e| ErrandError::WatcherError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            call_timeout,
        })
    }

    fn prompt(task: &str) -> String {
        format!(
            "Has the task been completed based on the desktop changes? The task is: {task}. \
             The start image is first, then the latest image. Reply with ONLY \"yes\" or \
             \"no\" without any other text."
        )
    }
}

#[async_trait]
impl ChangeOracle for HttpOracle {
    async fn classify(
        &self,
        task: &str,
        baseline_b64: &str,
        latest_b64: &str,
    ) -> Result<String, OracleError> {
        let body = json!({
            "model": self.endpoint.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": Self::prompt(task) },
                    { "type": "image_url",
                      "image_url": { "url": format!("data:image/png;base64,{baseline_b64}") } },
                    { "type": "image_url",
                      "image_url": { "url": format!("data:image/png;base64,{latest_b64}") } },
                ],
            }],
        });

        let mut request = self.client.post(&self.endpoint.url).json(&body);
        if let Some(key) = &self.endpoint.api_key {
            request = request.bearer_auth(key);
        }

        // Explicit per-call deadline: a hung provider must not stall the
        // polling loop beyond this.
        let response = tokio::time::timeout(self.call_timeout, request.send())
            .await
            .map_err(|_| OracleError::Timeout)??;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Api(format!("HTTP {status}")));
        }

        let body: serde_json::Value = response.json().await?;
        let verdict = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(OracleError::Empty)?;

        tracing::debug!(model = %self.endpoint.model, %verdict, "oracle verdict received");
        Ok(verdict.to_string())
    }
}

/// Primary provider with an optional secondary tried on any failure.
pub struct FallbackOracle {
    primary: Box<dyn ChangeOracle>,
    secondary: Option<Box<dyn ChangeOracle>>,
}

impl FallbackOracle {
    pub fn new(primary: Box<dyn ChangeOracle>, secondary: Option<Box<dyn ChangeOracle>>) -> Self {
        Self { primary, secondary }
    }

    /// Build both providers from the configured oracle settings.
    pub fn from_settings(settings: &OracleSettings) -> Result<Self, ErrandError> {
        let primary = HttpOracle::new(settings.primary.clone(), settings.call_timeout)?;
        let secondary = settings
            .fallback
            .clone()
            .map(|endpoint| HttpOracle::new(endpoint, settings.call_timeout))
            .transpose()?;

        Ok(Self::new(
            Box::new(primary),
            secondary.map(|o| Box::new(o) as Box<dyn ChangeOracle>),
        ))
    }
}

#[async_trait]
impl ChangeOracle for FallbackOracle {
    async fn classify(
        &self,
        task: &str,
        baseline_b64: &str,
        latest_b64: &str,
    ) -> Result<String, OracleError> {
        match self.primary.classify(task, baseline_b64, latest_b64).await {
            Ok(verdict) => Ok(verdict),
            Err(e) => match &self.secondary {
                Some(secondary) => {
                    tracing::warn!(error = %e, "primary oracle failed, trying fallback provider");
                    secondary.classify(task, baseline_b64, latest_b64).await
                }
                None => Err(e),
            },
        }
    }
}
