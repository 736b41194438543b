// Advisory service client for the Anthropic Messages API.
//
// One-shot request/response: the sectioned prompt goes out, a single JSON
// object comes back. The outcome is a tagged result rather than
// exception-shaped control flow: rate limiting, malformed output, and
// unavailability are distinct cases because callers treat them
// differently (retry-later vs. operator alert vs. generic failure).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::advisory::prompt::RecommendationRequest;
use crate::config::{AdvisoryConfig, CredentialsConfig};
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Outcome types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum AdvisoryError {
    /// The advisory service asked us to slow down; the caller may retry
    /// after a delay.
    #[error("advisory service rate limited")]
    RateLimited,

    /// The service answered, but the content does not match the output
    /// schema. Never partially accepted.
    #[error("advisory response malformed: {0}")]
    Malformed(String),

    /// Transport failure, timeout, or non-2xx status other than 429.
    #[error("advisory service unavailable: {0}")]
    Unavailable(String),
}

impl From<AdvisoryError> for CoreError {
    fn from(err: AdvisoryError) -> Self {
        match err {
            AdvisoryError::RateLimited => CoreError::AdvisoryRateLimited,
            AdvisoryError::Malformed(m) => CoreError::MalformedAdvisoryResponse(m),
            AdvisoryError::Unavailable(m) => CoreError::AdvisoryUnavailable(m),
        }
    }
}

/// The structured recommendation. Player names reference the squad and the
/// relevant-player pool from the request; the validator enforces that.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendationResponse {
    pub transfers_out: Vec<String>,
    pub transfers_in: Vec<String>,
    #[serde(default)]
    pub captain: Option<String>,
    #[serde(default)]
    pub vice_captain: Option<String>,
    #[serde(default)]
    pub chips: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

// ---------------------------------------------------------------------------
// ClaudeAdvisor
// ---------------------------------------------------------------------------

/// Low-level Claude API client for one-shot structured advice.
pub struct ClaudeAdvisor {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    timeout: std::time::Duration,
    base_url: String,
}

impl ClaudeAdvisor {
    pub fn new(
        api_key: String,
        model: String,
        max_tokens: u32,
        timeout: std::time::Duration,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            max_tokens,
            timeout,
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint. Used by tests to talk to
    /// a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Send the recommendation request and parse the structured result.
    pub async fn invoke(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, AdvisoryError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": request.system_prompt(),
            "messages": [{ "role": "user", "content": request.user_prompt() }]
        });

        let response = self
            .http
            .post(&self.base_url)
            .timeout(self.timeout)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisoryError::Unavailable(format!("request failed: {e}")))?;

        let status = response.status();
        if status.as_u16() == 429 {
            warn!("advisory service rate limited");
            return Err(AdvisoryError::RateLimited);
        }
        if !status.is_success() {
            return Err(AdvisoryError::Unavailable(format!(
                "API returned status {status}"
            )));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| AdvisoryError::Unavailable(format!("failed to read response body: {e}")))?;

        let text = completion_text(&payload).ok_or_else(|| {
            AdvisoryError::Malformed("no text content block in response".to_string())
        })?;
        debug!(chars = text.len(), "advisory completion received");

        parse_recommendation(text)
    }
}

// ---------------------------------------------------------------------------
// AdvisoryClient wrapper
// ---------------------------------------------------------------------------

/// High-level wrapper that is either an active advisor or disabled (no API
/// key configured).
pub enum AdvisoryClient {
    Active(ClaudeAdvisor),
    Disabled,
}

impl AdvisoryClient {
    /// Build a client from config: `Active` when a non-empty API key is
    /// present in credentials, otherwise `Disabled`.
    pub fn from_config(advisory: &AdvisoryConfig, credentials: &CredentialsConfig) -> Self {
        match &credentials.anthropic_api_key {
            Some(key) if !key.is_empty() => AdvisoryClient::Active(ClaudeAdvisor::new(
                key.clone(),
                advisory.model.clone(),
                advisory.max_tokens,
                std::time::Duration::from_secs(advisory.timeout_secs),
            )),
            _ => AdvisoryClient::Disabled,
        }
    }

    pub async fn invoke(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, AdvisoryError> {
        match self {
            AdvisoryClient::Active(advisor) => advisor.invoke(request).await,
            AdvisoryClient::Disabled => Err(AdvisoryError::Unavailable(
                "advisory API key not configured".to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Response parsing helpers
// ---------------------------------------------------------------------------

/// Extract the first text block from a Messages API response.
///
/// Expected shape: `{ "content": [ { "type": "text", "text": "..." } ] }`
fn completion_text(payload: &Value) -> Option<&str> {
    payload
        .get("content")?
        .as_array()?
        .iter()
        .find_map(|block| match block.get("type").and_then(Value::as_str) {
            Some("text") => block.get("text").and_then(Value::as_str),
            _ => None,
        })
}

/// Parse completion text into a `RecommendationResponse`, strictly.
///
/// Tolerates a markdown code fence around the JSON (models add one despite
/// instructions); anything else that is not exactly the schema object is
/// rejected whole.
pub(crate) fn parse_recommendation(text: &str) -> Result<RecommendationResponse, AdvisoryError> {
    let body = strip_code_fence(text.trim());
    serde_json::from_str(body).map_err(|e| AdvisoryError::Malformed(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    match inner.trim_end().strip_suffix("```") {
        Some(body) => body.trim(),
        None => text,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
