//! Replicate predictions adapter.
//!
//! Replicate models take a flat prompt rather than structured chat turns, so
//! conversations are flattened before submission. Predictions are created with
//! the `Prefer: wait` header and polled until they reach a terminal state.

use std::{env, fmt, time::Duration};

use hyper::body::to_bytes;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Request, Uri};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::time::{sleep, timeout};
use tracing::debug;

use crate::http_client::{HyperClient, build_https_client};
use crate::openai::sanitize_base_url;
use crate::traits::{
    AdapterError, AdapterMetadata, AdapterResult, ChatMessage, MessageRole, ModelAdapter,
};

/// Environment variable used when loading configuration automatically.
pub const REPLICATE_API_TOKEN_ENV: &str = "REPLICATE_API_TOKEN";

const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Configuration for the Replicate adapter.
#[derive(Clone, Debug)]
pub struct ReplicateConfig {
    api_token: Option<String>,
    model: String,
    base_url: String,
    timeout: Duration,
    default_temperature: Option<f32>,
}

impl ReplicateConfig {
    /// Creates a configuration for the supplied `owner/name` model identifier.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            api_token: None,
            model: model.into(),
            base_url: "https://api.replicate.com/".to_owned(),
            timeout: Duration::from_secs(120),
            default_temperature: None,
        }
    }

    /// Loads the API token from the `REPLICATE_API_TOKEN` environment variable.
    #[must_use]
    pub fn from_env(model: impl Into<String>) -> Self {
        let mut cfg = Self::new(model);
        cfg.api_token = env::var(REPLICATE_API_TOKEN_ENV).ok();
        cfg
    }

    /// Overrides the base URL used for API calls.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the supplied URL is invalid.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AdapterResult<Self> {
        self.base_url = sanitize_base_url("Replicate", base_url.as_ref())?;
        Ok(self)
    }

    /// Sets the default sampling temperature used when requests omit it.
    #[must_use]
    pub fn with_default_temperature(mut self, temperature: f32) -> Self {
        self.default_temperature = Some(temperature);
        self
    }

    /// Sets the overall deadline covering prediction creation and polling.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Supplies an explicit API token.
    #[must_use]
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }
}

/// Replicate adapter that creates and polls predictions over HTTPS.
pub struct ReplicateAdapter {
    client: HyperClient,
    endpoint: Uri,
    metadata: AdapterMetadata,
    api_token: String,
    timeout: Duration,
    default_temperature: Option<f32>,
}

impl fmt::Debug for ReplicateAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplicateAdapter")
            .field("model", &self.metadata.model())
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl ReplicateAdapter {
    /// Constructs a new adapter with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] if the API token is missing or
    /// the model identifier is not of the form `owner/name`.
    pub fn new(config: ReplicateConfig) -> AdapterResult<Self> {
        let api_token = config.api_token.ok_or_else(|| {
            AdapterError::configuration("Replicate adapter requires an API token")
        })?;

        if config.model.split('/').count() != 2 {
            return Err(AdapterError::configuration(format!(
                "Replicate model id must be `owner/name`, got `{}`",
                config.model
            )));
        }

        let metadata = AdapterMetadata::new("replicate", config.model.clone());
        let endpoint = format!("{}v1/models/{}/predictions", config.base_url, config.model)
            .parse::<Uri>()
            .map_err(|err| {
                AdapterError::configuration(format!("invalid Replicate endpoint: {err}"))
            })?;

        let client = build_https_client()?;

        Ok(Self {
            client,
            endpoint,
            metadata,
            api_token,
            timeout: config.timeout,
            default_temperature: config.default_temperature,
        })
    }

    fn build_input(&self, messages: &[ChatMessage]) -> PredictionInput {
        let system_prompt = messages
            .iter()
            .filter(|msg| msg.role() == MessageRole::System)
            .map(ChatMessage::content)
            .collect::<Vec<_>>()
            .join("\n");

        PredictionInput {
            prompt: flatten_conversation(messages),
            system_prompt: (!system_prompt.is_empty()).then_some(system_prompt),
            temperature: self.default_temperature,
        }
    }

    async fn create_prediction(&self, input: PredictionInput) -> AdapterResult<Prediction> {
        let body = serde_json::to_vec(&PredictionRequest { input }).map_err(|err| {
            AdapterError::invalid_request(format!("failed to encode Replicate request: {err}"))
        })?;

        let request = Request::post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, format!("Bearer {}", self.api_token))
            .header("Prefer", "wait")
            .body(Body::from(body))
            .map_err(|err| {
                AdapterError::transport(format!("failed to build Replicate request: {err}"))
            })?;

        self.send(request).await
    }

    async fn poll_prediction(&self, url: &str) -> AdapterResult<Prediction> {
        let uri = url.parse::<Uri>().map_err(|err| {
            AdapterError::transport(format!("invalid Replicate poll URL: {err}"))
        })?;
        let request = Request::get(uri)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_token))
            .body(Body::empty())
            .map_err(|err| {
                AdapterError::transport(format!("failed to build Replicate poll: {err}"))
            })?;

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> AdapterResult<Prediction> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|err| AdapterError::transport(format!("Replicate request failed: {err}")))?;

        let status = response.status();
        let bytes = to_bytes(response.into_body()).await.map_err(|err| {
            AdapterError::transport(format!("failed to read Replicate response: {err}"))
        })?;

        if !status.is_success() {
            let reason = String::from_utf8_lossy(&bytes).to_string();
            return Err(AdapterError::Response {
                reason: format!("Replicate returned {status}: {reason}"),
            });
        }

        serde_json::from_slice(&bytes).map_err(|err| AdapterError::Response {
            reason: format!("failed to decode Replicate response: {err}"),
        })
    }

    async fn run_prediction(&self, input: PredictionInput) -> AdapterResult<String> {
        let mut prediction = self.create_prediction(input).await?;

        while !prediction.status.is_terminal() {
            let Some(url) = prediction.urls.as_ref().and_then(|urls| urls.get.as_deref())
            else {
                return Err(AdapterError::Response {
                    reason: "Replicate prediction is pending but exposes no poll URL".into(),
                });
            };
            debug!(status = ?prediction.status, "polling Replicate prediction");
            let url = url.to_owned();
            sleep(POLL_INTERVAL).await;
            prediction = self.poll_prediction(&url).await?;
        }

        match prediction.status {
            PredictionStatus::Succeeded => Ok(collect_output(prediction.output)),
            _ => Err(AdapterError::Response {
                reason: format!(
                    "Replicate prediction {:?}: {}",
                    prediction.status,
                    prediction.error.unwrap_or_default()
                ),
            }),
        }
    }
}

#[async_trait]
impl ModelAdapter for ReplicateAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn chat(&self, messages: &[ChatMessage]) -> AdapterResult<String> {
        if messages.is_empty() {
            return Err(AdapterError::invalid_request(
                "chat requires at least one message",
            ));
        }

        let input = self.build_input(messages);
        timeout(self.timeout, self.run_prediction(input))
            .await
            .map_err(|_| AdapterError::timed_out("Replicate prediction"))?
    }
}

#[derive(Debug, Serialize)]
struct PredictionRequest {
    input: PredictionInput,
}

#[derive(Debug, Serialize)]
struct PredictionInput {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    status: PredictionStatus,
    #[serde(default)]
    output: Option<Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    urls: Option<PredictionUrls>,
}

#[derive(Debug, Deserialize)]
struct PredictionUrls {
    #[serde(default)]
    get: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl PredictionStatus {
    const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

fn flatten_conversation(messages: &[ChatMessage]) -> String {
    let mut prompt = String::new();
    for message in messages {
        match message.role() {
            MessageRole::System => {}
            MessageRole::User => {
                prompt.push_str(message.content());
                prompt.push('\n');
            }
            MessageRole::Assistant => {
                prompt.push_str("Assistant: ");
                prompt.push_str(message.content());
                prompt.push('\n');
            }
            MessageRole::Tool => {
                prompt.push_str("[tool output] ");
                prompt.push_str(message.content());
                prompt.push('\n');
            }
        }
    }
    prompt.truncate(prompt.trim_end().len());
    prompt
}

fn collect_output(output: Option<Value>) -> String {
    match output {
        Some(Value::String(text)) => text,
        Some(Value::Array(parts)) => parts
            .into_iter()
            .filter_map(|part| match part {
                Value::String(text) => Some(text),
                _ => None,
            })
            .collect(),
        _ => String::new(),
    }
}
