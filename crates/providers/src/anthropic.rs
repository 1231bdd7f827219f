//! Anthropic Messages API client library.
//!
//! Client construction validates parameters and builds a configured
//! `reqwest::Client`; it never sends a request. Model listing calls
//! `GET /v1/models`.

use std::{sync::Arc, time::Duration};

use {
    async_trait::async_trait,
    reqwest::header::{HeaderMap, HeaderValue},
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, trace, warn},
};

use crate::{
    DiscoveredModel,
    catalog::{context_window_for_model, supports_tools_for_model, supports_vision_for_model},
    error::{SdkError, ValidationError},
    model::{ChatModel, ClientHandle, ClientSettings},
    sdk::ProviderSdk,
};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic implementation of [`ProviderSdk`].
#[derive(Debug, Clone, Default)]
pub struct AnthropicSdk {
    timeout: Option<Duration>,
}

impl AnthropicSdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a per-request timeout to constructed clients and listing calls.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn http_client(&self, headers: HeaderMap) -> Result<reqwest::Client, SdkError> {
        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

fn validate_settings(settings: &ClientSettings) -> Result<(), ValidationError> {
    if settings.model.trim().is_empty() {
        return Err(ValidationError::new("model", "model name must not be empty"));
    }
    if let Some(temperature) = settings.temperature
        && !temperature.is_finite()
    {
        return Err(ValidationError::new(
            "temperature",
            format!("temperature must be a finite number, got {temperature}"),
        ));
    }
    validate_base_url(&settings.base_url)?;
    Ok(())
}

fn validate_base_url(base_url: &str) -> Result<(), ValidationError> {
    let parsed = url::Url::parse(base_url)
        .map_err(|e| ValidationError::new("base_url", format!("invalid URL '{base_url}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::new(
            "base_url",
            format!("unsupported URL scheme '{}'", parsed.scheme()),
        ));
    }
    Ok(())
}

fn auth_headers(api_key: &Secret<String>) -> Result<HeaderMap, ValidationError> {
    let mut headers = HeaderMap::new();
    let mut key = HeaderValue::from_str(api_key.expose_secret()).map_err(|_| {
        ValidationError::new("api_key", "API key contains characters not allowed in a header")
    })?;
    key.set_sensitive(true);
    headers.insert("x-api-key", key);
    headers.insert(
        "anthropic-version",
        HeaderValue::from_static(ANTHROPIC_VERSION),
    );
    Ok(headers)
}

#[derive(Debug, serde::Deserialize)]
struct ModelEntry {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct ModelsPage {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, serde::Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

/// The `error` object of an Anthropic error response.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct ApiErrorBody {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Parse `{"type": "error", "error": {"type": ..., "message": ...}}`.
pub fn parse_api_error(body: &str) -> Option<ApiErrorBody> {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error)
}

fn api_error(status: reqwest::StatusCode, body: &str) -> SdkError {
    let parsed = parse_api_error(body);
    let error_type = parsed.as_ref().and_then(|e| e.error_type.clone());
    let message = parsed
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    SdkError::Api {
        provider: "anthropic",
        status: status.as_u16(),
        error_type,
        message,
    }
}

#[async_trait]
impl ProviderSdk for AnthropicSdk {
    fn integration(&self) -> &'static str {
        "anthropic"
    }

    fn display_name(&self) -> &'static str {
        "Anthropic"
    }

    fn chat_model(&self, settings: ClientSettings) -> Result<ClientHandle, SdkError> {
        validate_settings(&settings)?;
        let client = self.http_client(auth_headers(&settings.api_key)?)?;
        debug!(
            model = %settings.model,
            base_url = %settings.base_url,
            max_tokens = ?settings.max_tokens,
            stream = settings.stream,
            "anthropic chat model constructed"
        );
        Ok(Arc::new(AnthropicChatModel { settings, client }))
    }

    async fn list_models(
        &self,
        api_key: &Secret<String>,
        base_url: &str,
        limit: u32,
    ) -> Result<Vec<DiscoveredModel>, SdkError> {
        validate_base_url(base_url)?;
        let client = self.http_client(auth_headers(api_key)?)?;
        let endpoint = format!("{}/v1/models", base_url.trim_end_matches('/'));
        debug!(endpoint = %endpoint, limit, "anthropic model listing request");

        let response = client
            .get(&endpoint)
            .query(&[("limit", limit)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, "anthropic model listing failed");
            return Err(api_error(status, &body));
        }

        let body = response.text().await?;
        trace!(body = %body, "anthropic model listing response");
        let page: ModelsPage = serde_json::from_str(&body)?;
        Ok(page
            .data
            .into_iter()
            .filter(|entry| !entry.id.trim().is_empty())
            .map(|entry| {
                let display_name = entry.display_name.unwrap_or_else(|| entry.id.clone());
                DiscoveredModel::new(entry.id, display_name).with_created_at(entry.created_at)
            })
            .collect())
    }
}

/// A configured Anthropic chat client for one model.
pub struct AnthropicChatModel {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl AnthropicChatModel {
    /// Endpoint the execution engine posts messages to.
    pub fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.settings.base_url.trim_end_matches('/'))
    }

    /// HTTP client carrying the auth and version headers.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl std::fmt::Debug for AnthropicChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicChatModel")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ChatModel for AnthropicChatModel {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn id(&self) -> &str {
        &self.settings.model
    }

    fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn supports_tools(&self) -> bool {
        supports_tools_for_model(&self.settings.model)
    }

    fn context_window(&self) -> u32 {
        context_window_for_model(&self.settings.model)
    }

    fn supports_vision(&self) -> bool {
        supports_vision_for_model(&self.settings.model)
    }
}
