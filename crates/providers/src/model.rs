use std::sync::Arc;

use secrecy::Secret;

use weft_config::{DEFAULT_ANTHROPIC_API_URL, DEFAULT_MAX_TOKENS};

/// User-facing parameters for a chat-model client.
///
/// Values arrive from the component form: `max_tokens` is `None` when the
/// field was left empty, `temperature` has already been clamped to `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelParameters {
    pub model: String,
    /// `None` = field left empty (becomes [`DEFAULT_MAX_TOKENS`]), `Some(0)` = unlimited.
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub base_url: Option<String>,
    pub stream: bool,
}

impl ModelParameters {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: None,
            temperature: None,
            base_url: None,
            stream: false,
        }
    }

    /// Minimal parameters for a capability probe: model and endpoint only.
    pub fn probe(model: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            base_url,
            ..Self::new(model)
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Normalize into the settings a provider SDK receives.
    pub fn into_settings(self, api_key: Secret<String>) -> ClientSettings {
        let base_url = effective_base_url(self.base_url.as_deref()).to_string();
        let max_tokens = match self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS) {
            0 => None,
            n => Some(n),
        };
        ClientSettings {
            model: self.model,
            api_key,
            max_tokens,
            temperature: self.temperature,
            base_url,
            stream: self.stream,
        }
    }
}

/// Blank or absent endpoints resolve to the public Anthropic API.
pub fn effective_base_url(base_url: Option<&str>) -> &str {
    base_url
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .unwrap_or(DEFAULT_ANTHROPIC_API_URL)
}

/// Normalized construction input handed to a provider SDK.
#[derive(Clone)]
pub struct ClientSettings {
    pub model: String,
    pub api_key: Secret<String>,
    /// `None` means no explicit output cap.
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub base_url: String,
    pub stream: bool,
}

impl std::fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSettings")
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("stream", &self.stream)
            .finish()
    }
}

/// A constructed chat-model client, ready to be driven by an execution engine.
pub trait ChatModel: Send + Sync {
    fn name(&self) -> &str;

    /// Model identifier (e.g. "claude-sonnet-4-20250514").
    fn id(&self) -> &str;

    fn settings(&self) -> &ClientSettings;

    /// Whether this client can bind tool/function schemas.
    /// Defaults to false; clients that accept a `tools` parameter override it.
    fn supports_tools(&self) -> bool {
        false
    }

    /// Context window size in tokens for this model.
    fn context_window(&self) -> u32 {
        200_000
    }

    /// Whether this client accepts image inputs.
    fn supports_vision(&self) -> bool {
        false
    }
}

impl std::fmt::Debug for dyn ChatModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatModel")
            .field("name", &self.name())
            .field("settings", self.settings())
            .finish()
    }
}

/// Opaque handle returned by the client factory.
pub type ClientHandle = Arc<dyn ChatModel>;

#[cfg(test)]
mod tests {
    use {super::*, secrecy::ExposeSecret};

    fn key() -> Secret<String> {
        Secret::new("sk-ant-test".into())
    }

    struct Fixed(ClientSettings);

    impl ChatModel for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn id(&self) -> &str {
            &self.0.model
        }

        fn settings(&self) -> &ClientSettings {
            &self.0
        }
    }

    #[test]
    fn client_handle_debug_hides_key() {
        let settings = ModelParameters::new("claude-3-opus-latest").into_settings(key());
        let handle: ClientHandle = Arc::new(Fixed(settings));
        let rendered = format!("{handle:?}");
        assert!(rendered.contains("claude-3-opus-latest"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("sk-ant-test"));
    }

    #[test]
    fn empty_max_tokens_defaults_to_4096() {
        let settings = ModelParameters::new("claude-3-5-haiku-latest").into_settings(key());
        assert_eq!(settings.max_tokens, Some(4096));
    }

    #[test]
    fn zero_max_tokens_is_unlimited() {
        let settings = ModelParameters::new("claude-3-5-haiku-latest")
            .with_max_tokens(Some(0))
            .into_settings(key());
        assert_eq!(settings.max_tokens, None);
    }

    #[test]
    fn blank_base_url_defaults() {
        let settings = ModelParameters::new("m")
            .with_base_url(Some("  ".into()))
            .into_settings(key());
        assert_eq!(settings.base_url, "https://api.anthropic.com");

        let settings = ModelParameters::new("m")
            .with_base_url(Some("https://gateway.example/anthropic".into()))
            .into_settings(key());
        assert_eq!(settings.base_url, "https://gateway.example/anthropic");
    }

    #[test]
    fn probe_parameters_keep_only_model_and_endpoint() {
        let params = ModelParameters::probe("claude-y", Some("http://127.0.0.1:9".into()));
        assert_eq!(params.model, "claude-y");
        assert_eq!(params.base_url.as_deref(), Some("http://127.0.0.1:9"));
        assert_eq!(params.temperature, None);
        assert!(!params.stream);
    }

    #[test]
    fn settings_debug_redacts_key() {
        let settings = ModelParameters::new("m").into_settings(key());
        assert_eq!(settings.api_key.expose_secret(), "sk-ant-test");
        assert!(!format!("{settings:?}").contains("sk-ant-test"));
    }
}
