/// Config schema types for the Anthropic component and model discovery.
use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Endpoint used whenever the base URL is blank or absent.
pub const DEFAULT_ANTHROPIC_API_URL: &str = "https://api.anthropic.com";

/// Output token cap applied when the form leaves `max_tokens` empty.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WeftConfig {
    pub anthropic: AnthropicConfig,
    pub discovery: DiscoveryConfig,
}

/// Defaults seeded into the component form.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    /// API key. `ANTHROPIC_API_KEY` takes precedence when set.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_key: Option<Secret<String>>,

    /// Override the API endpoint. Blank means [`DEFAULT_ANTHROPIC_API_URL`].
    pub base_url: Option<String>,

    /// Preselected model ID. Defaults to the first static catalog entry.
    pub model: Option<String>,

    /// Output token cap; `0` means unlimited.
    pub max_tokens: u32,

    /// Sampling temperature in the closed interval `[0.0, 1.0]`.
    pub temperature: f32,

    /// Stream responses from the built client.
    pub stream: bool,

    /// Only offer models that can work with tools.
    pub tool_model_enabled: bool,
}

impl std::fmt::Debug for AnthropicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("stream", &self.stream)
            .field("tool_model_enabled", &self.tool_model_enabled)
            .finish()
    }
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: 0.1,
            stream: false,
            tool_model_enabled: false,
        }
    }
}

impl AnthropicConfig {
    /// Configured base URL, or the default endpoint when blank.
    #[must_use]
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_ANTHROPIC_API_URL)
    }

    /// Whether a non-empty API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|key| !key.expose_secret().is_empty())
    }
}

/// Live model discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Query `/v1/models` at all. When `false` the static catalog is used.
    pub enabled: bool,
    /// Page size for the models listing (newest first).
    pub limit: u32,
    /// Per-request timeout in seconds. `0` keeps the HTTP client default.
    pub timeout_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            limit: 20,
            timeout_secs: 0,
        }
    }
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_component_inputs() {
        let cfg = WeftConfig::default();
        assert_eq!(cfg.anthropic.max_tokens, 4096);
        assert!((cfg.anthropic.temperature - 0.1).abs() < f32::EPSILON);
        assert!(!cfg.anthropic.tool_model_enabled);
        assert!(cfg.discovery.enabled);
        assert_eq!(cfg.discovery.limit, 20);
    }

    #[test]
    fn blank_base_url_falls_back_to_default() {
        let mut cfg = AnthropicConfig::default();
        assert_eq!(cfg.effective_base_url(), DEFAULT_ANTHROPIC_API_URL);
        cfg.base_url = Some("   ".into());
        assert_eq!(cfg.effective_base_url(), DEFAULT_ANTHROPIC_API_URL);
        cfg.base_url = Some("https://proxy.internal".into());
        assert_eq!(cfg.effective_base_url(), "https://proxy.internal");
    }

    #[test]
    fn debug_redacts_api_key() {
        let cfg = AnthropicConfig {
            api_key: Some(Secret::new("sk-ant-secret".into())),
            ..Default::default()
        };
        let rendered = format!("{cfg:?}");
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("sk-ant-secret"));
    }

    #[test]
    fn empty_api_key_is_not_configured() {
        let cfg = AnthropicConfig {
            api_key: Some(Secret::new(String::new())),
            ..Default::default()
        };
        assert!(!cfg.has_api_key());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: WeftConfig = toml::from_str(
            r#"
            [anthropic]
            tool_model_enabled = true

            [discovery]
            limit = 5
            "#,
        )
        .unwrap();
        assert!(cfg.anthropic.tool_model_enabled);
        assert_eq!(cfg.anthropic.max_tokens, 4096);
        assert_eq!(cfg.discovery.limit, 5);
        assert!(cfg.discovery.enabled);
    }
}
