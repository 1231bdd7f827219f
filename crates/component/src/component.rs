//! The Anthropic component: metadata, input fields, and client construction
//! from form values.

use {
    secrecy::{ExposeSecret, Secret},
    serde::Serialize,
    serde_json::{Value, json},
    tracing::{debug, warn},
};

use {
    weft_config::{AnthropicConfig, DEFAULT_ANTHROPIC_API_URL, DEFAULT_MAX_TOKENS},
    weft_providers::{
        ClientHandle, ModelClientFactory, ModelParameters,
        catalog::{DEPRECATED_MODELS, KNOWN_MODELS},
    },
};

use crate::{
    error::{Error, Result},
    form::{FieldDescriptor, FieldType, FormConfiguration, is_truthy},
};

pub const INPUT_VALUE: &str = "input_value";
pub const SYSTEM_MESSAGE: &str = "system_message";
pub const STREAM: &str = "stream";
pub const MAX_TOKENS: &str = "max_tokens";
pub const MODEL_NAME: &str = "model_name";
pub const API_KEY: &str = "api_key";
pub const TEMPERATURE: &str = "temperature";
pub const BASE_URL: &str = "base_url";
pub const TOOL_MODEL_ENABLED: &str = "tool_model_enabled";

pub const DEFAULT_TEMPERATURE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComponentMetadata {
    pub display_name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub name: &'static str,
}

pub const METADATA: ComponentMetadata = ComponentMetadata {
    display_name: "Anthropic",
    description: "Generate text using Anthropic's Messages API and models.",
    icon: "Anthropic",
    name: "AnthropicModel",
};

/// Input fields in display order.
pub fn inputs() -> Vec<FieldDescriptor> {
    let models: Vec<String> = KNOWN_MODELS.iter().map(|id| (*id).to_string()).collect();
    let first_model = models.first().cloned().map_or(Value::Null, Value::String);
    vec![
        FieldDescriptor::new(INPUT_VALUE, "Input", FieldType::Message, json!("")),
        FieldDescriptor::new(
            SYSTEM_MESSAGE,
            "System Message",
            FieldType::Multiline,
            json!(""),
        )
        .with_info("System message to pass to the model.")
        .advanced(),
        FieldDescriptor::new(STREAM, "Stream", FieldType::Bool, json!(false))
            .with_info("Stream the response from the model. Streaming works only in Chat.")
            .advanced(),
        FieldDescriptor::new(MAX_TOKENS, "Max Tokens", FieldType::Int, json!(DEFAULT_MAX_TOKENS))
            .with_info("The maximum number of tokens to generate. Set to 0 for unlimited tokens.")
            .advanced(),
        FieldDescriptor::new(MODEL_NAME, "Model Name", FieldType::Dropdown, first_model)
            .with_options(models)
            .refresh_button()
            .combobox(),
        FieldDescriptor::new(API_KEY, "Anthropic API Key", FieldType::Secret, Value::Null)
            .with_info("Your Anthropic API key.")
            .required()
            .real_time_refresh(),
        FieldDescriptor::new(
            TEMPERATURE,
            "Temperature",
            FieldType::Slider,
            json!(DEFAULT_TEMPERATURE),
        )
        .with_info(
            "Run inference with this temperature. Must by in the closed interval [0.0, 1.0].",
        )
        .with_range(0.0, 1.0, 0.01)
        .advanced(),
        FieldDescriptor::new(BASE_URL, "Anthropic API URL", FieldType::Message, json!(
            DEFAULT_ANTHROPIC_API_URL
        ))
        .with_info(
            "Endpoint of the Anthropic API. Defaults to 'https://api.anthropic.com' if not specified.",
        )
        .real_time_refresh()
        .advanced(),
        FieldDescriptor::new(
            TOOL_MODEL_ENABLED,
            "Enable Tool Models",
            FieldType::Bool,
            json!(false),
        )
        .with_info(
            "Select if you want to use models that can work with tools. If yes, only those models will be shown.",
        )
        .real_time_refresh(),
    ]
}

pub fn default_form() -> FormConfiguration {
    inputs().into_iter().collect()
}

/// Default form with values seeded from configuration.
pub fn form_from_config(config: &AnthropicConfig) -> Result<FormConfiguration> {
    let mut form = default_form();
    if let Some(key) = &config.api_key {
        form.set_value(API_KEY, json!(key.expose_secret()))?;
    }
    if let Some(base_url) = &config.base_url {
        form.set_value(BASE_URL, json!(base_url))?;
    }
    if let Some(model) = &config.model {
        if DEPRECATED_MODELS.iter().any(|id| *id == model.as_str()) {
            warn!(model = %model, "configured model is a deprecated snapshot");
        }
        form.set_value(MODEL_NAME, json!(model))?;
    }
    form.set_value(MAX_TOKENS, json!(config.max_tokens))?;
    form.set_value(TEMPERATURE, json!(config.temperature))?;
    form.set_value(STREAM, json!(config.stream))?;
    form.set_value(TOOL_MODEL_ENABLED, json!(config.tool_model_enabled))?;
    Ok(form)
}

/// Text of a string field; null and missing fields read as empty.
pub(crate) fn text_value(form: &FormConfiguration, field: &'static str) -> Result<String> {
    match form.value(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(Error::invalid_field(field, format!("expected text, got {other}"))),
    }
}

/// Values the component reads when building its client.
#[derive(Clone)]
pub struct ComponentInputs {
    pub api_key: Secret<String>,
    pub model_name: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub base_url: Option<String>,
    pub stream: bool,
    pub tool_model_enabled: bool,
}

impl std::fmt::Debug for ComponentInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentInputs")
            .field("api_key", &"[REDACTED]")
            .field("model_name", &self.model_name)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("stream", &self.stream)
            .field("tool_model_enabled", &self.tool_model_enabled)
            .finish()
    }
}

impl ComponentInputs {
    pub fn from_form(form: &FormConfiguration) -> Result<Self> {
        let api_key = text_value(form, API_KEY)?;
        if api_key.trim().is_empty() {
            return Err(Error::invalid_field(API_KEY, "an API key is required"));
        }
        let base_url = Some(text_value(form, BASE_URL)?).filter(|url| !url.trim().is_empty());
        Ok(Self {
            api_key: Secret::new(api_key),
            model_name: text_value(form, MODEL_NAME)?,
            max_tokens: parse_max_tokens(form.value(MAX_TOKENS))?,
            temperature: parse_temperature(form.value(TEMPERATURE))?,
            base_url,
            stream: form.value(STREAM).is_some_and(is_truthy),
            tool_model_enabled: form.value(TOOL_MODEL_ENABLED).is_some_and(is_truthy),
        })
    }

    pub fn parameters(&self) -> ModelParameters {
        ModelParameters::new(self.model_name.clone())
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature)
            .with_base_url(self.base_url.clone())
            .with_stream(self.stream)
    }
}

/// Empty field yields `None`; numbers and numeric strings must fit in `u32`.
fn parse_max_tokens(value: Option<&Value>) -> Result<Option<u32>> {
    let invalid = |detail: String| Error::invalid_field(MAX_TOKENS, detail);
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|e| invalid(format!("{s:?}: {e}"))),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| invalid(format!("{n} is not a non-negative integer"))),
        Some(other) => Err(invalid(format!("expected an integer, got {other}"))),
    }
}

/// Clamped to `[0, 1]`.
fn parse_temperature(value: Option<&Value>) -> Result<Option<f32>> {
    let raw = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    let raw = raw.ok_or_else(|| Error::invalid_field(TEMPERATURE, "expected a number"))?;
    Ok(Some(raw.clamp(0.0, 1.0) as f32))
}

/// Build the chat-model client described by `form`.
pub fn build_model(factory: &ModelClientFactory, form: &FormConfiguration) -> Result<ClientHandle> {
    let inputs = ComponentInputs::from_form(form)?;
    debug!(
        model = %inputs.model_name,
        max_tokens = ?inputs.max_tokens,
        stream = inputs.stream,
        "building model from form"
    );
    Ok(factory.build_client(inputs.parameters(), inputs.api_key.clone())?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn form_with_key() -> FormConfiguration {
        let mut form = default_form();
        form.set_value(API_KEY, json!("sk-ant-test")).unwrap();
        form
    }

    #[test]
    fn default_form_matches_descriptor() {
        let form = default_form();
        assert_eq!(form.len(), 9);

        let model = form.get(MODEL_NAME).unwrap();
        assert_eq!(model.value, json!("claude-opus-4-20250514"));
        assert_eq!(model.options.len(), KNOWN_MODELS.len());
        assert!(model.combobox && model.refresh_button);

        let key = form.get(API_KEY).unwrap();
        assert!(key.required && key.real_time_refresh);
        assert_eq!(key.value, Value::Null);

        let base = form.get(BASE_URL).unwrap();
        assert_eq!(base.value, json!("https://api.anthropic.com"));
        assert!(base.advanced && base.real_time_refresh);

        let temperature = form.get(TEMPERATURE).unwrap();
        assert_eq!(temperature.range_spec.unwrap().step, 0.01);

        assert_eq!(form.value(MAX_TOKENS), Some(&json!(4096)));
        assert_eq!(form.value(TOOL_MODEL_ENABLED), Some(&json!(false)));
        assert_eq!(METADATA.name, "AnthropicModel");
    }

    #[test]
    fn default_form_keeps_display_order() {
        let expected: Vec<_> = inputs().into_iter().map(|f| f.name).collect();
        let names: Vec<_> = default_form().fields().map(|f| f.name.clone()).collect();
        assert_eq!(names, expected);
        assert_eq!(names.first().map(String::as_str), Some(INPUT_VALUE));
    }

    #[test]
    fn inputs_parse_defaults() {
        let inputs = ComponentInputs::from_form(&form_with_key()).unwrap();
        assert_eq!(inputs.api_key.expose_secret(), "sk-ant-test");
        assert_eq!(inputs.max_tokens, Some(4096));
        assert_eq!(inputs.temperature, Some(0.1));
        assert_eq!(inputs.base_url.as_deref(), Some("https://api.anthropic.com"));
        assert!(!inputs.stream);
        assert!(!inputs.tool_model_enabled);
        assert!(!format!("{inputs:?}").contains("sk-ant-test"));
    }

    #[test]
    fn missing_key_is_rejected() {
        let err = ComponentInputs::from_form(&default_form()).unwrap_err();
        assert!(matches!(err, Error::InvalidField { field: API_KEY, .. }));
    }

    #[test]
    fn max_tokens_parsing() {
        assert_eq!(parse_max_tokens(Some(&json!(""))).unwrap(), None);
        assert_eq!(parse_max_tokens(Some(&json!("512"))).unwrap(), Some(512));
        assert_eq!(parse_max_tokens(Some(&json!(0))).unwrap(), Some(0));
        assert!(parse_max_tokens(Some(&json!(-1))).is_err());
        assert!(parse_max_tokens(Some(&json!("lots"))).is_err());
    }

    #[test]
    fn temperature_is_clamped() {
        assert_eq!(parse_temperature(Some(&json!(1.7))).unwrap(), Some(1.0));
        assert_eq!(parse_temperature(Some(&json!(-0.5))).unwrap(), Some(0.0));
        assert_eq!(parse_temperature(Some(&json!("0.5"))).unwrap(), Some(0.5));
        assert!(parse_temperature(Some(&json!(true))).is_err());
    }

    #[test]
    fn blank_base_url_is_omitted() {
        let mut form = form_with_key();
        form.set_value(BASE_URL, json!("  ")).unwrap();
        let inputs = ComponentInputs::from_form(&form).unwrap();
        assert_eq!(inputs.base_url, None);
    }

    #[test]
    fn config_seeds_form() {
        let config = AnthropicConfig {
            api_key: Some(Secret::new("sk-ant-config".into())),
            model: Some("claude-3-5-haiku-latest".into()),
            max_tokens: 1024,
            tool_model_enabled: true,
            ..Default::default()
        };
        let form = form_from_config(&config).unwrap();
        assert_eq!(form.value(API_KEY), Some(&json!("sk-ant-config")));
        assert_eq!(form.value(MODEL_NAME), Some(&json!("claude-3-5-haiku-latest")));
        assert_eq!(form.value(MAX_TOKENS), Some(&json!(1024)));
        assert_eq!(form.value(TOOL_MODEL_ENABLED), Some(&json!(true)));
        assert_eq!(form.value(BASE_URL), Some(&json!("https://api.anthropic.com")));
    }

    #[test]
    fn deprecated_configured_model_is_kept() {
        let config = AnthropicConfig {
            model: Some("claude-3-5-sonnet-20240620".into()),
            ..Default::default()
        };
        let form = form_from_config(&config).unwrap();
        assert_eq!(form.value(MODEL_NAME), Some(&json!("claude-3-5-sonnet-20240620")));
        let options = &form.get(MODEL_NAME).unwrap().options;
        assert!(!options.iter().any(|m| m == "claude-3-5-sonnet-20240620"));
    }

    #[test]
    fn build_model_without_sdk_is_integration_unavailable() {
        let err = build_model(&ModelClientFactory::unavailable(), &form_with_key()).unwrap_err();
        assert!(matches!(
            err,
            Error::Provider(weft_providers::Error::IntegrationUnavailable { .. })
        ));
    }
}
