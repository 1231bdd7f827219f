//! Configuration refresh: turns one field edit into explicit field updates.

use std::time::Instant;

use {
    secrecy::Secret,
    serde::{Deserialize, Serialize},
    serde_json::{Value, json},
    tracing::{debug, info, warn},
};

use {weft_config::DEFAULT_ANTHROPIC_API_URL, weft_providers::Error as ProviderError};

use crate::{
    catalog::CatalogResolver,
    component::{API_KEY, BASE_URL, MODEL_NAME, TOOL_MODEL_ENABLED},
    error::{Error, Result},
    form::{FieldUpdate, FormConfiguration, is_blank, is_truthy},
};

/// Edits to these fields rebuild the model list.
pub const REFRESH_FIELDS: [&str; 4] = [BASE_URL, MODEL_NAME, TOOL_MODEL_ENABLED, API_KEY];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshState {
    #[default]
    Idle,
    Refreshing,
}

/// The field edit that starts a refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshTrigger {
    pub field: String,
    pub value: Value,
}

impl RefreshTrigger {
    pub fn new(field: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            value,
        }
    }

    fn rebuilds_models(&self) -> bool {
        REFRESH_FIELDS.contains(&self.field.as_str())
            && (is_truthy(&self.value) || self.field == API_KEY)
    }
}

/// Marks one refresh cycle; returns the machine to `Idle` and logs the elapsed
/// time when dropped, whichever way the cycle ends.
struct RefreshCycle<'a> {
    state: &'a mut RefreshState,
    field: String,
    started: Instant,
}

impl<'a> RefreshCycle<'a> {
    fn start(state: &'a mut RefreshState, field: &str) -> Self {
        *state = RefreshState::Refreshing;
        debug!(field, "configuration refresh started");
        Self {
            state,
            field: field.to_string(),
            started: Instant::now(),
        }
    }
}

impl Drop for RefreshCycle<'_> {
    fn drop(&mut self) {
        *self.state = RefreshState::Idle;
        info!(
            field = %self.field,
            elapsed_ms = self.started.elapsed().as_millis(),
            "configuration refresh finished"
        );
    }
}

/// Field values seen by one refresh: the stored form overlaid with the edit.
struct EffectiveValues {
    api_key: String,
    base_url: Option<String>,
    tool_model_enabled: bool,
}

impl EffectiveValues {
    fn read(form: &FormConfiguration, trigger: &RefreshTrigger) -> Self {
        let value = |field: &str| {
            if trigger.field == field {
                Some(&trigger.value)
            } else {
                form.value(field)
            }
        };
        let text = |field: &str| match value(field) {
            Some(Value::String(s)) => s.clone(),
            _ => String::new(),
        };
        let base_url = text(BASE_URL);
        Self {
            api_key: text(API_KEY),
            base_url: (!base_url.trim().is_empty()).then_some(base_url),
            tool_model_enabled: value(TOOL_MODEL_ENABLED).is_some_and(is_truthy),
        }
    }
}

/// The refresh state machine. One cycle runs per edit, sequentially, and no
/// state carries over between cycles.
#[derive(Debug)]
pub struct ConfigurationRefresh {
    resolver: CatalogResolver,
    state: RefreshState,
}

impl ConfigurationRefresh {
    pub fn new(resolver: CatalogResolver) -> Self {
        Self {
            resolver,
            state: RefreshState::Idle,
        }
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn resolver(&self) -> &CatalogResolver {
        &self.resolver
    }

    /// Updates produced by `trigger` against `form`. The form is not modified.
    pub async fn refresh(
        &mut self,
        form: &FormConfiguration,
        trigger: &RefreshTrigger,
    ) -> Result<Vec<FieldUpdate>> {
        let _cycle = RefreshCycle::start(&mut self.state, &trigger.field);
        let mut updates: Vec<FieldUpdate> = base_url_update(form, trigger).into_iter().collect();
        updates.extend(model_update(&self.resolver, form, trigger).await?);
        Ok(updates)
    }

    /// Apply the updates produced by `trigger` to `form`.
    ///
    /// The `base_url` coercion is applied before the model list is rebuilt and
    /// stays applied when that step fails.
    pub async fn update_build_config(
        &mut self,
        form: &mut FormConfiguration,
        trigger: &RefreshTrigger,
    ) -> Result<Vec<FieldUpdate>> {
        let _cycle = RefreshCycle::start(&mut self.state, &trigger.field);
        let mut updates: Vec<FieldUpdate> = base_url_update(form, trigger).into_iter().collect();
        form.apply(&updates)?;

        if let Some(update) = model_update(&self.resolver, form, trigger).await? {
            form.apply(std::slice::from_ref(&update))?;
            updates.push(update);
        }
        Ok(updates)
    }
}

/// Default endpoint when the edit clears `base_url` or the stored value is null.
fn base_url_update(form: &FormConfiguration, trigger: &RefreshTrigger) -> Option<FieldUpdate> {
    let cleared = trigger.field == BASE_URL && is_blank(&trigger.value);
    let unset = form.value(BASE_URL).is_some_and(Value::is_null);
    (form.contains(BASE_URL) && (cleared || unset))
        .then(|| FieldUpdate::value(BASE_URL, json!(DEFAULT_ANTHROPIC_API_URL)))
}

async fn model_update(
    resolver: &CatalogResolver,
    form: &FormConfiguration,
    trigger: &RefreshTrigger,
) -> Result<Option<FieldUpdate>> {
    if !trigger.rebuilds_models() {
        return Ok(None);
    }
    if !form.contains(MODEL_NAME) {
        return Err(Error::refresh_failed(Error::UnknownField(
            MODEL_NAME.to_string(),
        )));
    }

    let effective = EffectiveValues::read(form, trigger);
    let models = resolve_models(resolver, &effective).await;
    FieldUpdate::select_first(MODEL_NAME, models)
        .map(Some)
        .ok_or_else(|| Error::refresh_failed(Error::EmptyCatalog))
}

async fn resolve_models(resolver: &CatalogResolver, effective: &EffectiveValues) -> Vec<String> {
    let fallback = || resolver.static_catalog().known().to_vec();
    if effective.api_key.is_empty() {
        debug!("no API key, offering static catalog");
        return fallback();
    }

    let credential = Secret::new(effective.api_key.clone());
    let resolver = resolver.clone().with_base_url(effective.base_url.clone());
    match resolver
        .list_models(&credential, effective.tool_model_enabled)
        .await
    {
        Ok(models) => models,
        Err(
            err @ (ProviderError::IntegrationUnavailable { .. }
            | ProviderError::InvalidConfiguration(_)
            | ProviderError::ConnectionFailed { .. }),
        ) => {
            warn!(
                error = %err,
                provider_message = err.provider_message().unwrap_or_default(),
                tool_model_enabled = effective.tool_model_enabled,
                "error getting model names, offering static catalog"
            );
            fallback()
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::component::default_form,
        weft_providers::{ModelClientFactory, StaticCatalog, catalog::KNOWN_MODELS},
    };

    fn refresh_without_sdk() -> ConfigurationRefresh {
        ConfigurationRefresh::new(CatalogResolver::new(ModelClientFactory::unavailable()))
    }

    fn keyed_form() -> FormConfiguration {
        let mut form = default_form();
        form.set_value(API_KEY, json!("sk-ant-test")).unwrap();
        form
    }

    #[test]
    fn trigger_fields() {
        assert!(RefreshTrigger::new(MODEL_NAME, json!("claude-3-opus-latest")).rebuilds_models());
        assert!(RefreshTrigger::new(TOOL_MODEL_ENABLED, json!(true)).rebuilds_models());
        assert!(!RefreshTrigger::new(TOOL_MODEL_ENABLED, json!(false)).rebuilds_models());
        assert!(!RefreshTrigger::new(BASE_URL, json!("")).rebuilds_models());
        assert!(RefreshTrigger::new(API_KEY, json!("")).rebuilds_models());
        assert!(!RefreshTrigger::new("temperature", json!(0.5)).rebuilds_models());
    }

    #[test]
    fn effective_values_overlay_trigger() {
        let form = keyed_form();
        let values = EffectiveValues::read(&form, &RefreshTrigger::new(API_KEY, json!("")));
        assert!(values.api_key.is_empty());
        assert_eq!(values.base_url.as_deref(), Some("https://api.anthropic.com"));

        let values =
            EffectiveValues::read(&form, &RefreshTrigger::new(TOOL_MODEL_ENABLED, json!(true)));
        assert_eq!(values.api_key, "sk-ant-test");
        assert!(values.tool_model_enabled);

        let values = EffectiveValues::read(&form, &RefreshTrigger::new(BASE_URL, json!(null)));
        assert_eq!(values.base_url, None);
    }

    #[tokio::test]
    async fn unrelated_field_is_a_no_op() {
        let mut refresh = refresh_without_sdk();
        let updates = refresh
            .refresh(&keyed_form(), &RefreshTrigger::new("temperature", json!(0.3)))
            .await
            .unwrap();
        assert!(updates.is_empty());
        assert_eq!(refresh.state(), RefreshState::Idle);
    }

    #[tokio::test]
    async fn null_stored_base_url_is_coerced() {
        let mut form = keyed_form();
        form.set_value(BASE_URL, Value::Null).unwrap();
        let updates = refresh_without_sdk()
            .refresh(&form, &RefreshTrigger::new("temperature", json!(0.3)))
            .await
            .unwrap();
        assert_eq!(updates, vec![FieldUpdate::value(
            BASE_URL,
            json!("https://api.anthropic.com")
        )]);
    }

    #[tokio::test]
    async fn missing_sdk_falls_back_to_static_catalog() {
        let mut form = keyed_form();
        form.set_value(TOOL_MODEL_ENABLED, json!(true)).unwrap();
        let updates = refresh_without_sdk()
            .refresh(&form, &RefreshTrigger::new(MODEL_NAME, json!("claude-3-opus-latest")))
            .await
            .unwrap();
        let update = &updates[0];
        assert_eq!(update.field, MODEL_NAME);
        let expected: Vec<String> = KNOWN_MODELS.iter().map(ToString::to_string).collect();
        assert_eq!(update.options.as_ref(), Some(&expected));
        assert_eq!(update.value, Some(json!(KNOWN_MODELS[0])));
        assert_eq!(update.combobox, Some(true));
    }

    #[tokio::test]
    async fn empty_catalog_fails_the_refresh() {
        let none = Vec::<String>::new;
        let resolver = CatalogResolver::new(ModelClientFactory::unavailable())
            .with_catalog(StaticCatalog::new(none(), none(), none()));
        let mut refresh = ConfigurationRefresh::new(resolver);
        let err = refresh
            .refresh(&default_form(), &RefreshTrigger::new(API_KEY, json!("")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConfigurationRefreshFailed { .. }));
        assert!(err.to_string().starts_with("Error getting model names: "));
        assert_eq!(refresh.state(), RefreshState::Idle);
    }

    #[tokio::test]
    async fn base_url_coercion_survives_a_failed_model_rebuild() {
        let none = Vec::<String>::new;
        let resolver = CatalogResolver::new(ModelClientFactory::unavailable())
            .with_catalog(StaticCatalog::new(none(), none(), none()));
        let mut refresh = ConfigurationRefresh::new(resolver);
        let mut form = default_form();
        form.set_value(BASE_URL, Value::Null).unwrap();

        let err = refresh
            .update_build_config(&mut form, &RefreshTrigger::new(API_KEY, json!("")))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ConfigurationRefreshFailed { .. }));
        assert_eq!(form.value(BASE_URL), Some(&json!("https://api.anthropic.com")));
        assert_eq!(refresh.state(), RefreshState::Idle);
    }

    #[tokio::test]
    async fn form_without_model_field_fails_the_refresh() {
        let form: FormConfiguration = default_form()
            .fields()
            .filter(|f| f.name != MODEL_NAME)
            .cloned()
            .collect();
        let err = refresh_without_sdk()
            .refresh(&form, &RefreshTrigger::new(API_KEY, json!("")))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error getting model names: form has no field named `model_name`"
        );
    }

    #[tokio::test]
    async fn update_build_config_applies_updates() {
        let mut form = keyed_form();
        form.set_value(MODEL_NAME, json!("custom-model")).unwrap();
        form.set_value(BASE_URL, json!("")).unwrap();
        let updates = refresh_without_sdk()
            .update_build_config(&mut form, &RefreshTrigger::new(BASE_URL, json!("")))
            .await
            .unwrap();
        assert_eq!(updates.len(), 1);
        assert_eq!(form.value(BASE_URL), Some(&json!("https://api.anthropic.com")));
        assert_eq!(form.value(MODEL_NAME), Some(&json!("custom-model")));
    }
}
