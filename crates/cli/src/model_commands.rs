use {
    anyhow::{Context, Result, bail},
    serde_json::{Value, json},
    tracing::{info, warn},
};

use {
    weft_component::{
        CatalogResolver, ConfigurationRefresh, FormConfiguration, METADATA, RefreshTrigger,
        build_model, form_from_config,
    },
    weft_config::WeftConfig,
    weft_providers::ModelClientFactory,
};

fn resolver(settings: &WeftConfig) -> CatalogResolver {
    let factory = ModelClientFactory::from_config(&settings.discovery);
    CatalogResolver::from_config(factory, &settings.discovery)
        .with_base_url(Some(settings.anthropic.effective_base_url().to_string()))
}

fn form(settings: &WeftConfig) -> Result<FormConfiguration> {
    form_from_config(&settings.anthropic).context("failed to seed the component form")
}

/// JSON when it parses, otherwise the raw text as a string.
fn parse_field_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub async fn list_models(settings: &WeftConfig, tools: bool) -> Result<()> {
    let resolver = resolver(settings);
    let models = match &settings.anthropic.api_key {
        Some(key) if settings.anthropic.has_api_key() => resolver.list_models(key, tools).await?,
        _ => {
            warn!("no API key configured, listing the static catalog only");
            resolver.static_catalog().known().to_vec()
        },
    };
    for model in &models {
        println!("{model}");
    }
    info!(count = models.len(), tools, "listed models");
    Ok(())
}

pub fn print_form(settings: &WeftConfig) -> Result<()> {
    let output = json!({
        "metadata": METADATA,
        "fields": form(settings)?.redacted(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub async fn refresh(settings: &WeftConfig, field: &str, raw_value: &str) -> Result<()> {
    let mut form = form(settings)?;
    let value = parse_field_value(raw_value);
    if !form.contains(field) {
        bail!("unknown field `{field}`");
    }
    form.set_value(field, value.clone())?;

    let mut refresh = ConfigurationRefresh::new(resolver(settings));
    let trigger = RefreshTrigger::new(field, value);
    let updates = refresh.update_build_config(&mut form, &trigger).await?;

    let output = json!({
        "updates": updates,
        "form": form.redacted(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn check(settings: &WeftConfig) -> Result<()> {
    let factory = ModelClientFactory::from_config(&settings.discovery);
    let form = form(settings)?;
    match build_model(&factory, &form) {
        Ok(client) => {
            eprintln!(
                "Built {} client for {} (tools: {}, vision: {}, context window: {})",
                client.name(),
                client.id(),
                client.supports_tools(),
                client.supports_vision(),
                client.context_window()
            );
            Ok(())
        },
        Err(e) => Err(anyhow::Error::new(e).context("could not build the Anthropic client")),
    }
}
