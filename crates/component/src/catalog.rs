//! Capability-filtered model catalog.
//!
//! Listing is best-effort: any discovery failure degrades to the static
//! catalog. Tool filtering is not: a probe client that cannot be built aborts
//! the whole pass.

use std::sync::Arc;

use {
    secrecy::Secret,
    tracing::{debug, trace, warn},
};

use {
    weft_config::DiscoveryConfig,
    weft_providers::{
        ModelClientFactory, ModelParameters, Result, StaticCatalog, ToolCalling,
        effective_base_url,
    },
};

pub const DEFAULT_DISCOVERY_LIMIT: u32 = 20;

#[derive(Debug, Clone)]
pub struct CatalogResolver {
    factory: ModelClientFactory,
    catalog: Arc<StaticCatalog>,
    base_url: Option<String>,
    limit: u32,
    discovery_enabled: bool,
}

impl CatalogResolver {
    pub fn new(factory: ModelClientFactory) -> Self {
        Self {
            factory,
            catalog: Arc::new(StaticCatalog::anthropic()),
            base_url: None,
            limit: DEFAULT_DISCOVERY_LIMIT,
            discovery_enabled: true,
        }
    }

    pub fn from_config(factory: ModelClientFactory, discovery: &DiscoveryConfig) -> Self {
        Self::new(factory)
            .with_limit(discovery.limit)
            .with_discovery(discovery.enabled)
    }

    pub fn with_catalog(mut self, catalog: StaticCatalog) -> Self {
        self.catalog = Arc::new(catalog);
        self
    }

    /// Endpoint for listing and probe clients. `None` or blank uses the
    /// public API.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_discovery(mut self, enabled: bool) -> Self {
        self.discovery_enabled = enabled;
        self
    }

    pub fn factory(&self) -> &ModelClientFactory {
        &self.factory
    }

    pub fn static_catalog(&self) -> &StaticCatalog {
        &self.catalog
    }

    /// Endpoint discovery and probe clients talk to.
    pub fn base_url(&self) -> &str {
        effective_base_url(self.base_url.as_deref())
    }

    /// Static catalog followed by discovered IDs, optionally narrowed to
    /// models that can call tools. Duplicates are kept.
    pub async fn list_models(
        &self,
        credential: &Secret<String>,
        tool_calling_required: bool,
    ) -> Result<Vec<String>> {
        let mut models = self.catalog.known().to_vec();
        models.extend(self.discover(credential).await);

        if !tool_calling_required {
            return Ok(models);
        }
        self.filter_tool_models(models, credential)
    }

    async fn discover(&self, credential: &Secret<String>) -> Vec<String> {
        if !self.discovery_enabled || self.limit == 0 {
            debug!("model discovery disabled, using static catalog");
            return Vec::new();
        }
        let sdk = match self.factory.sdk() {
            Ok(sdk) => sdk,
            Err(err) => {
                warn!(error = %err, "model discovery unavailable, using static catalog");
                return Vec::new();
            },
        };
        match sdk.list_models(credential, self.base_url(), self.limit).await {
            Ok(discovered) => {
                debug!(
                    provider = sdk.integration(),
                    count = discovered.len(),
                    "discovered models"
                );
                discovered.into_iter().map(|m| m.id).collect()
            },
            Err(err) => {
                warn!(
                    provider = sdk.integration(),
                    error = %err,
                    provider_message = err.api_message().unwrap_or_default(),
                    "model discovery failed, using static catalog"
                );
                Vec::new()
            },
        }
    }

    fn filter_tool_models(
        &self,
        candidates: Vec<String>,
        credential: &Secret<String>,
    ) -> Result<Vec<String>> {
        self.factory.sdk()?;

        let mut kept = Vec::with_capacity(candidates.len());
        for model in candidates {
            match self.catalog.tool_calling(&model) {
                ToolCalling::Supported => kept.push(model),
                ToolCalling::Unsupported => trace!(model = %model, "dropping model without tools"),
                ToolCalling::Unknown => {
                    let probe = self.factory.build_client(
                        ModelParameters::probe(model.clone(), self.base_url.clone()),
                        credential.clone(),
                    )?;
                    let supported = probe.supports_tools();
                    trace!(model = %model, supported, "probed tool calling");
                    if supported {
                        kept.push(model);
                    }
                },
            }
        }
        Ok(kept)
    }
}
