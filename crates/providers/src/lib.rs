//! Chat-model client construction and model catalogs for the Anthropic
//! component.

#[cfg(feature = "provider-anthropic")]
pub mod anthropic;
pub mod catalog;
pub mod error;
pub mod factory;
pub mod model;
pub mod sdk;

pub use {
    catalog::{StaticCatalog, ToolCalling},
    error::{Error, Result, SdkError, ValidationError},
    factory::{ANTHROPIC_FEATURE, ModelClientFactory},
    model::{ChatModel, ClientHandle, ClientSettings, ModelParameters, effective_base_url},
    sdk::ProviderSdk,
};

/// A model returned by a provider's model-listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredModel {
    pub id: String,
    pub display_name: String,
    /// RFC 3339 creation time as reported by the API.
    pub created_at: Option<String>,
}

impl DiscoveredModel {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            created_at: None,
        }
    }

    pub fn with_created_at(mut self, created_at: Option<String>) -> Self {
        self.created_at = created_at;
        self
    }
}
