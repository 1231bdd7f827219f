//! The seam between this crate and a provider's client library.

use async_trait::async_trait;

use secrecy::Secret;

use crate::{
    DiscoveredModel,
    error::SdkError,
    model::{ClientHandle, ClientSettings},
};

/// Client construction and catalog listing for one provider.
#[async_trait]
pub trait ProviderSdk: Send + Sync {
    /// Integration name used in "not installed" messages (e.g. "anthropic").
    fn integration(&self) -> &'static str;

    /// Provider name as shown to users (e.g. "Anthropic").
    fn display_name(&self) -> &'static str;

    /// Construct a chat-model client. Must not send a request.
    fn chat_model(&self, settings: ClientSettings) -> Result<ClientHandle, SdkError>;

    /// List models visible to `api_key`, newest first, at most `limit` entries.
    async fn list_models(
        &self,
        api_key: &Secret<String>,
        base_url: &str,
        limit: u32,
    ) -> Result<Vec<DiscoveredModel>, SdkError>;
}
