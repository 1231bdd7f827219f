//! Model client factory: parameters + credential in, client handle out.

use std::{sync::Arc, time::Duration};

use {secrecy::Secret, tracing::debug};

use crate::{
    error::{Error, Result, SdkError},
    model::{ClientHandle, ModelParameters},
    sdk::ProviderSdk,
};

/// Cargo feature that compiles the Anthropic SDK in.
pub const ANTHROPIC_FEATURE: &str = "provider-anthropic";

/// Builds chat-model clients through a provider SDK.
///
/// A factory without an SDK models the SDK not being installed: every
/// construction fails with [`Error::IntegrationUnavailable`].
#[derive(Clone)]
pub struct ModelClientFactory {
    sdk: Option<Arc<dyn ProviderSdk>>,
}

impl std::fmt::Debug for ModelClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelClientFactory")
            .field("sdk", &self.sdk.as_ref().map(|sdk| sdk.integration()))
            .finish()
    }
}

impl ModelClientFactory {
    pub fn new(sdk: Arc<dyn ProviderSdk>) -> Self {
        Self { sdk: Some(sdk) }
    }

    /// A factory with no SDK installed.
    pub fn unavailable() -> Self {
        Self { sdk: None }
    }

    /// The Anthropic SDK when compiled in, otherwise an unavailable factory.
    pub fn anthropic(timeout: Option<Duration>) -> Self {
        #[cfg(feature = "provider-anthropic")]
        {
            Self::new(Arc::new(
                crate::anthropic::AnthropicSdk::new().with_timeout(timeout),
            ))
        }
        #[cfg(not(feature = "provider-anthropic"))]
        {
            let _ = timeout;
            Self::unavailable()
        }
    }

    /// Factory configured from the discovery settings (`timeout_secs = 0`
    /// keeps the HTTP client default).
    pub fn from_config(discovery: &weft_config::DiscoveryConfig) -> Self {
        let timeout = (discovery.timeout_secs > 0).then(|| Duration::from_secs(discovery.timeout_secs));
        Self::anthropic(timeout)
    }

    /// The installed SDK, or [`Error::IntegrationUnavailable`].
    pub fn sdk(&self) -> Result<&Arc<dyn ProviderSdk>> {
        self.sdk.as_ref().ok_or(Error::IntegrationUnavailable {
            integration: "anthropic",
            feature: ANTHROPIC_FEATURE,
        })
    }

    /// Construct a client for `parameters`. Sends no request.
    pub fn build_client(
        &self,
        parameters: ModelParameters,
        credential: Secret<String>,
    ) -> Result<ClientHandle> {
        let sdk = self.sdk()?;
        let settings = parameters.into_settings(credential);
        debug!(
            integration = sdk.integration(),
            model = %settings.model,
            "building chat model client"
        );
        sdk.chat_model(settings).map_err(|err| match err {
            SdkError::Validation(validation) => Error::InvalidConfiguration(validation),
            source => Error::ConnectionFailed {
                provider: sdk.display_name(),
                source,
            },
        })
    }
}

impl Default for ModelClientFactory {
    fn default() -> Self {
        Self::anthropic(None)
    }
}
