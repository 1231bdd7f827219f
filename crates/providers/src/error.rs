use thiserror::Error;

/// Structural rejection of client parameters by a provider SDK.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Failures raised by a [`ProviderSdk`](crate::sdk::ProviderSdk) implementation.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Non-success HTTP status with the provider's error body.
    #[error("{provider} API error HTTP {status}: {message}")]
    Api {
        provider: &'static str,
        status: u16,
        error_type: Option<String>,
        message: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SdkError {
    /// Human-readable message from a structured provider error body, if any.
    #[must_use]
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } if !message.is_empty() => Some(message),
            _ => None,
        }
    }
}

/// Errors surfaced by the model client factory.
#[derive(Debug, Error)]
pub enum Error {
    /// The provider SDK is not compiled in or was not installed in the factory.
    #[error(
        "{integration} is not installed. Please install it by enabling the `{feature}` feature of weft-providers."
    )]
    IntegrationUnavailable {
        integration: &'static str,
        feature: &'static str,
    },

    /// The SDK rejected the parameter set. Carries the SDK's detail unchanged.
    #[error(transparent)]
    InvalidConfiguration(#[from] ValidationError),

    /// Any other construction-time failure.
    #[error("Could not connect to {provider} API.")]
    ConnectionFailed {
        provider: &'static str,
        #[source]
        source: SdkError,
    },
}

impl Error {
    /// Provider-supplied error message behind this failure, when the provider
    /// returned a structured error body.
    #[must_use]
    pub fn provider_message(&self) -> Option<&str> {
        match self {
            Self::ConnectionFailed { source, .. } => source.api_message(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
