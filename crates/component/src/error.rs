use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Provider(#[from] weft_providers::Error),

    #[error("invalid value for `{field}`: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("form has no field named `{0}`")]
    UnknownField(String),

    #[error("model catalog is empty")]
    EmptyCatalog,

    /// A failure inside the model-list refresh branch.
    #[error("Error getting model names: {source}")]
    ConfigurationRefreshFailed {
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    #[must_use]
    pub fn invalid_field(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn refresh_failed(source: impl Into<Error>) -> Self {
        Self::ConfigurationRefreshFailed {
            source: Box::new(source.into()),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
