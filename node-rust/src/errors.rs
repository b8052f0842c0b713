use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is unset or empty.
    #[error("Missing credential {0}. Please set AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY in .env file")]
    MissingCredential(&'static str),
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image batch contains no frames")]
    EmptyBatch,
    #[error("Invalid image shape: {0}")]
    Shape(String),
    #[error("Unsupported channel count: {0} (expected 1, 3 or 4)")]
    UnsupportedChannels(usize),
    /// The image bytes are in a format the model does not accept.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Image read error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum PromptNodeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Image error: {0}")]
    Image(#[from] ImageError),
    /// The model selector is not one of the known labels.
    #[error("Unsupported model selector: {0:?}")]
    UnsupportedModel(String),
    /// The provider rejected the request (e.g. `ValidationException`,
    /// `ThrottlingException`, `AccessDeniedException`).
    #[error("Provider error: {code}: {message}")]
    Provider { code: String, message: String },
    /// The request never produced a provider response (connection, timeout,
    /// credential resolution).
    #[error("Transport error: {0}")]
    Transport(String),
    /// The response carried no content blocks.
    #[error("Empty response: the model returned no content")]
    EmptyResponse,
    /// The response from the provider was unexpected. (e.g. a body that is
    /// not JSON, or a first content block without text)
    #[error("Invariant from {0}: {1}")]
    Invariant(&'static str, String),
}

impl PromptNodeError {
    /// Provider error code and message, when the error came from the provider.
    #[must_use]
    pub fn provider_details(&self) -> Option<(&str, &str)> {
        match self {
            Self::Provider { code, message } => Some((code, message)),
            _ => None,
        }
    }
}

pub type PromptNodeResult<T> = Result<T, PromptNodeError>;
