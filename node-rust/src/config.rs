use crate::ConfigError;
use std::env;

pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";
pub const REGION_VAR: &str = "AWS_REGION";
pub const ENDPOINT_URL_VAR: &str = "BEDROCK_ENDPOINT_URL";

pub const DEFAULT_REGION: &str = "us-east-1";

/// Static AWS credentials. Read once, never refreshed.
#[derive(Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Credentials {
    #[must_use]
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    #[must_use]
    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(session_token.into());
        self
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Everything needed to build the Bedrock runtime transport.
#[derive(Debug, Clone)]
pub struct BedrockConfig {
    pub credentials: Credentials,
    pub region: String,
    /// Overrides the regional endpoint, e.g. for a VPC endpoint or a local
    /// stub server.
    pub endpoint_url: Option<String>,
}

impl BedrockConfig {
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            region: DEFAULT_REGION.to_string(),
            endpoint_url: None,
        }
    }

    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Load `.env` if present, then read the configuration from the process
    /// environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable lookup. Missing or
    /// empty credentials fail before anything touches the network.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let (Some(access_key_id), Some(secret_access_key)) =
            (read(ACCESS_KEY_ID_VAR), read(SECRET_ACCESS_KEY_VAR))
        else {
            let missing = if read(ACCESS_KEY_ID_VAR).is_none() {
                ACCESS_KEY_ID_VAR
            } else {
                SECRET_ACCESS_KEY_VAR
            };
            tracing::error!(
                "Please set {ACCESS_KEY_ID_VAR} and {SECRET_ACCESS_KEY_VAR} in .env file ({missing} is missing)"
            );
            return Err(ConfigError::MissingCredential(missing));
        };

        let mut credentials = Credentials::new(access_key_id, secret_access_key);
        if let Some(token) = read(SESSION_TOKEN_VAR) {
            credentials = credentials.with_session_token(token);
        }

        let mut config = Self::new(credentials);
        if let Some(region) = read(REGION_VAR) {
            config = config.with_region(region);
        }
        if let Some(endpoint_url) = read(ENDPOINT_URL_VAR) {
            if !endpoint_url.starts_with("http://") && !endpoint_url.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    name: ENDPOINT_URL_VAR,
                    reason: format!("expected an http(s) URL, got {endpoint_url:?}"),
                });
            }
            config = config.with_endpoint_url(endpoint_url.trim_end_matches('/'));
        }

        Ok(config)
    }
}
