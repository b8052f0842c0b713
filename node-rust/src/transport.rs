use crate::{BedrockConfig, PromptNodeError, PromptNodeResult};
use aws_config::BehaviorVersion;
use aws_sdk_bedrockruntime::{
    config::{retry::RetryConfig, Builder as BedrockConfigBuilder, Region},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::invoke_model::InvokeModelError,
    primitives::Blob,
    Client,
};

const PROVIDER: &str = "aws.bedrock";
const CREDENTIALS_PROVIDER_NAME: &str = "bedrock-prompt-node";

/// Performs the authenticated `InvokeModel` call. The body is the serialized
/// JSON request; the returned bytes are the raw JSON response body.
///
/// Errors reported by the provider must be returned as
/// [`PromptNodeError::Provider`] carrying the provider's error code and
/// message.
#[async_trait::async_trait]
pub trait BedrockTransport: Send + Sync {
    fn provider(&self) -> &'static str;
    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> PromptNodeResult<Vec<u8>>;
}

/// [`BedrockTransport`] backed by the AWS SDK Bedrock runtime client.
#[derive(Debug, Clone)]
pub struct AwsBedrockTransport {
    client: Client,
}

impl AwsBedrockTransport {
    #[must_use]
    pub fn new(config: &BedrockConfig) -> Self {
        let credentials = aws_credential_types::Credentials::new(
            &config.credentials.access_key_id,
            &config.credentials.secret_access_key,
            config.credentials.session_token.clone(),
            None,
            CREDENTIALS_PROVIDER_NAME,
        );

        let mut builder = BedrockConfigBuilder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .retry_config(RetryConfig::disabled());

        if let Some(ref endpoint_url) = config.endpoint_url {
            builder = builder.endpoint_url(endpoint_url);
        }

        tracing::debug!(region = %config.region, "Creating Bedrock runtime client");

        Self {
            client: Client::from_conf(builder.build()),
        }
    }

    /// Use an already configured SDK client.
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl BedrockTransport for AwsBedrockTransport {
    fn provider(&self) -> &'static str {
        PROVIDER
    }

    async fn invoke_model(&self, model_id: &str, body: Vec<u8>) -> PromptNodeResult<Vec<u8>> {
        let output = self
            .client
            .invoke_model()
            .model_id(model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(map_sdk_error)?;

        Ok(output.body.into_inner())
    }
}

fn map_sdk_error<R>(error: SdkError<InvokeModelError, R>) -> PromptNodeError
where
    R: std::fmt::Debug,
{
    if let Some(service_error) = error.as_service_error() {
        return PromptNodeError::Provider {
            code: service_error.code().unwrap_or("Unknown").to_string(),
            message: service_error.message().unwrap_or_default().to_string(),
        };
    }
    PromptNodeError::Transport(DisplayErrorContext(&error).to_string())
}
