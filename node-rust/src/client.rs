use crate::{
    api::{
        Base64ImageSource, ImageSource, InputContentBlock, InputMessage, InvokeModelRequest,
        InvokeModelResponse, RequestImageBlock, RequestTextBlock, ANTHROPIC_VERSION,
    },
    opentelemetry::trace_invoke,
    AwsBedrockTransport, BedrockConfig, BedrockTransport, EncodedImage, ModelSelector,
    PromptNodeError, PromptNodeResult,
};
use std::sync::Arc;
use tracing::{error, info};

pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Explains prompt-weighting syntax to the model and asks for prompt words
/// only.
pub const SYSTEM_PROMPT: &str = r#"StableDiffusion is a deep learning text-to-image model that generates images based on prompts. These prompts can specify the desired elements of the image, such as the appearance of characters, background, color and lighting effects, as well as the theme and style of the image. The prompts often contain weighted numbers in parentheses to indicate the importance or emphasis of certain details. For example, "(masterpiece:1.5)" indicates that the quality of the work is very important. Multiple parentheses also have similar effects. In addition, if square brackets are used, such as "{blue hair:white hair:0.3}", this represents the fusion of blue and white hair, with blue hair accounting for 0.3.
Here is an example of using prompts to help an AI model generate an image: masterpiece,(bestquality),highlydetailed,ultra-detailed,cold,solo,(1girl),(detailedeyes),(shinegoldeneyes),(longliverhair),expressionless,(long sleeves),(puffy sleeves),(white wings),shinehalo,(heavymetal:1.2),(metaljewelry),cross-lacedfootwear (chain),(Whitedoves:1.2)
Following the example, provide a set of prompts that detail the following content. Start the prompts directly without using natural language to describe them:"#;

#[derive(Debug, Clone)]
pub struct BedrockClientOptions {
    /// `None` sends no system prompt.
    pub system_prompt: Option<String>,
    pub max_tokens: u32,
    pub anthropic_version: String,
}

impl Default for BedrockClientOptions {
    fn default() -> Self {
        Self {
            system_prompt: Some(SYSTEM_PROMPT.to_string()),
            max_tokens: DEFAULT_MAX_TOKENS,
            anthropic_version: ANTHROPIC_VERSION.to_string(),
        }
    }
}

/// Sends an instruction and an image to Claude on Bedrock and returns the
/// generated prompt.
#[derive(Clone)]
pub struct BedrockClient {
    transport: Arc<dyn BedrockTransport>,
    options: BedrockClientOptions,
}

impl BedrockClient {
    #[must_use]
    pub fn new(transport: Arc<dyn BedrockTransport>, options: BedrockClientOptions) -> Self {
        Self { transport, options }
    }

    #[must_use]
    pub fn from_config(config: &BedrockConfig) -> Self {
        Self::new(
            Arc::new(AwsBedrockTransport::new(config)),
            BedrockClientOptions::default(),
        )
    }

    /// Read credentials from the environment (and `.env`). Fails before any
    /// request is made if they are missing.
    pub fn from_env() -> PromptNodeResult<Self> {
        let config = BedrockConfig::from_env()?;
        Ok(Self::from_config(&config))
    }

    #[must_use]
    pub fn options(&self) -> &BedrockClientOptions {
        &self.options
    }

    pub async fn invoke_encoded(
        &self,
        prompt: &str,
        image: &EncodedImage,
        model: ModelSelector,
    ) -> PromptNodeResult<String> {
        self.invoke(prompt, &image.data, &image.media_subtype, model)
            .await
    }

    /// Send `prompt` and the base64 image (`media_subtype` e.g. "png") to
    /// `model`, returning the text of the first content block.
    pub async fn invoke(
        &self,
        prompt: &str,
        image_base64: &str,
        media_subtype: &str,
        model: ModelSelector,
    ) -> PromptNodeResult<String> {
        let model_id = model.model_id();
        let request = self.build_request(prompt, image_base64, media_subtype);
        let body = serde_json::to_vec(&request).map_err(|error| {
            PromptNodeError::Invariant(
                self.transport.provider(),
                format!("Failed to serialize request: {error}"),
            )
        })?;

        let response = trace_invoke(
            self.transport.provider(),
            model_id,
            self.options.max_tokens,
            || async move {
                let bytes = self
                    .transport
                    .invoke_model(model_id, body)
                    .await
                    .inspect_err(|err| log_invoke_error(model, err))?;
                parse_response(self.transport.provider(), &bytes)
            },
        )
        .await?;

        let output_prompt = first_text(self.transport.provider(), response)?;
        info!("prompt: {output_prompt}");
        Ok(output_prompt)
    }

    #[must_use]
    pub fn build_request(
        &self,
        prompt: &str,
        image_base64: &str,
        media_subtype: &str,
    ) -> InvokeModelRequest {
        InvokeModelRequest {
            anthropic_version: self.options.anthropic_version.clone(),
            system: self.options.system_prompt.clone(),
            max_tokens: self.options.max_tokens,
            messages: vec![InputMessage {
                role: "user".to_string(),
                content: vec![
                    InputContentBlock::Text(RequestTextBlock {
                        text: prompt.to_string(),
                    }),
                    InputContentBlock::Image(RequestImageBlock {
                        source: ImageSource::Base64(Base64ImageSource {
                            media_type: format!("image/{media_subtype}"),
                            data: image_base64.to_string(),
                        }),
                    }),
                ],
            }],
        }
    }
}

fn log_invoke_error(model: ModelSelector, err: &PromptNodeError) {
    if let Some((code, message)) = err.provider_details() {
        error!("Couldn't invoke {model}. Here's why: {code}: {message}");
    } else {
        error!("Couldn't invoke {model}. Here's why: {err}");
    }
}

fn parse_response(provider: &'static str, bytes: &[u8]) -> PromptNodeResult<InvokeModelResponse> {
    serde_json::from_slice(bytes).map_err(|error| {
        PromptNodeError::Invariant(provider, format!("Failed to parse response body: {error}"))
    })
}

fn first_text(provider: &'static str, response: InvokeModelResponse) -> PromptNodeResult<String> {
    let block = response
        .content
        .into_iter()
        .next()
        .ok_or(PromptNodeError::EmptyResponse)?;
    block.text.ok_or_else(|| {
        PromptNodeError::Invariant(
            provider,
            format!(
                "First content block has no text (type {})",
                block.type_field.as_deref().unwrap_or("unknown")
            ),
        )
    })
}
