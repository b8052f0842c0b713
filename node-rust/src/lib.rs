pub mod api;
pub mod bedrock_test;
mod client;
mod config;
pub mod encoder;
mod errors;
mod model;
pub mod node;
mod opentelemetry;
mod transport;

pub use client::{BedrockClient, BedrockClientOptions, DEFAULT_MAX_TOKENS, SYSTEM_PROMPT};
pub use config::{BedrockConfig, Credentials, DEFAULT_REGION};
pub use encoder::{encode_batch, EncodedImage, ImageBatch};
pub use errors::*;
pub use model::ModelSelector;
pub use node::{ImagePromptNode, NodeOutput};
pub use transport::{AwsBedrockTransport, BedrockTransport};
