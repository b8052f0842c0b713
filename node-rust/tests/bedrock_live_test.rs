use bedrock_prompt_node::{
    node::DEFAULT_PROMPT, BedrockClient, BedrockConfig, ImageBatch, ImagePromptNode,
};
use std::sync::OnceLock;
use tokio::test;

fn bedrock_config() -> &'static BedrockConfig {
    static CONFIG: OnceLock<BedrockConfig> = OnceLock::new();

    CONFIG.get_or_init(|| {
        BedrockConfig::from_env()
            .expect("AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set")
    })
}

fn sky_batch() -> ImageBatch {
    let (height, width) = (32, 32);
    let mut data = Vec::with_capacity(height * width * 3);
    for y in 0..height {
        for _ in 0..width {
            let t = y as f32 / height as f32;
            data.extend_from_slice(&[0.3 * t, 0.5 + 0.3 * t, 1.0]);
        }
    }
    ImageBatch::new(data, 1, height, width, 3).unwrap()
}

#[test]
#[ignore = "requires AWS credentials with Bedrock access"]
async fn generates_prompt_with_haiku() {
    let node = ImagePromptNode::new(BedrockClient::from_config(bedrock_config()));

    let output = node
        .invoke("Claude3 haiku", &sky_batch(), DEFAULT_PROMPT)
        .await
        .expect("invoke should succeed");

    assert!(!output.prompt.trim().is_empty());
}
