use bedrock_prompt_node::{node::DEFAULT_PROMPT, BedrockClient, EncodedImage, ModelSelector};
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

// cargo run --example describe-image -- images/snow.jpeg "Claude3 haiku"
#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let image_path = args.next().unwrap_or_else(|| "images/snow.jpeg".to_string());
    let model: ModelSelector = args
        .next()
        .as_deref()
        .unwrap_or("Claude3 sonnet")
        .parse()
        .expect("unsupported model");

    let image = EncodedImage::from_path(&image_path).expect("failed to read image");

    let client = BedrockClient::from_env().expect("failed to configure Bedrock client");

    let prompt = client
        .invoke_encoded(DEFAULT_PROMPT, &image, model)
        .await
        .expect("client.invoke failed");

    println!("{prompt}");
}
