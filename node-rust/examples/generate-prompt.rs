use bedrock_prompt_node::{node::DEFAULT_PROMPT, ImageBatch, ImagePromptNode};
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

/// A 64x64 frame with a warm sun over a green hill.
fn landscape() -> ImageBatch {
    let size = 64;
    let mut data = Vec::with_capacity(size * size * 3);
    for y in 0..size {
        for x in 0..size {
            let (fx, fy) = (x as f32 / size as f32, y as f32 / size as f32);
            let in_sun = (fx - 0.75).powi(2) + (fy - 0.25).powi(2) < 0.01;
            let on_hill = fy > 0.6 + 0.1 * (fx * 6.0).sin();
            let pixel = if in_sun {
                [1.0, 0.85, 0.2]
            } else if on_hill {
                [0.2, 0.7, 0.3]
            } else {
                [0.5, 0.75, 1.0]
            };
            data.extend_from_slice(&pixel);
        }
    }
    ImageBatch::new(data, 1, size, size, 3).expect("valid shape")
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let node = ImagePromptNode::from_env().expect("failed to configure node");

    let output = node
        .invoke("Claude3 haiku", &landscape(), DEFAULT_PROMPT)
        .await
        .expect("node.invoke failed");

    println!("{}", output.prompt);
}
