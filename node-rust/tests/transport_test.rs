mod common;

use bedrock_prompt_node::{BedrockClient, BedrockConfig, Credentials, ModelSelector, PromptNodeError};
use common::StubServer;

fn client_for(server: &StubServer) -> BedrockClient {
    let config = BedrockConfig::new(Credentials::new("AKIDEXAMPLE", "secret"))
        .with_endpoint_url(&server.url);
    BedrockClient::from_config(&config)
}

#[tokio::test]
async fn throttled_request_is_sent_once_and_surfaces_provider_error() {
    let server = StubServer::start(
        "429 Too Many Requests",
        &[("x-amzn-errortype", "ThrottlingException")],
        r#"{"message":"Too many requests"}"#,
    )
    .await;

    let err = client_for(&server)
        .invoke("hi", "AAAA", "png", ModelSelector::Claude3Haiku)
        .await
        .expect_err("invoke should fail");

    match err {
        PromptNodeError::Provider { code, message } => {
            assert_eq!(code, "ThrottlingException");
            assert_eq!(message, "Too many requests");
        }
        other => panic!("unexpected error variant: {other:?}"),
    }
    assert_eq!(server.requests(), 1);
}

#[tokio::test]
async fn server_error_is_not_retried() {
    let server = StubServer::start(
        "500 Internal Server Error",
        &[("x-amzn-errortype", "InternalServerException")],
        r#"{"message":"boom"}"#,
    )
    .await;

    let err = client_for(&server)
        .invoke("hi", "AAAA", "png", ModelSelector::Claude3Sonnet)
        .await
        .expect_err("invoke should fail");

    assert_eq!(err.provider_details(), Some(("InternalServerException", "boom")));
    assert_eq!(server.requests(), 1);
}

#[tokio::test]
async fn successful_response_body_reaches_the_client() {
    let server = StubServer::start(
        "200 OK",
        &[],
        r#"{"content":[{"type":"text","text":"(masterpiece:1.2),snow"}],"usage":{"input_tokens":10,"output_tokens":5}}"#,
    )
    .await;

    let prompt = client_for(&server)
        .invoke("hi", "AAAA", "png", ModelSelector::Claude3Haiku)
        .await
        .expect("invoke should succeed");

    assert_eq!(prompt, "(masterpiece:1.2),snow");
    assert_eq!(server.requests(), 1);
}
