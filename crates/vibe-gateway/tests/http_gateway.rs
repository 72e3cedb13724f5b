//! HttpModelGateway against a local mock server.

use serde_json::json;
use vibe_gateway::{GatewayConfig, HttpModelGateway, ModelCallError, ModelGateway, Provider, RetryPolicy};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay_ms: 1,
        max_delay_ms: 5,
        timeout_ms: 2_000,
    }
}

fn config(provider: Provider, server: &MockServer, route: &str) -> GatewayConfig {
    GatewayConfig::new(provider, "test-key")
        .with_api_url(format!("{}{}", server.uri(), route))
        .with_retry(fast_retry())
}

#[tokio::test]
async fn openai_request_carries_bearer_and_both_prompts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "messages": [
                {"role": "system", "content": "be terse"},
                {"role": "user", "content": "a timer"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "set state = RUNNING"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway =
        HttpModelGateway::new(config(Provider::OpenAi, &server, "/v1/chat/completions")).unwrap();
    let text = gateway.complete("be terse", "a timer").await.unwrap();
    assert_eq!(text, "set state = RUNNING");
}

#[tokio::test]
async fn anthropic_request_uses_api_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({"system": "sys"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [{"type": "text", "text": "set friction = 0.2"}]
        })))
        .mount(&server)
        .await;

    let gateway =
        HttpModelGateway::new(config(Provider::Anthropic, &server, "/v1/messages")).unwrap();
    assert_eq!(
        gateway.complete("sys", "usr").await.unwrap(),
        "set friction = 0.2"
    );
}

#[tokio::test]
async fn rate_limit_then_success_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .mount(&server)
        .await;

    let gateway = HttpModelGateway::new(config(Provider::OpenAi, &server, "/")).unwrap();
    assert_eq!(gateway.complete("s", "u").await.unwrap(), "ok");
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn persistent_rate_limit_surfaces_as_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let gateway = HttpModelGateway::new(config(Provider::OpenAi, &server, "/")).unwrap();
    let err = gateway.complete("s", "u").await.unwrap_err();
    assert_eq!(err, ModelCallError::RateLimited { attempts: 3 });
}

#[tokio::test]
async fn server_error_fails_immediately_with_truncated_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("x".repeat(500)))
        .mount(&server)
        .await;

    let gateway = HttpModelGateway::new(config(Provider::OpenAi, &server, "/")).unwrap();
    let err = gateway.complete("s", "u").await.unwrap_err();
    match err {
        ModelCallError::Http { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body.len(), 200);
        }
        other => panic!("expected Http error, got {other:?}"),
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn slow_response_is_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_millis(500))
                .set_body_json(json!({"choices": []})),
        )
        .mount(&server)
        .await;

    let mut cfg = config(Provider::OpenAi, &server, "/");
    cfg.retry.timeout_ms = 50;
    let gateway = HttpModelGateway::new(cfg).unwrap();
    let err = gateway.complete("s", "u").await.unwrap_err();
    assert_eq!(err, ModelCallError::Timeout { limit_ms: 50 });
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let gateway = HttpModelGateway::new(config(Provider::OpenAi, &server, "/")).unwrap();
    let err = gateway.complete("s", "u").await.unwrap_err();
    assert!(matches!(err, ModelCallError::MalformedResponse(_)));
}

#[test]
fn empty_api_key_is_rejected_at_construction() {
    let err = HttpModelGateway::new(GatewayConfig::new(Provider::OpenAi, "  ")).err();
    assert!(matches!(err, Some(ModelCallError::Misconfigured(_))));
}
