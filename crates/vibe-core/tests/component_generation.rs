//! Component generation against a scripted model.

use serde_json::json;
use vibe_core::component::{
    generate_component, GenerateError, GenerationRequest, MAX_GENERATION_ATTEMPTS,
};
use vibe_gateway::fakes::ScriptedGateway;
use vibe_gateway::ModelCallError;

const TRUNCATED: &str = "export default function Timer() {\n  return <div>0:00</div>;\n";
const COMPLETE: &str = "export default function Timer() {\n  return <div>0:00</div>;\n}";

fn structured(code: &str) -> String {
    json!({
        "appName": "Timer",
        "description": "A countdown timer",
        "imports": ["Card"],
        "componentCode": code,
    })
    .to_string()
}

#[tokio::test]
async fn retries_with_compiler_error_then_succeeds() {
    let gateway = ScriptedGateway::queue(vec![
        Ok(structured(TRUNCATED)),
        Ok(structured(COMPLETE)),
    ]);

    let generated = generate_component(&gateway, &GenerationRequest::generate("a timer"))
        .await
        .unwrap();

    assert_eq!(generated.attempts, 2);
    assert_eq!(generated.component_name, "Timer");
    assert_eq!(generated.app_name.as_deref(), Some("Timer"));
    assert_eq!(generated.imports, vec!["Card"]);
    assert_eq!(generated.component_code, COMPLETE);

    let calls = gateway.calls();
    assert_eq!(calls.len(), 2);
    assert!(!calls[0].user_prompt.contains("Attempt"));
    assert!(calls[1].user_prompt.contains("Attempt 2"));
    assert!(calls[1].user_prompt.contains("syntax error"));
}

#[tokio::test]
async fn gives_up_after_three_invalid_replies() {
    let gateway = ScriptedGateway::always(structured(TRUNCATED));

    let err = generate_component(&gateway, &GenerationRequest::generate("a timer"))
        .await
        .unwrap_err();

    assert_eq!(gateway.call_count(), MAX_GENERATION_ATTEMPTS as usize);
    match err {
        GenerateError::Exhausted {
            attempts,
            last_error,
            code,
        } => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("syntax error"));
            assert_eq!(code.as_deref(), Some(TRUNCATED));
        }
        other => panic!("expected exhaustion, got {other:?}"),
    }
}

#[tokio::test]
async fn fenced_reply_without_json_is_accepted() {
    let gateway = ScriptedGateway::always(format!("Here you go:\n```tsx\n{COMPLETE}\n```"));

    let generated = generate_component(&gateway, &GenerationRequest::generate("a timer"))
        .await
        .unwrap();
    assert_eq!(generated.attempts, 1);
    assert_eq!(generated.component_code, COMPLETE);
    assert!(generated.app_name.is_none());
}

#[tokio::test]
async fn modify_mode_sends_current_code_and_returns_changes() {
    let gateway = ScriptedGateway::always(
        json!({"updatedCode": COMPLETE, "changes": ["closed the function"]}).to_string(),
    );
    let request = GenerationRequest::modify(TRUNCATED, "fix the missing brace");

    let generated = generate_component(&gateway, &request).await.unwrap();
    assert_eq!(generated.changes, vec!["closed the function"]);
    assert_eq!(generated.component_code, COMPLETE);

    let call = &gateway.calls()[0];
    assert!(call.system_prompt.contains("updatedCode"));
    assert!(call.user_prompt.contains(TRUNCATED.trim()));
}

#[tokio::test]
async fn rate_limit_stops_immediately() {
    let gateway = ScriptedGateway::failing(ModelCallError::RateLimited { attempts: 3 });

    let err = generate_component(&gateway, &GenerationRequest::generate("a timer"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        GenerateError::Gateway(ModelCallError::RateLimited { attempts: 3 })
    );
    assert_eq!(gateway.call_count(), 1);
}

#[tokio::test]
async fn transient_gateway_error_is_retried() {
    let gateway = ScriptedGateway::queue(vec![
        Err(ModelCallError::Http {
            status: 502,
            body: "bad gateway".into(),
        }),
        Ok(structured(COMPLETE)),
    ]);

    let generated = generate_component(&gateway, &GenerationRequest::generate("a timer"))
        .await
        .unwrap();
    assert_eq!(generated.attempts, 2);
    assert!(gateway.calls()[1].user_prompt.contains("AI API error: 502"));
}

#[tokio::test]
async fn blank_request_never_calls_the_model() {
    let gateway = ScriptedGateway::always("unused");
    let err = generate_component(&gateway, &GenerationRequest::generate("   "))
        .await
        .unwrap_err();
    assert_eq!(err, GenerateError::EmptyRequest);
    assert_eq!(gateway.call_count(), 0);
}
