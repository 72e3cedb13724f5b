use vibe_gateway::fakes::ScriptedGateway;
use vibe_gateway::{ModelCallError, ModelGateway};

#[tokio::test]
async fn queue_replies_in_order_then_fails() {
    let gateway = ScriptedGateway::queue(vec![
        Ok("one".to_string()),
        Err(ModelCallError::Timeout { limit_ms: 10 }),
    ]);

    assert_eq!(gateway.complete("s", "u1").await.unwrap(), "one");
    assert_eq!(
        gateway.complete("s", "u2").await.unwrap_err(),
        ModelCallError::Timeout { limit_ms: 10 }
    );
    assert!(matches!(
        gateway.complete("s", "u3").await.unwrap_err(),
        ModelCallError::Transport(_)
    ));

    let calls = gateway.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1].user_prompt, "u2");
}

#[tokio::test]
async fn responder_sees_both_prompts() {
    let gateway = ScriptedGateway::responder(|system, user| Ok(format!("{system}|{user}")));
    assert_eq!(gateway.complete("a", "b").await.unwrap(), "a|b");
    assert_eq!(gateway.call_count(), 1);
}
