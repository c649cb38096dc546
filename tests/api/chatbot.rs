use reqwest::Method;
use serde_json::json;
use serde_json::Value;

use crate::helpers::spawn_app;
use crate::helpers::TEST_ORIGIN;

#[tokio::test]
async fn crisis_outranks_other_topics() {
    let app = spawn_app().await;

    let resp = app
        .post_chatbot(json!({"message": "My anxiety is so bad I want to die"}))
        .await;

    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers()["access-control-allow-origin"], TEST_ORIGIN);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["intent"], "crisis");
    assert!(body["reply"].as_str().unwrap().contains("988"));
}

#[tokio::test]
async fn topics_get_canned_replies() {
    let app = spawn_app().await;

    for (message, intent) in [
        ("hello", "greeting"),
        ("I'm having a panic attack", "anxiety_help"),
        ("box breathing please", "breathing"),
        ("so stressed at work", "stress"),
        ("I have insomnia", "sleep"),
        ("what's the weather", "fallback"),
    ] {
        let resp = app.post_chatbot(json!({ "message": message })).await;
        assert_eq!(resp.status().as_u16(), 200, "{message}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["intent"], intent, "{message}");
    }
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let app = spawn_app().await;

    let resp = app.post_chatbot(json!({"message": " "})).await;

    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(resp.headers()["access-control-allow-origin"], TEST_ORIGIN);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"error": "Message is required"}));
}

#[tokio::test]
async fn chatbot_preflight() {
    let app = spawn_app().await;

    let resp = reqwest::Client::new()
        .request(Method::OPTIONS, format!("{}/chatbot", app.addr))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers()["access-control-allow-methods"], "OPTIONS,POST,GET");
}
