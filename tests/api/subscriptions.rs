use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::json;
use serde_json::Value;
use wiremock::matchers::any;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::spawn_app;
use crate::helpers::TEST_ORIGIN;

fn assert_cors(headers: &HeaderMap) {
    assert_eq!(headers["access-control-allow-origin"], TEST_ORIGIN);
    assert_eq!(
        headers["access-control-allow-headers"],
        "Content-Type,Authorization"
    );
    assert_eq!(headers["access-control-allow-methods"], "OPTIONS,POST,GET");
}

/// Scenario A
#[tokio::test]
async fn subscribe_ok() {
    let app = spawn_app().await;
    app.mail_api_accepts("0102-abc").await;

    let resp = app
        .post_subscribe_json(json!({"email": "user@example.com"}))
        .await;

    assert_eq!(resp.status().as_u16(), 200);
    assert_cors(resp.headers());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "success": true,
            "message": "Subscription confirmed! Please check your email for confirmation.",
            "messageId": "0102-abc",
        })
    );
}

#[tokio::test]
async fn welcome_email_goes_to_normalized_address() {
    let app = spawn_app().await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"MessageId": "m"})))
        .expect(1)
        .mount(&app.email_server)
        .await;

    app.post_subscribe_json(json!({"email": "  Jane.Doe@Example.COM "}))
        .await;

    let reqs = app.email_server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&reqs[0].body).unwrap();
    assert_eq!(sent["To"], "jane.doe@example.com");
    assert_eq!(sent["From"], app.cfg.email_client.sender_email.as_str());
    assert_eq!(sent["ReplyTo"], app.cfg.email_client.reply_to_email.as_str());
    assert_eq!(sent["Tags"], json!([{"Name": "newsletter", "Value": "subscription"}]));
    // no name given: greeted by local part
    assert!(sent["TextBody"].as_str().unwrap().contains("Hi jane.doe,"));
    assert!(sent["HtmlBody"].as_str().unwrap().contains("Hi jane.doe,"));
}

#[tokio::test]
async fn welcome_email_uses_provided_name() {
    let app = spawn_app().await;
    app.mail_api_accepts("m").await;

    app.post_subscribe_json(json!({"email": "jd@example.com", "name": "Jane <3"}))
        .await;

    let reqs = app.email_server.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&reqs[0].body).unwrap();
    assert!(sent["TextBody"].as_str().unwrap().contains("Hi Jane <3,"));
    assert!(sent["HtmlBody"].as_str().unwrap().contains("Hi Jane &lt;3,"));
}

#[tokio::test]
async fn string_encoded_body_accepted() {
    let app = spawn_app().await;
    app.mail_api_accepts("m").await;

    let encoded = Value::String(json!({"email": "user@example.com"}).to_string());
    let resp = app.post_subscribe_json(encoded).await;

    assert_eq!(resp.status().as_u16(), 200);
}

/// Scenarios B and C, plus friends. None of these may reach the mail API.
#[tokio::test]
async fn subscribe_invalid() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    for (body, error, msg) in [
        (json!({}), "Email address is required", "no email"),
        (json!({"name": "john"}), "Email address is required", "name only"),
        (json!({"email": ""}), "Email address is required", "empty email"),
        (json!({"email": "   "}), "Email address is required", "blank email"),
        (json!({"email": 42}), "Email address is required", "numeric email"),
        (json!({"email": "not-an-email"}), "Invalid email address format", "no @"),
        (json!({"email": "john@foo"}), "Invalid email address format", "no tld"),
        (json!({"email": "jo hn@foo.com"}), "Invalid email address format", "space"),
        (json!({"email": "a@b@c.com"}), "Invalid email address format", "two @"),
    ] {
        let resp = app.post_subscribe_json(body).await;
        assert_eq!(resp.status().as_u16(), 400, "{msg}");
        assert_cors(resp.headers());
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({"success": false, "error": error}), "{msg}");
    }
}

#[tokio::test]
async fn empty_and_malformed_bodies() {
    let app = spawn_app().await;

    let resp = app.post_subscribe("").await;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Email address is required");

    for raw in ["email=user%40example.com", "[\"user@example.com\"]"] {
        let resp = app.post_subscribe(raw).await;
        assert_eq!(resp.status().as_u16(), 400, "{raw}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({"success": false, "error": "Invalid request body"}));
    }
}

/// Scenario D and the other known categories. The mail API's own message
/// must never leak into the response.
#[tokio::test]
async fn dispatch_failures_are_mapped() {
    for (code, error) in [
        (
            "MessageRejected",
            "Invalid email address. Please check and try again.",
        ),
        (
            "MailFromDomainNotVerifiedException",
            "Service temporarily unavailable. Please try again later.",
        ),
        (
            "ConfigurationSetDoesNotExistException",
            "Service configuration error. Please contact support.",
        ),
        (
            "InternalFailure",
            "Failed to process subscription. Please try again later.",
        ),
    ] {
        let app = spawn_app().await;
        Mock::given(path("/email"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"Code": code, "Message": "secret internal detail"})),
            )
            .expect(1)
            .mount(&app.email_server)
            .await;

        let resp = app
            .post_subscribe_json(json!({"email": "user@example.com"}))
            .await;

        assert_eq!(resp.status().as_u16(), 500, "{code}");
        assert_cors(resp.headers());
        let text = resp.text().await.unwrap();
        assert!(!text.contains("secret internal detail"));
        let body: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body, json!({"success": false, "error": error}), "{code}");
    }
}

#[tokio::test]
async fn mail_api_down() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.email_server)
        .await;

    let resp = app
        .post_subscribe_json(json!({"email": "user@example.com"}))
        .await;
    assert_eq!(resp.status().as_u16(), 500);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Failed to process subscription. Please try again later."
    );
}

#[tokio::test]
async fn preflight() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    let resp = reqwest::Client::new()
        .request(Method::OPTIONS, app.subscribe_url())
        .header("Origin", TEST_ORIGIN)
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    assert_cors(resp.headers());
    assert_eq!(resp.text().await.unwrap(), "");
}
