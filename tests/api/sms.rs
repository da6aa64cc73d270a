use serde_json::{json, Value};
use wiremock::matchers::method;
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{field, provider_accepts, provider_fails, spawn_app};

#[tokio::test]
async fn send_sms_returns_the_provider_message_id() {
    let app = spawn_app().await;
    provider_accepts().expect(1).mount(&app.sms_server).await;

    let response = app
        .post_send_sms(&json!({
            "phoneNumber": "415.555.0100",
            "message": "Drink some water today."
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["messageId"], "SM0123456789abcdef0123456789abcdef");
    let sent = app.sent_messages().await;
    assert_eq!(field(&sent[0], "To"), Some("+14155550100"));
    assert_eq!(field(&sent[0], "Body"), Some("Drink some water today."));
}

#[tokio::test]
async fn send_sms_returns_a_400_for_missing_or_invalid_fields() {
    let app = spawn_app().await;
    provider_accepts().expect(0).mount(&app.sms_server).await;
    let test_cases = vec![
        json!({ "phoneNumber": "+14155550100" }),
        json!({ "message": "hello" }),
        json!({ "phoneNumber": "123", "message": "hello" }),
    ];

    for invalid_body in test_cases {
        let response = app.post_send_sms(&invalid_body).await;
        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            invalid_body
        );
    }
}

#[tokio::test]
async fn send_sms_returns_a_500_when_the_provider_fails() {
    let app = spawn_app().await;
    provider_fails().expect(1).mount(&app.sms_server).await;

    let response = app
        .post_send_sms(&json!({
            "phoneNumber": "+14155550100",
            "message": "hello"
        }))
        .await;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Failed to send message");
}

#[tokio::test]
async fn sms_health_reports_a_reachable_provider() {
    let app = spawn_app().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "messages": [] })))
        .expect(1)
        .mount(&app.sms_server)
        .await;

    let response = app.get_sms_health().await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn sms_health_reports_rejected_credentials() {
    let app = spawn_app().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&app.sms_server)
        .await;

    let response = app.get_sms_health().await;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "unhealthy");
}
