use serde_json::Value;
use smsoptin::domain::ConsentState;

use crate::helpers::{field, provider_accepts, spawn_app, TestApp};

const PHONE: &str = "+14155550100";

async fn registered_app() -> TestApp {
    let app = spawn_app().await;
    provider_accepts().mount(&app.sms_server).await;
    app.register("Ursula Le Guin", PHONE).await;
    app
}

async fn state_of(app: &TestApp) -> ConsentState {
    app.find_subscriber(PHONE).await.expect("Subscriber is missing.").state
}

#[tokio::test]
async fn yes_confirms_a_pending_subscriber() {
    let app = registered_app().await;

    let response = app.post_inbound_json(PHONE, "YES").await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Subscription confirmed");
    assert_eq!(state_of(&app).await, ConsentState::Confirmed);
}

#[tokio::test]
async fn lowercase_yes_from_a_differently_formatted_number_confirms() {
    let app = registered_app().await;

    let response = app.post_inbound_json("(415) 555-0100", " yes ").await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(state_of(&app).await, ConsentState::Confirmed);
}

#[tokio::test]
async fn yes_sends_a_confirmation_text() {
    let app = registered_app().await;

    app.post_inbound_json(PHONE, "YES").await;

    let sent = app.sent_messages().await;
    assert_eq!(sent.len(), 2);
    assert!(field(&sent[1], "Body").unwrap().starts_with("Thank you for confirming!"));
}

#[tokio::test]
async fn stop_unsubscribes_and_leaves_the_reply_to_the_carrier() {
    let app = registered_app().await;
    app.post_inbound_json(PHONE, "YES").await;

    let response = app.post_inbound_twiml(PHONE, "STOP").await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/xml"
    );
    let body = response.text().await.unwrap();
    assert!(body.ends_with("<Response></Response>"));
    let saved = app.find_subscriber(PHONE).await.unwrap();
    assert!(saved.unsubscribed());
    assert!(!saved.opt_in_completed());
    assert_eq!(app.sent_messages().await.len(), 2);
}

#[tokio::test]
async fn start_resubscribes_an_unsubscribed_number() {
    let app = registered_app().await;
    app.post_inbound_json(PHONE, "STOP").await;

    let response = app.post_inbound_json(PHONE, "Start").await;

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Resubscribed successfully");
    assert_eq!(state_of(&app).await, ConsentState::Confirmed);
}

#[tokio::test]
async fn unrecognized_text_gets_guidance_and_changes_nothing() {
    let app = registered_app().await;

    let response = app.post_inbound_twiml(PHONE, "what is this?").await;

    assert_eq!(200, response.status().as_u16());
    let body = response.text().await.unwrap();
    assert!(body.contains("<Message>To confirm subscription, please reply YES."));
    assert_eq!(state_of(&app).await, ConsentState::Pending);
}

#[tokio::test]
async fn a_message_from_an_unknown_number_is_acknowledged() {
    let app = spawn_app().await;

    let response = app.post_inbound_json("+14155550199", "YES").await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Message received");
    assert!(app.find_subscriber("+14155550199").await.is_none());
}

#[tokio::test]
async fn a_webhook_without_a_sender_is_rejected() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(format!("{}/webhooks/inbound", &app.address))
        .form(&[("Body", "YES")])
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
}
