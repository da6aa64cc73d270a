use serde_json::{json, Value};
use smsoptin::domain::ConsentState;

use crate::helpers::{field, provider_accepts, provider_fails, spawn_app};

const PHONE: &str = "+14155550100";

#[tokio::test]
async fn subscribe_returns_a_200_for_valid_data() {
    let app = spawn_app().await;
    provider_accepts().expect(1).mount(&app.sms_server).await;

    let response = app
        .post_subscriptions(&json!({
            "fullName": "Ursula Le Guin",
            "phoneNumber": "(415) 555-0100"
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(
        body["message"],
        "Successfully registered! Please check your phone for a confirmation message."
    );
}

#[tokio::test]
async fn subscribe_persists_a_pending_subscriber_under_the_canonical_phone() {
    let app = spawn_app().await;
    provider_accepts().mount(&app.sms_server).await;

    app.register("  Ursula Le Guin ", "415-555-0100").await;

    let saved = app.find_subscriber(PHONE).await.expect("Subscriber was not saved.");
    assert_eq!(saved.phone_number.as_ref(), PHONE);
    assert_eq!(saved.full_name.as_ref(), "Ursula Le Guin");
    assert!(!saved.opt_in_completed());
    assert!(!saved.unsubscribed());
}

#[tokio::test]
async fn subscribe_sends_one_welcome_message() {
    let app = spawn_app().await;
    provider_accepts().expect(1).mount(&app.sms_server).await;

    app.register("Ursula Le Guin", "14155550100").await;

    let sent = app.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(field(&sent[0], "To"), Some(PHONE));
    assert_eq!(field(&sent[0], "From"), Some("+15005550006"));
    assert!(field(&sent[0], "Body").unwrap().contains("Reply YES"));
}

#[tokio::test]
async fn subscribe_returns_a_400_when_fields_are_invalid() {
    let app = spawn_app().await;
    provider_accepts().expect(0).mount(&app.sms_server).await;
    let test_cases = vec![
        (
            json!({ "fullName": "A", "phoneNumber": PHONE }),
            "Name must be at least 2 characters long",
        ),
        (
            json!({ "fullName": "John123", "phoneNumber": PHONE }),
            "Name contains invalid characters",
        ),
        (
            json!({ "fullName": "Ursula Le Guin", "phoneNumber": "123" }),
            "Please enter a valid phone number",
        ),
        (
            json!({ "fullName": "A", "phoneNumber": "123" }),
            "Name must be at least 2 characters long",
        ),
        (
            json!({ "phoneNumber": PHONE }),
            "Name must be at least 2 characters long",
        ),
        (
            json!({ "fullName": "Ursula Le Guin" }),
            "Please enter a valid phone number",
        ),
    ];

    for (invalid_body, expected_message) in test_cases {
        let response = app.post_subscriptions(&invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            invalid_body
        );
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], expected_message);
    }
    assert!(app.find_subscriber(PHONE).await.is_none());
}

#[tokio::test]
async fn subscribing_an_active_number_twice_is_rejected() {
    let app = spawn_app().await;
    provider_accepts().expect(1).mount(&app.sms_server).await;
    app.register("Ursula Le Guin", PHONE).await;

    let response = app
        .post_subscriptions(&json!({
            "fullName": "Someone Else",
            "phoneNumber": "(415) 555-0100"
        }))
        .await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "This phone number is already registered");
    let saved = app.find_subscriber(PHONE).await.unwrap();
    assert_eq!(saved.full_name.as_ref(), "Ursula Le Guin");
}

#[tokio::test]
async fn an_unsubscribed_number_can_register_again() {
    let app = spawn_app().await;
    provider_accepts().expect(2).mount(&app.sms_server).await;
    app.register("Ursula Le Guin", PHONE).await;
    app.post_inbound_json(PHONE, "STOP").await;

    app.register("Ursula K Le Guin", PHONE).await;

    let saved = app.find_subscriber(PHONE).await.unwrap();
    assert_eq!(saved.state, ConsentState::Pending);
    assert_eq!(saved.full_name.as_ref(), "Ursula K Le Guin");
}

#[tokio::test]
async fn subscribe_succeeds_even_if_the_welcome_message_fails() {
    let app = spawn_app().await;
    provider_fails().expect(1).mount(&app.sms_server).await;

    let response = app
        .post_subscriptions(&json!({
            "fullName": "Ursula Le Guin",
            "phoneNumber": PHONE
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    assert!(app.find_subscriber(PHONE).await.is_some());
}
