use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Deserialize;
use serde_json::json;

use crate::consent::{handle_inbound_reply, InboundMessage, InboundReplyResult};
use crate::AppState;

const GENERIC_ERROR_REPLY: &str =
    "Sorry, there was an error processing your response. Please try again later.";

/// Carrier webhook payload. Providers post many more fields; only these two
/// matter here.
#[derive(Deserialize)]
pub struct InboundForm {
    #[serde(rename = "From")]
    pub from: Option<String>,
    #[serde(rename = "Body")]
    pub body: Option<String>,
}

enum Acknowledgment {
    MissingSender,
    Handled(InboundReplyResult),
    /// The store failed. Logged; the carrier still gets a 200 so it does not retry.
    Failed,
}

async fn acknowledge(state: &AppState, form: InboundForm) -> Acknowledgment {
    let from = match form.from.filter(|from| !from.trim().is_empty()) {
        Some(from) => from,
        None => return Acknowledgment::MissingSender,
    };
    let message = InboundMessage {
        from,
        body: form.body.unwrap_or_default(),
    };
    match handle_inbound_reply(
        state.subscriber_store.as_ref(),
        state.sms_client.as_ref(),
        &state.keywords,
        message,
    )
    .await
    {
        Ok(result) => Acknowledgment::Handled(result),
        Err(e) => {
            tracing::error!(error.cause_chain = ?e, "Failed to process an inbound reply");
            Acknowledgment::Failed
        }
    }
}

/// Structured acknowledgment, for providers that expect JSON.
#[tracing::instrument(name = "Inbound webhook (json)", skip(state, form))]
pub async fn inbound_json_webhook(
    state: State<AppState>,
    form: Form<InboundForm>,
) -> Response {
    match acknowledge(&state, form.0).await {
        Acknowledgment::MissingSender => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Missing required fields" })),
        )
            .into_response(),
        Acknowledgment::Handled(result) => {
            (StatusCode::OK, Json(json!({ "message": result.acknowledgment() }))).into_response()
        }
        Acknowledgment::Failed => {
            (StatusCode::OK, Json(json!({ "message": GENERIC_ERROR_REPLY }))).into_response()
        }
    }
}

/// Markup acknowledgment, for providers that send the reply text themselves.
#[tracing::instrument(name = "Inbound webhook (twiml)", skip(state, form))]
pub async fn inbound_twiml_webhook(
    state: State<AppState>,
    form: Form<InboundForm>,
) -> Response {
    let (status, reply) = match acknowledge(&state, form.0).await {
        Acknowledgment::MissingSender => (StatusCode::BAD_REQUEST, None),
        Acknowledgment::Handled(result) => (StatusCode::OK, result.reply_text()),
        Acknowledgment::Failed => (StatusCode::OK, Some(GENERIC_ERROR_REPLY)),
    };
    match twiml(reply) {
        Ok(body) => (status, [(header::CONTENT_TYPE, "application/xml")], body).into_response(),
        Err(e) => {
            tracing::error!(error.cause_chain = ?e, "Failed to render the TwiML reply");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// `<Response>` document with an optional `<Message>`. Text is escaped by the writer.
fn twiml(reply: Option<&str>) -> anyhow::Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("Response")))?;
    if let Some(text) = reply {
        writer.write_event(Event::Start(BytesStart::new("Message")))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(BytesEnd::new("Message")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("Response")))?;
    Ok(String::from_utf8(writer.into_inner())?)
}
