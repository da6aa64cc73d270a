use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::ApiResponse;
use crate::domain::PhoneNumber;
use crate::sms_client::DeliveryError;
use crate::utils::error_chain_fmt;
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmsData {
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub message: String,
}

#[derive(thiserror::Error)]
pub enum SendSmsError {
    #[error("Phone number and message are required")]
    MissingFields,
    #[error("Please enter a valid phone number")]
    InvalidPhone(String),
    #[error("Failed to send message")]
    Delivery(#[from] DeliveryError),
}

impl std::fmt::Debug for SendSmsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl IntoResponse for SendSmsError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingFields | Self::InvalidPhone(_) => StatusCode::BAD_REQUEST,
            Self::Delivery(e) => {
                tracing::error!(error.cause_chain = ?e, "SMS sending error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}

/// Operator endpoint: send one message to one number.
#[tracing::instrument(
    name = "Sending ad-hoc message",
    skip(state, data),
    fields(phone_number = %data.phone_number)
)]
pub async fn send_sms(
    state: State<AppState>,
    data: Json<SendSmsData>,
) -> Result<Response, SendSmsError> {
    if data.phone_number.trim().is_empty() || data.message.trim().is_empty() {
        return Err(SendSmsError::MissingFields);
    }
    let phone = PhoneNumber::parse(&data.phone_number).map_err(SendSmsError::InvalidPhone)?;
    let message_id = state.sms_client.send(&phone, &data.message).await?;

    let body = ApiResponse {
        message_id: Some(message_id.0),
        ..ApiResponse::success("Message sent successfully")
    };
    Ok((StatusCode::OK, Json(body)).into_response())
}

pub async fn sms_health(State(state): State<AppState>) -> Response {
    match state.sms_client.health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "healthy" }))).into_response(),
        Err(e) => {
            tracing::warn!(error.cause_chain = ?e, "Messaging provider health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "unhealthy",
                    "error": "Could not connect to the messaging provider"
                })),
            )
                .into_response()
        }
    }
}
