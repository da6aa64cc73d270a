use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use super::ApiResponse;
use crate::consent::{register_subscriber, RegistrationError, RegistrationRequest};
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationData {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone_number: String,
}

impl From<RegistrationData> for RegistrationRequest {
    fn from(data: RegistrationData) -> Self {
        Self {
            full_name: data.full_name,
            phone_number: data.phone_number,
        }
    }
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidName(_) | Self::InvalidPhone(_) | Self::AlreadyRegistered => {
                StatusCode::BAD_REQUEST
            }
            Self::StoreWriteError(e) => {
                tracing::error!(error.cause_chain = ?e, "Failed to process registration");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}

#[tracing::instrument(
    name = "Adding new subscriber",
    skip(state, data),
    fields(
        subscriber_name = %data.full_name,
        phone_number = %data.phone_number,
    )
)]
pub async fn subscribe(
    state: State<AppState>,
    data: Json<RegistrationData>,
) -> Result<Response, RegistrationError> {
    let result = register_subscriber(
        state.subscriber_store.as_ref(),
        state.sms_client.as_ref(),
        data.0.into(),
    )
    .await?;
    Ok((StatusCode::OK, Json(ApiResponse::success(result.message()))).into_response())
}
