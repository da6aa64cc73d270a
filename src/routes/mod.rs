mod health_check;
mod sms;
mod subscriptions;
mod webhooks;

pub use health_check::*;
pub use sms::*;
pub use subscriptions::*;
pub use webhooks::*;

use serde::Serialize;

/// Body shape shared by the JSON endpoints.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            message_id: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            message_id: None,
        }
    }
}
