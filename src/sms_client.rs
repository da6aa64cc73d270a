use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, ClientBuilder, StatusCode, Url};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::configuration::SmsSettings;
use crate::domain::PhoneNumber;
use crate::utils::error_chain_fmt;

/// Provider identifier of an accepted outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageId(pub String);

impl AsRef<str> for MessageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(thiserror::Error)]
pub enum DeliveryError {
    #[error("Failed to reach the messaging provider.")]
    Transport(#[from] reqwest::Error),
    #[error("The messaging provider rejected our credentials ({0}).")]
    Unauthorized(StatusCode),
    #[error("The messaging provider answered {status}: {body}")]
    Provider { status: StatusCode, body: String },
    #[error("The messaging provider sent a response we could not read.")]
    MalformedResponse(#[source] reqwest::Error),
}

impl std::fmt::Debug for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Outbound text messaging. Built once at startup and shared by every
/// handler, so tests can swap in a fake.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send(&self, to: &PhoneNumber, body: &str) -> Result<MessageId, DeliveryError>;

    /// Cheap authenticated round trip to the provider.
    async fn health_check(&self) -> Result<(), DeliveryError>;
}

pub struct TwilioClient {
    http_client: Client,
    messages_url: Url,
    account_sid: String,
    auth_token: Secret<String>,
    sender: PhoneNumber,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    #[serde(rename = "To")]
    to: &'a str,
    #[serde(rename = "From")]
    from: &'a str,
    #[serde(rename = "Body")]
    body: &'a str,
}

#[derive(Deserialize)]
struct SendMessageResponse {
    sid: String,
}

impl TwilioClient {
    pub fn new(config: SmsSettings) -> anyhow::Result<Self> {
        let messages_url = Url::parse(&config.base_url)
            .and_then(|base_url| {
                base_url.join(&format!(
                    "/2010-04-01/Accounts/{}/Messages.json",
                    config.account_sid
                ))
            })
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            "application/json"
                .parse()
                .map_err(|e| anyhow::anyhow!("Failed to parse accept header: {e}"))?,
        );

        let http_client = ClientBuilder::new()
            .default_headers(headers)
            .timeout(Duration::from_millis(config.timeout_millis))
            .build()
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;

        Ok(Self {
            http_client,
            messages_url,
            account_sid: config.account_sid,
            auth_token: config.auth_token,
            sender: config.sender_number,
        })
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, DeliveryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DeliveryError::Unauthorized(status));
        }
        let body = response
            .text()
            .await
            .map_err(DeliveryError::MalformedResponse)?;
        Err(DeliveryError::Provider { status, body })
    }
}

#[async_trait]
impl MessagingGateway for TwilioClient {
    #[tracing::instrument(name = "Send text message", skip(self, body))]
    async fn send(&self, to: &PhoneNumber, body: &str) -> Result<MessageId, DeliveryError> {
        let request = SendMessageRequest {
            to: to.as_ref(),
            from: self.sender.as_ref(),
            body,
        };

        let response = self
            .http_client
            .post(self.messages_url.clone())
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .form(&request)
            .send()
            .await?;
        let message = Self::check_status(response)
            .await?
            .json::<SendMessageResponse>()
            .await
            .map_err(DeliveryError::MalformedResponse)?;
        Ok(MessageId(message.sid))
    }

    #[tracing::instrument(name = "Check messaging provider health", skip(self))]
    async fn health_check(&self) -> Result<(), DeliveryError> {
        let response = self
            .http_client
            .get(self.messages_url.clone())
            .query(&[("PageSize", "1")])
            .basic_auth(&self.account_sid, Some(self.auth_token.expose_secret()))
            .send()
            .await?;
        Self::check_status(response).await?;
        Ok(())
    }
}
