use crate::domain::{InvalidField, NewSubscriber, Subscriber, SubscriberUpdate};
use crate::sms_client::{MessageId, MessagingGateway};
use crate::subscriber_store::{StoreError, SubscriberStore};
use crate::utils::error_chain_fmt;

use super::WELCOME_MESSAGE;

pub struct RegistrationRequest {
    pub full_name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// First record for this phone.
    Registered,
    /// An unsubscribed record was brought back to pending.
    Resubscribed,
}

#[derive(Debug)]
pub struct RegistrationResult {
    pub outcome: RegistrationOutcome,
    pub subscriber: Subscriber,
    /// `None` when the welcome message could not be handed to the provider.
    pub welcome_message: Option<MessageId>,
}

impl RegistrationResult {
    pub fn message(&self) -> &'static str {
        "Successfully registered! Please check your phone for a confirmation message."
    }
}

#[derive(thiserror::Error)]
pub enum RegistrationError {
    #[error("{0}")]
    InvalidName(String),
    #[error("Please enter a valid phone number")]
    InvalidPhone(String),
    #[error("This phone number is already registered")]
    AlreadyRegistered,
    #[error("Failed to process registration")]
    StoreWriteError(#[source] StoreError),
}

impl std::fmt::Debug for RegistrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl From<InvalidField> for RegistrationError {
    fn from(e: InvalidField) -> Self {
        match e {
            InvalidField::Name(message) => Self::InvalidName(message),
            InvalidField::Phone(message) => Self::InvalidPhone(message),
        }
    }
}

impl From<StoreError> for RegistrationError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(_) => Self::AlreadyRegistered,
            other => Self::StoreWriteError(other),
        }
    }
}

/// Validates, deduplicates, writes at most one record and sends at most one
/// welcome message. A failed send never undoes the write.
#[tracing::instrument(
    name = "Registering subscriber",
    skip(store, gateway, request),
    fields(
        subscriber_name = %request.full_name,
        phone_number = %request.phone_number,
    )
)]
pub async fn register_subscriber(
    store: &dyn SubscriberStore,
    gateway: &dyn MessagingGateway,
    request: RegistrationRequest,
) -> Result<RegistrationResult, RegistrationError> {
    let new_subscriber = NewSubscriber::parse(&request.full_name, &request.phone_number)?;
    let phone = new_subscriber.phone_number;

    let (outcome, subscriber) = match store.find_by_phone(&phone).await? {
        Some(existing) if !existing.unsubscribed() => {
            return Err(RegistrationError::AlreadyRegistered);
        }
        Some(_) => {
            let update = SubscriberUpdate::resubscribe(new_subscriber.full_name);
            let subscriber = store.update(&phone, &update).await?;
            (RegistrationOutcome::Resubscribed, subscriber)
        }
        None => {
            let subscriber = Subscriber::register(phone, new_subscriber.full_name);
            store.insert(&subscriber).await?;
            (RegistrationOutcome::Registered, subscriber)
        }
    };
    tracing::info!(outcome = ?outcome, "Subscriber record saved");

    let welcome_message = match gateway.send(&subscriber.phone_number, WELCOME_MESSAGE).await {
        Ok(message_id) => Some(message_id),
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                "Failed to send the welcome message. The subscriber record is kept"
            );
            None
        }
    };

    Ok(RegistrationResult {
        outcome,
        subscriber,
        welcome_message,
    })
}
