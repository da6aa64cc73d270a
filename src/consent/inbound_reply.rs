use crate::domain::{Keyword, KeywordSet, PhoneNumber, SubscriberUpdate};
use crate::sms_client::{MessageId, MessagingGateway};
use crate::subscriber_store::{StoreError, SubscriberStore};
use crate::utils::error_chain_fmt;

use super::{CONFIRMATION_MESSAGE, GUIDANCE_MESSAGE};

/// An inbound text as the carrier reports it. Neither field is trusted to be
/// canonical.
pub struct InboundMessage {
    pub from: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundReplyResult {
    /// `YES`: subscriber is now confirmed. `confirmation` is `None` when the
    /// confirmation text could not be handed to the provider.
    Confirmed { confirmation: Option<MessageId> },
    /// `STOP`: the carrier sends its own opt-out acknowledgment.
    Unsubscribed,
    /// `START`
    Resubscribed,
    /// Known sender, no keyword. Nothing changed.
    Unrecognized,
    /// No record for the sender. Nothing changed.
    UnknownSender,
}

impl InboundReplyResult {
    /// Text for a markup-style carrier reply, if the carrier should send one.
    pub fn reply_text(&self) -> Option<&'static str> {
        match self {
            Self::Unrecognized => Some(GUIDANCE_MESSAGE),
            _ => None,
        }
    }

    /// Short human-readable acknowledgment for structured replies.
    pub fn acknowledgment(&self) -> &'static str {
        match self {
            Self::Confirmed { .. } => "Subscription confirmed",
            Self::Unsubscribed => "Unsubscribed successfully",
            Self::Resubscribed => "Resubscribed successfully",
            Self::Unrecognized => GUIDANCE_MESSAGE,
            Self::UnknownSender => "Message received",
        }
    }
}

#[derive(thiserror::Error)]
pub enum InboundReplyError {
    #[error("Failed to record the subscriber's reply")]
    StoreWriteError(#[from] StoreError),
}

impl std::fmt::Debug for InboundReplyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Drives one subscriber's consent state from an inbound keyword.
///
/// One lookup, at most one write. A keyword that leaves the state unchanged
/// skips the write.
#[tracing::instrument(
    name = "Handling inbound reply",
    skip(store, gateway, keywords, message),
    fields(from = %message.from, body = %message.body)
)]
pub async fn handle_inbound_reply(
    store: &dyn SubscriberStore,
    gateway: &dyn MessagingGateway,
    keywords: &KeywordSet,
    message: InboundMessage,
) -> Result<InboundReplyResult, InboundReplyError> {
    let phone = PhoneNumber::normalize(&message.from);
    let keyword = keywords.parse(&message.body);

    let subscriber = match store.find_by_phone(&phone).await? {
        Some(subscriber) => subscriber,
        None => {
            tracing::info!(phone_number = %phone, "Inbound message from an unknown number");
            return Ok(InboundReplyResult::UnknownSender);
        }
    };
    let Some(keyword) = keyword else {
        return Ok(InboundReplyResult::Unrecognized);
    };

    let next_state = subscriber.state.on_keyword(keyword);
    if next_state != subscriber.state {
        store
            .update(&phone, &SubscriberUpdate::state(next_state))
            .await?;
    }
    tracing::info!(
        from_state = ?subscriber.state,
        to_state = ?next_state,
        keyword = keyword.canonical(),
        "Consent state updated"
    );

    Ok(match keyword {
        Keyword::Confirm => {
            let confirmation = send_confirmation(gateway, &phone).await;
            InboundReplyResult::Confirmed { confirmation }
        }
        Keyword::OptOut => InboundReplyResult::Unsubscribed,
        Keyword::OptIn => InboundReplyResult::Resubscribed,
    })
}

async fn send_confirmation(
    gateway: &dyn MessagingGateway,
    phone: &PhoneNumber,
) -> Option<MessageId> {
    match gateway.send(phone, CONFIRMATION_MESSAGE).await {
        Ok(message_id) => Some(message_id),
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                "Failed to send the opt-in confirmation. The consent change is kept"
            );
            None
        }
    }
}
