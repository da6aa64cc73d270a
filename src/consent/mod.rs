//! Consent rules: who gets written, when, and what gets texted back.
//!
//! Both entry points are transport-agnostic. They return their own result
//! types and leave the wire format to `routes`.

mod inbound_reply;
mod registration;

pub use inbound_reply::{
    handle_inbound_reply, InboundMessage, InboundReplyError, InboundReplyResult,
};
pub use registration::{
    register_subscriber, RegistrationError, RegistrationOutcome, RegistrationRequest,
    RegistrationResult,
};

pub const WELCOME_MESSAGE: &str = "Welcome to Daily Wellness Messages! Reply YES to confirm your subscription and start receiving daily health tips. Reply STOP at any time to unsubscribe.";

pub const CONFIRMATION_MESSAGE: &str = "Thank you for confirming! You are now subscribed to daily wellness messages. Reply STOP at any time to unsubscribe.";

pub const GUIDANCE_MESSAGE: &str = "To confirm subscription, please reply YES. Reply STOP to unsubscribe.";
