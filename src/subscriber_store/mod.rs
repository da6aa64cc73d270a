//! Durable subscriber records.
//!
//! Handlers only see the [`SubscriberStore`] trait. Backends must give
//! read-after-write consistency and make a single `update` atomic; nothing
//! here coordinates across records or calls.

mod in_memory;
mod postgres;

pub use in_memory::InMemorySubscriberStore;
pub use postgres::PostgresSubscriberStore;

use async_trait::async_trait;

use crate::domain::{PhoneNumber, Subscriber, SubscriberUpdate};
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum StoreError {
    #[error("No subscriber is registered for {0}.")]
    NotFound(PhoneNumber),
    #[error("An active subscriber is already registered for {0}.")]
    Conflict(PhoneNumber),
    #[error("Stored subscriber record is invalid: {0}")]
    Corrupt(String),
    #[error(transparent)]
    Write(#[from] anyhow::Error),
}

impl std::fmt::Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[async_trait]
pub trait SubscriberStore: Send + Sync {
    /// Most recent record for the canonical phone, if any.
    async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Option<Subscriber>, StoreError>;

    /// Fails with [`StoreError::Conflict`] if an active (not unsubscribed)
    /// record already exists for the same phone.
    async fn insert(&self, subscriber: &Subscriber) -> Result<(), StoreError>;

    /// Applies `update` to the most recent record for `phone` and returns the
    /// updated record.
    async fn update(
        &self,
        phone: &PhoneNumber,
        update: &SubscriberUpdate,
    ) -> Result<Subscriber, StoreError>;
}
