use std::sync::Mutex;

use async_trait::async_trait;

use super::{StoreError, SubscriberStore};
use crate::domain::{PhoneNumber, Subscriber, SubscriberUpdate};

/// Process-local store, used for tests and for running without Postgres.
#[derive(Default)]
pub struct InMemorySubscriberStore {
    subscribers: Mutex<Vec<Subscriber>>,
}

impl InMemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record ever written, in insertion order.
    pub fn all(&self) -> Result<Vec<Subscriber>, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<Subscriber>>, StoreError> {
        self.subscribers
            .lock()
            .map_err(|_| StoreError::Write(anyhow::anyhow!("Subscriber store lock is poisoned")))
    }
}

#[async_trait]
impl SubscriberStore for InMemorySubscriberStore {
    #[tracing::instrument(name = "Look up subscriber in memory", skip(self))]
    async fn find_by_phone(&self, phone: &PhoneNumber) -> Result<Option<Subscriber>, StoreError> {
        let subscribers = self.lock()?;
        Ok(subscribers
            .iter()
            .rev()
            .find(|s| &s.phone_number == phone)
            .cloned())
    }

    #[tracing::instrument(
        name = "Insert subscriber in memory",
        skip(self, subscriber),
        fields(phone_number = %subscriber.phone_number)
    )]
    async fn insert(&self, subscriber: &Subscriber) -> Result<(), StoreError> {
        let mut subscribers = self.lock()?;
        let active_exists = subscribers
            .iter()
            .any(|s| s.phone_number == subscriber.phone_number && !s.unsubscribed());
        if active_exists && !subscriber.unsubscribed() {
            return Err(StoreError::Conflict(subscriber.phone_number.clone()));
        }
        subscribers.push(subscriber.clone());
        Ok(())
    }

    #[tracing::instrument(name = "Update subscriber in memory", skip(self, update))]
    async fn update(
        &self,
        phone: &PhoneNumber,
        update: &SubscriberUpdate,
    ) -> Result<Subscriber, StoreError> {
        let mut subscribers = self.lock()?;
        let subscriber = subscribers
            .iter_mut()
            .rev()
            .find(|s| &s.phone_number == phone)
            .ok_or_else(|| StoreError::NotFound(phone.clone()))?;
        subscriber.apply(update);
        Ok(subscriber.clone())
    }
}
