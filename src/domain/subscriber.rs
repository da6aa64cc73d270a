use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{Keyword, PhoneNumber, SubscriberName};

/// Consent state of a subscriber.
///
/// Persisted as the `(opt_in_completed, unsubscribed)` flag pair; the pair
/// `(true, true)` has no variant and is rejected by [`ConsentState::from_flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentState {
    Pending,
    Confirmed,
    Unsubscribed,
}

impl ConsentState {
    pub fn from_flags(opt_in_completed: bool, unsubscribed: bool) -> Result<Self, String> {
        match (opt_in_completed, unsubscribed) {
            (false, false) => Ok(Self::Pending),
            (true, false) => Ok(Self::Confirmed),
            (false, true) => Ok(Self::Unsubscribed),
            (true, true) => Err("subscriber is both opted in and unsubscribed".to_string()),
        }
    }

    pub fn opt_in_completed(self) -> bool {
        matches!(self, Self::Confirmed)
    }

    pub fn unsubscribed(self) -> bool {
        matches!(self, Self::Unsubscribed)
    }

    /// State reached after an inbound keyword. Every keyword is accepted
    /// from every state.
    pub fn on_keyword(self, keyword: Keyword) -> Self {
        match keyword {
            Keyword::Confirm | Keyword::OptIn => Self::Confirmed,
            Keyword::OptOut => Self::Unsubscribed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Subscriber {
    pub id: Uuid,
    pub phone_number: PhoneNumber,
    pub full_name: SubscriberName,
    pub state: ConsentState,
    pub created_at: DateTime<Utc>,
}

impl Subscriber {
    /// Fresh record for a first registration. Always starts out pending.
    pub fn register(phone_number: PhoneNumber, full_name: SubscriberName) -> Self {
        Self {
            id: Uuid::new_v4(),
            phone_number,
            full_name,
            state: ConsentState::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn opt_in_completed(&self) -> bool {
        self.state.opt_in_completed()
    }

    pub fn unsubscribed(&self) -> bool {
        self.state.unsubscribed()
    }

    pub fn apply(&mut self, update: &SubscriberUpdate) {
        if let Some(full_name) = &update.full_name {
            self.full_name = full_name.clone();
        }
        if let Some(state) = update.state {
            self.state = state;
        }
    }
}

/// Partial update of a subscriber. `None` fields are left untouched.
///
/// The two consent flags always travel together as a [`ConsentState`], so an
/// update can never produce an opted-in and unsubscribed record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriberUpdate {
    pub full_name: Option<SubscriberName>,
    pub state: Option<ConsentState>,
}

impl SubscriberUpdate {
    pub fn state(state: ConsentState) -> Self {
        Self {
            full_name: None,
            state: Some(state),
        }
    }

    /// Re-registration of an unsubscribed number restarts the confirmation flow.
    pub fn resubscribe(full_name: SubscriberName) -> Self {
        Self {
            full_name: Some(full_name),
            state: Some(ConsentState::Pending),
        }
    }
}
