mod keyword;
mod new_subscriber;
mod phone_number;
mod subscriber;
mod subscriber_name;

pub use keyword::{Keyword, KeywordSet};
pub use new_subscriber::{InvalidField, NewSubscriber};
pub use phone_number::{PhoneNumber, DEFAULT_COUNTRY_CODE};
pub use subscriber::{ConsentState, Subscriber, SubscriberUpdate};
pub use subscriber_name::SubscriberName;
