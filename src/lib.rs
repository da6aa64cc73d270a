use std::sync::Arc;

use domain::KeywordSet;
use sms_client::MessagingGateway;
use subscriber_store::SubscriberStore;

pub mod configuration;
pub mod consent;
pub mod domain;
pub mod routes;
pub mod sms_client;
pub mod startup;
pub mod subscriber_store;
pub mod telemetry;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub subscriber_store: Arc<dyn SubscriberStore>,
    pub sms_client: Arc<dyn MessagingGateway>,
    pub keywords: Arc<KeywordSet>,
}
