mod health_check;
mod sms;
mod subscriptions;
mod webhooks;
