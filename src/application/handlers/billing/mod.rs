//! Billing handlers.
//!
//! Command handlers for the subscription lifecycle:
//!
//! ## Commands
//! - Ingesting payment webhooks (validation, dedup, provisioning)
//! - Cancelling subscriptions

mod cancel_subscription;
pub(crate) mod emails;
mod ingest_payment_webhook;

pub use cancel_subscription::{
    subscription_type, CancelSubscriptionCommand, CancelSubscriptionHandler,
    CancelSubscriptionResult,
};
pub use ingest_payment_webhook::{
    IngestPaymentWebhookCommand, IngestPaymentWebhookHandler, IngestPaymentWebhookResult,
};
