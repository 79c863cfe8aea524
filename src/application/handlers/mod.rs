//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod billing;

pub use billing::{
    subscription_type, CancelSubscriptionCommand, CancelSubscriptionHandler,
    CancelSubscriptionResult, IngestPaymentWebhookCommand, IngestPaymentWebhookHandler,
    IngestPaymentWebhookResult,
};
