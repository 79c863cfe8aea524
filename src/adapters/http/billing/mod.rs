//! HTTP adapter for billing endpoints.
//!
//! Exposes the billing domain via REST API:
//! - `POST /api/webhooks/mamopay` - Ingest payment webhooks
//! - `POST /api/billing/cancel` - Cancel a subscription
//! - `GET /health` - Liveness probe

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{CancelSubscriptionRequest, CancelSubscriptionResponse, ErrorResponse, WebhookResponse};
pub use handlers::{AuthenticatedUser, BillingApiError, BillingAppState};
pub use routes::{billing_router, billing_routes, webhook_routes};
