//! Axum router configuration for billing endpoints.
//!
//! This module defines the route structure for billing-related API
//! endpoints and wires them to their corresponding handlers.

use axum::{routing::get, routing::post, Router};

use super::handlers::{cancel_subscription, handle_payment_webhook, health, BillingAppState};

/// Create the billing API router.
///
/// # Routes
///
/// ## User Endpoints (require authentication)
/// - `POST /cancel` - Cancel a subscription
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new().route("/cancel", post(cancel_subscription))
}

/// Create the webhook router.
///
/// This is separate from the main billing routes because webhook
/// deliveries don't carry user authentication.
///
/// # Routes
/// - `POST /mamopay` - Ingest Mamo Pay payment webhooks
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/mamopay", post(handle_payment_webhook))
}

/// Create the complete billing module router.
///
/// Combines user routes, webhook routes, and the health probe into a
/// single router suitable for mounting at the application root.
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .nest("/api/billing", billing_routes())
        .nest("/api/webhooks", webhook_routes())
        .route("/health", get(health))
}
