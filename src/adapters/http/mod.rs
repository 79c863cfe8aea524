//! HTTP adapters - Axum routers, handlers, and DTOs.

pub mod billing;

pub use billing::{billing_router, BillingAppState};
