//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - PostgreSQL repository and store implementations
//! - `mamopay` - Mamo Pay payment gateway client
//! - `email` - Resend transactional email client
//! - `http` - Axum routers, handlers, and DTOs

pub mod email;
pub mod http;
pub mod mamopay;
pub mod postgres;
