//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `billing` - Subscription lifecycle, provisioning, and affiliate attribution

pub mod billing;
pub mod foundation;
