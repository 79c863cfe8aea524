//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresUserRepository` - Account lookups
//! - `PostgresPaymentRepository` - Payment ledger lookups
//! - `PostgresSubscriptionRepository` - Subscription reads and cancellation writes
//! - `PostgresAffiliateLinkRepository` - Affiliate attribution
//! - `PostgresProvisioningStore` - Atomic account provisioning transaction

mod affiliate_link_repository;
mod convert;
mod payment_repository;
mod provisioning_store;
mod subscription_repository;
mod user_repository;

pub use affiliate_link_repository::PostgresAffiliateLinkRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use provisioning_store::PostgresProvisioningStore;
pub use subscription_repository::PostgresSubscriptionRepository;
pub use user_repository::PostgresUserRepository;
