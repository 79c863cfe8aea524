//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Store Ports
//!
//! - `UserRepository` - Account lookups and username uniqueness checks
//! - `PaymentRepository` - Payment ledger lookups (webhook dedup gate)
//! - `SubscriptionRepository` - Subscription lookup and cancellation
//! - `AffiliateLinkRepository` - Affiliate commission attribution
//! - `ProvisioningStore` - The atomic user+payment+subscription write
//!
//! ## External Service Ports
//!
//! - `PaymentGateway` - Mamo Pay subscription cancellation
//! - `EmailSender` - Transactional email delivery

mod affiliate_link_repository;
mod email_sender;
mod payment_gateway;
mod payment_repository;
mod provisioning_store;
mod subscription_repository;
mod user_repository;

pub use affiliate_link_repository::AffiliateLinkRepository;
pub use email_sender::{EmailMessage, EmailSender};
pub use payment_gateway::PaymentGateway;
pub use payment_repository::PaymentRepository;
pub use provisioning_store::{ProvisionOutcome, ProvisionedAccount, ProvisioningStore};
pub use subscription_repository::SubscriptionRepository;
pub use user_repository::UserRepository;
