//! Provisioning store port.
//!
//! Account provisioning writes a user, a payment, a subscription, and
//! optionally an add-on as one atomic unit. This port owns that
//! transaction boundary: either every row lands or none do, so a
//! half-provisioned account can never exist.

use async_trait::async_trait;

use crate::domain::billing::{AddOn, Payment, Subscription, User};
use crate::domain::foundation::DomainError;

/// Everything written when a charge provisions an account.
#[derive(Debug, Clone)]
pub struct ProvisionedAccount {
    pub user: User,
    pub payment: Payment,
    pub subscription: Subscription,
    /// Present when the charge purchased an add-on product.
    pub addon: Option<AddOn>,
}

/// Result of attempting to provision an account.
///
/// Concurrent duplicate deliveries race at the store: the dedup read
/// can pass for both, and the loser hits the unique constraint on the
/// transaction id. That constraint violation is the duplicate signal,
/// reported here as an outcome rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// All rows were inserted.
    Created,
    /// The transaction id was already recorded (duplicate delivery).
    DuplicateTransaction,
    /// The email is already registered (business-rule violation).
    EmailExists,
}

/// Port for the atomic provisioning transaction.
///
/// Implementations must insert under the unique constraints on
/// transaction id and email and map constraint violations to the
/// corresponding [`ProvisionOutcome`] instead of failing.
#[async_trait]
pub trait ProvisioningStore: Send + Sync {
    /// Create the user, payment, subscription, and optional add-on
    /// rows in one transaction.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on any failure other than the mapped
    ///   uniqueness violations
    async fn create_account(
        &self,
        account: &ProvisionedAccount,
    ) -> Result<ProvisionOutcome, DomainError>;
}
