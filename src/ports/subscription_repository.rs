//! Subscription repository port.

use async_trait::async_trait;

use crate::domain::billing::Subscription;
use crate::domain::foundation::DomainError;

/// Repository port for subscription persistence.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find a subscription by its gateway external id.
    ///
    /// Returns `None` if not found.
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Subscription>, DomainError>;

    /// Persist a cancellation.
    ///
    /// Implementations must run in one transaction: update the
    /// subscription's status and cancellation timestamp (never its
    /// end date), and when the subscription covers an add-on, cascade
    /// all of the owner's active add-ons of that type to cancelled.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the row no longer exists
    /// - `DatabaseError` on persistence failure
    async fn save_cancellation(&self, subscription: &Subscription) -> Result<(), DomainError>;
}
