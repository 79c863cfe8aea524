//! Payment repository port.

use async_trait::async_trait;

use crate::domain::billing::Payment;
use crate::domain::foundation::DomainError;

/// Repository port for payment ledger lookups.
///
/// The transaction id lookup is the webhook dedup gate: a hit means
/// the charge was already processed and the delivery is acknowledged
/// without side effects.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Find a payment by its gateway transaction id.
    ///
    /// Returns `None` if the transaction has not been processed.
    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, DomainError>;
}
