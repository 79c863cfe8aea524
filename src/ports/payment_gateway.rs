//! Payment gateway port.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// Port for the external payment gateway's subscription API.
///
/// Callers treat every method as best-effort: local ledger state is
/// authoritative, and a gateway failure is logged and surfaced as a
/// flag, never propagated as an error.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Cancel the mirrored subscription at the gateway.
    ///
    /// # Errors
    ///
    /// - `GatewayError` on any transport or API failure
    async fn cancel_subscription(&self, external_id: &str) -> Result<(), DomainError>;
}
