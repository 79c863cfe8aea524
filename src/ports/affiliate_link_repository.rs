//! Affiliate link repository port.

use async_trait::async_trait;

use crate::domain::billing::AffiliateLink;
use crate::domain::foundation::DomainError;

/// Repository port for affiliate link attribution.
#[async_trait]
pub trait AffiliateLinkRepository: Send + Sync {
    /// Find an affiliate link by its token.
    ///
    /// Returns `None` for unknown tokens; attribution for an unknown
    /// token is silently skipped, never an error.
    async fn find_by_token(&self, token: &str) -> Result<Option<AffiliateLink>, DomainError>;

    /// Atomically add a commission amount to a link's running total.
    ///
    /// Implemented as an in-place increment so concurrent attributions
    /// never lose updates.
    async fn add_commission(&self, token: &str, amount: f64) -> Result<(), DomainError>;
}
