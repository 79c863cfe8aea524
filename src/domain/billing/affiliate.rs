//! Affiliate link entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AffiliateLinkId, Timestamp, UserId};

/// A trackable referral link owned by a user.
///
/// The commission total is incremented once per attributed payment;
/// the amount is taken verbatim from the inbound event rather than
/// recomputed from a rate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffiliateLink {
    pub id: AffiliateLinkId,

    /// Lookup key carried on payment events.
    pub token: String,

    /// User who owns this link and earns its commission.
    pub user_id: UserId,

    /// Accumulated commission across all attributed payments.
    pub total_commission: f64,

    pub created_at: Timestamp,
}

impl AffiliateLink {
    /// Credits a commission from an attributed payment.
    pub fn credit_commission(&mut self, amount: f64) {
        self.total_commission += amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credit_accumulates() {
        let mut link = AffiliateLink {
            id: AffiliateLinkId::new(),
            token: "tok_partner".to_string(),
            user_id: UserId::new(),
            total_commission: 10.0,
            created_at: Timestamp::now(),
        };

        link.credit_commission(9.8);
        link.credit_commission(5.0);

        assert!((link.total_commission - 24.8).abs() < f64::EPSILON);
    }
}
