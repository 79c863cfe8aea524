//! Payment ledger entity.
//!
//! One payment row is written per processed charge. The gateway
//! transaction id carries a unique constraint and is the idempotency
//! anchor for the whole provisioning flow.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{PaymentId, Timestamp, UserId};

use super::subscription::ItemType;

/// Payment settlement status.
///
/// Refund events from the gateway are acknowledged without touching
/// the ledger, so a recorded payment only ever sits in one state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Funds captured by the gateway.
    Captured,
}

impl PaymentStatus {
    /// Stable string form for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Captured => "captured",
        }
    }
}

/// A settled charge recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,

    /// Gateway transaction id. Unique; duplicate events with the same
    /// id are dropped.
    pub transaction_id: String,

    /// Charged amount in major currency units.
    pub amount: f64,

    /// ISO currency code.
    pub currency: String,

    pub status: PaymentStatus,

    /// Whether the charge bought a plan or an add-on.
    pub item_type: ItemType,

    /// User provisioned from this charge.
    pub user_id: UserId,

    /// Affiliate token the charge was attributed to, if any.
    pub affiliate_token: Option<String>,

    /// Commission owed to the affiliate, taken verbatim from the
    /// inbound event.
    pub commission_amount: f64,

    /// Raw webhook payload snapshot.
    pub raw_payload: serde_json::Value,

    pub created_at: Timestamp,
}

impl Payment {
    /// Records a captured charge.
    #[allow(clippy::too_many_arguments)]
    pub fn capture(
        transaction_id: String,
        amount: f64,
        currency: String,
        item_type: ItemType,
        user_id: UserId,
        affiliate_token: Option<String>,
        commission_amount: f64,
        raw_payload: serde_json::Value,
    ) -> Self {
        Self {
            id: PaymentId::new(),
            transaction_id,
            amount,
            currency,
            status: PaymentStatus::Captured,
            item_type,
            user_id,
            affiliate_token,
            commission_amount,
            raw_payload,
            created_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn capture_records_status_and_attribution() {
        let payment = Payment::capture(
            "txn_99".to_string(),
            49.0,
            "USD".to_string(),
            ItemType::Plan,
            UserId::new(),
            Some("tok_partner".to_string()),
            9.8,
            json!({"id": "txn_99"}),
        );

        assert_eq!(payment.status, PaymentStatus::Captured);
        assert_eq!(payment.transaction_id, "txn_99");
        assert_eq!(payment.affiliate_token.as_deref(), Some("tok_partner"));
        assert_eq!(payment.commission_amount, 9.8);
    }

    #[test]
    fn capture_without_affiliate_has_zero_commission() {
        let payment = Payment::capture(
            "txn_100".to_string(),
            19.0,
            "USD".to_string(),
            ItemType::Plan,
            UserId::new(),
            None,
            0.0,
            json!({}),
        );

        assert!(payment.affiliate_token.is_none());
        assert_eq!(payment.commission_amount, 0.0);
    }
}
