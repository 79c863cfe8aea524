//! Subscription aggregate entity.
//!
//! A subscription records one billing agreement created from a
//! successful charge. The period end date is fixed at creation and is
//! never altered afterwards; cancellation only changes the status, so
//! access runs until `ends_at` regardless of when the user cancels.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};

use super::addon::AddonType;
use super::interval::IntervalUnit;
use super::status::SubscriptionStatus;

/// What kind of product a subscription covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// A plan tier subscription.
    Plan,
    /// An add-on purchased alongside or on top of a plan.
    Addon,
}

impl ItemType {
    /// Stable string form for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Plan => "plan",
            ItemType::Addon => "addon",
        }
    }
}

/// Subscription aggregate.
///
/// # Invariants
///
/// - `external_id` is unique (one row per gateway subscription)
/// - `starts_at <= ends_at`
/// - `ends_at` never changes after creation
/// - Status transitions follow state machine rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier for this subscription.
    pub id: SubscriptionId,

    /// Gateway subscription id (or a synthetic `SUB_<txid>`).
    pub external_id: String,

    /// User who owns this subscription.
    pub user_id: UserId,

    /// Current status in the subscription lifecycle.
    pub status: SubscriptionStatus,

    /// Whether this covers a plan tier or an add-on.
    pub item_type: ItemType,

    /// Set when `item_type` is `Addon`.
    pub addon_type: Option<AddonType>,

    /// Normalised billing interval unit.
    pub interval_unit: IntervalUnit,

    /// Number of interval units per billing period.
    pub interval_count: u32,

    /// Start of the paid period.
    pub starts_at: Timestamp,

    /// End of the paid period. Fixed at creation.
    pub ends_at: Timestamp,

    /// Raw webhook payload that created this subscription.
    pub raw_payload: serde_json::Value,

    /// When the subscription was created.
    pub created_at: Timestamp,

    /// When the subscription was cancelled (if cancelled).
    pub cancelled_at: Option<Timestamp>,
}

impl Subscription {
    /// Creates an active subscription from a processed charge.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        external_id: String,
        user_id: UserId,
        item_type: ItemType,
        addon_type: Option<AddonType>,
        interval_unit: IntervalUnit,
        interval_count: u32,
        starts_at: Timestamp,
        ends_at: Timestamp,
        raw_payload: serde_json::Value,
    ) -> Self {
        Self {
            id: SubscriptionId::new(),
            external_id,
            user_id,
            status: SubscriptionStatus::Active,
            item_type,
            addon_type,
            interval_unit,
            interval_count,
            starts_at,
            ends_at,
            raw_payload,
            created_at: Timestamp::now(),
            cancelled_at: None,
        }
    }

    /// Cancel this subscription.
    ///
    /// Leaves `ends_at` untouched; the user keeps access until the
    /// paid period runs out. Re-cancelling an already cancelled
    /// subscription is accepted and rewrites the same status.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is not allowed.
    pub fn cancel(&mut self) -> Result<(), DomainError> {
        use crate::domain::foundation::StateMachine;

        self.status = self
            .status
            .transition_to(SubscriptionStatus::Cancelled)
            .map_err(|_| {
                DomainError::new(
                    ErrorCode::InvalidStateTransition,
                    format!(
                        "Cannot transition subscription from {:?} to Cancelled",
                        self.status
                    ),
                )
            })?;
        self.cancelled_at = Some(Timestamp::now());
        Ok(())
    }

    /// Check if this subscription currently grants access.
    ///
    /// True while within the paid period, cancelled or not.
    pub fn has_access(&self) -> bool {
        self.status.has_access() && !Timestamp::now().is_after(&self.ends_at)
    }
}
