//! Subscription status state machine.
//!
//! Defines the subscription lifecycle states and their valid
//! transitions.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};

/// Subscription status.
///
/// A subscription starts active on successful payment and can only
/// move to cancelled. Cancellation never shortens the paid period;
/// access continues until the period end date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Paid subscription with full access.
    Active,

    /// User or system requested cancellation.
    /// Access continues until the period end date.
    Cancelled,
}

impl SubscriptionStatus {
    /// Returns true if this status grants access to the application.
    ///
    /// Cancelled subscriptions keep access; the period end date, not
    /// the status, decides when access actually stops.
    pub fn has_access(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active | SubscriptionStatus::Cancelled
        )
    }

    /// Stable string form for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

impl StateMachine for SubscriptionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SubscriptionStatus::*;
        matches!(
            (self, target),
            // From ACTIVE
            (Active, Cancelled)
            // From CANCELLED
                | (Cancelled, Cancelled) // Idempotent re-cancel
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SubscriptionStatus::*;
        match self {
            Active => vec![Cancelled],
            Cancelled => vec![Cancelled],
        }
    }
}
