//! Add-on entitlement entity.
//!
//! An add-on row records a purchasable extra (custom domain support,
//! white labelling) granted to a user. Its status mirrors the paired
//! subscription: when an add-on subscription is cancelled, all of the
//! user's active add-ons of that type are cancelled with it.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AddOnId, Timestamp, UserId};

use super::status::SubscriptionStatus;

/// Purchasable add-on product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonType {
    /// Serve funnels from a customer-owned domain.
    CustomDomain,
    /// Remove product branding from published pages.
    WhiteLabel,
}

impl AddonType {
    /// Stable string form for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            AddonType::CustomDomain => "custom_domain",
            AddonType::WhiteLabel => "white_label",
        }
    }
}

impl std::fmt::Display for AddonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An add-on granted to a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    pub id: AddOnId,

    /// User who owns this add-on.
    pub user_id: UserId,

    pub addon_type: AddonType,

    /// Mirrors the paired subscription's lifecycle.
    pub status: SubscriptionStatus,

    /// Billing frequency string the add-on was purchased with.
    pub billing_cycle: String,

    pub starts_at: Timestamp,

    /// End of the paid period; fixed at creation.
    pub ends_at: Timestamp,
}

impl AddOn {
    /// Creates an active add-on for a fresh purchase.
    pub fn create(
        user_id: UserId,
        addon_type: AddonType,
        billing_cycle: String,
        starts_at: Timestamp,
        ends_at: Timestamp,
    ) -> Self {
        Self {
            id: AddOnId::new(),
            user_id,
            addon_type,
            status: SubscriptionStatus::Active,
            billing_cycle,
            starts_at,
            ends_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_starts_active() {
        let now = Timestamp::now();
        let addon = AddOn::create(
            UserId::new(),
            AddonType::CustomDomain,
            "monthly".to_string(),
            now,
            now.add_months(1),
        );

        assert_eq!(addon.status, SubscriptionStatus::Active);
        assert_eq!(addon.addon_type, AddonType::CustomDomain);
        assert_eq!(addon.billing_cycle, "monthly");
    }

    #[test]
    fn addon_type_strings_are_stable() {
        assert_eq!(AddonType::CustomDomain.as_str(), "custom_domain");
        assert_eq!(AddonType::WhiteLabel.as_str(), "white_label");
    }
}
