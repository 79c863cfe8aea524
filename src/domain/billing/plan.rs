//! Subscription plan types.

use serde::{Deserialize, Serialize};

/// Subscription plan determining feature access and resource ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    /// Entry tier for single-workspace users.
    Basic,
    /// Professional tier for growing teams.
    Pro,
    /// Agency tier with the highest ceilings.
    Agency,
}

impl PlanType {
    /// Parses a plan string from a payment event.
    ///
    /// Unknown plan names degrade to `Basic` rather than failing the
    /// webhook; the conservative tier keeps a paying customer usable
    /// while the mismatch is investigated.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "basic" => PlanType::Basic,
            "pro" => PlanType::Pro,
            "agency" => PlanType::Agency,
            other => {
                tracing::warn!(plan = other, "Unknown plan type, falling back to basic");
                PlanType::Basic
            }
        }
    }

    /// Human-readable plan name.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanType::Basic => "Basic",
            PlanType::Pro => "Pro",
            PlanType::Agency => "Agency",
        }
    }

    /// Stable string form for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Basic => "basic",
            PlanType::Pro => "pro",
            PlanType::Agency => "agency",
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a charge actually purchased. The gateway reuses the plan type
/// field for add-on products, so one string can name either a plan
/// tier or an add-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductType {
    Plan(PlanType),
    Addon(super::addon::AddonType),
}

impl ProductType {
    /// Parses the gateway's `planType` string.
    ///
    /// Unknown product names degrade to the basic plan, matching
    /// [`PlanType::parse_lenient`].
    pub fn parse_lenient(raw: &str) -> Self {
        use super::addon::AddonType;
        match raw.to_lowercase().as_str() {
            "custom_domain" => ProductType::Addon(AddonType::CustomDomain),
            "white_label" => ProductType::Addon(AddonType::WhiteLabel),
            other => ProductType::Plan(PlanType::parse_lenient(other)),
        }
    }

    /// The plan tier whose limits apply to this purchase. Add-on-only
    /// signups get the basic tier.
    pub fn plan(&self) -> PlanType {
        match self {
            ProductType::Plan(plan) => *plan,
            ProductType::Addon(_) => PlanType::Basic,
        }
    }

    pub fn addon(&self) -> Option<super::addon::AddonType> {
        match self {
            ProductType::Plan(_) => None,
            ProductType::Addon(addon) => Some(*addon),
        }
    }
}
