//! Resource ceilings attached to each plan.

use serde::{Deserialize, Serialize};

use super::plan::PlanType;

/// Resource ceilings granted to an account.
///
/// Limits originate from the plan table but are stored per user so
/// that support can grant per-account overrides without a plan change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub funnels: u32,
    pub pages_per_funnel: u32,
    pub monthly_visitors: u32,
    pub custom_domains: u32,
    pub team_seats: u32,
}

impl PlanLimits {
    /// Baseline limits for a plan tier.
    pub fn for_plan(plan: PlanType) -> Self {
        match plan {
            PlanType::Basic => PlanLimits {
                funnels: 3,
                pages_per_funnel: 10,
                monthly_visitors: 5_000,
                custom_domains: 1,
                team_seats: 1,
            },
            PlanType::Pro => PlanLimits {
                funnels: 20,
                pages_per_funnel: 50,
                monthly_visitors: 50_000,
                custom_domains: 5,
                team_seats: 3,
            },
            PlanType::Agency => PlanLimits {
                funnels: 100,
                pages_per_funnel: 200,
                monthly_visitors: 500_000,
                custom_domains: 25,
                team_seats: 10,
            },
        }
    }

    /// Applies a per-account override on top of the plan baseline.
    ///
    /// Only raises ceilings; an override below the plan baseline is
    /// ignored so a plan upgrade never lowers an account's limits.
    pub fn with_override(self, other: PlanLimits) -> Self {
        PlanLimits {
            funnels: self.funnels.max(other.funnels),
            pages_per_funnel: self.pages_per_funnel.max(other.pages_per_funnel),
            monthly_visitors: self.monthly_visitors.max(other.monthly_visitors),
            custom_domains: self.custom_domains.max(other.custom_domains),
            team_seats: self.team_seats.max(other.team_seats),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agency_exceeds_pro_exceeds_basic() {
        let basic = PlanLimits::for_plan(PlanType::Basic);
        let pro = PlanLimits::for_plan(PlanType::Pro);
        let agency = PlanLimits::for_plan(PlanType::Agency);

        assert!(pro.funnels > basic.funnels);
        assert!(agency.funnels > pro.funnels);
        assert!(agency.monthly_visitors > pro.monthly_visitors);
    }

    #[test]
    fn override_only_raises_ceilings() {
        let base = PlanLimits::for_plan(PlanType::Pro);
        let bumped = base.with_override(PlanLimits {
            funnels: 40,
            pages_per_funnel: 1, // below baseline, ignored
            monthly_visitors: 50_000,
            custom_domains: 5,
            team_seats: 3,
        });

        assert_eq!(bumped.funnels, 40);
        assert_eq!(bumped.pages_per_funnel, base.pages_per_funnel);
    }
}
