//! Column conversions shared by the PostgreSQL repositories.
//!
//! Enum columns are stored as the stable strings from the domain
//! types' `as_str` forms; these parse them back, treating anything
//! unrecognised as data corruption.

use crate::domain::billing::{
    AddonType, IntervalUnit, ItemType, PaymentStatus, PlanType, SubscriptionStatus,
};
use crate::domain::foundation::{DomainError, ErrorCode};

pub(super) fn parse_plan(s: &str) -> Result<PlanType, DomainError> {
    match s {
        "basic" => Ok(PlanType::Basic),
        "pro" => Ok(PlanType::Pro),
        "agency" => Ok(PlanType::Agency),
        _ => Err(invalid_column("plan", s)),
    }
}

pub(super) fn parse_subscription_status(s: &str) -> Result<SubscriptionStatus, DomainError> {
    match s {
        "active" => Ok(SubscriptionStatus::Active),
        "cancelled" => Ok(SubscriptionStatus::Cancelled),
        _ => Err(invalid_column("status", s)),
    }
}

pub(super) fn parse_item_type(s: &str) -> Result<ItemType, DomainError> {
    match s {
        "plan" => Ok(ItemType::Plan),
        "addon" => Ok(ItemType::Addon),
        _ => Err(invalid_column("item_type", s)),
    }
}

pub(super) fn parse_addon_type(s: &str) -> Result<AddonType, DomainError> {
    match s {
        "custom_domain" => Ok(AddonType::CustomDomain),
        "white_label" => Ok(AddonType::WhiteLabel),
        _ => Err(invalid_column("addon_type", s)),
    }
}

pub(super) fn parse_interval_unit(s: &str) -> Result<IntervalUnit, DomainError> {
    match s {
        "week" => Ok(IntervalUnit::Week),
        "month" => Ok(IntervalUnit::Month),
        "year" => Ok(IntervalUnit::Year),
        _ => Err(invalid_column("interval_unit", s)),
    }
}

pub(super) fn parse_payment_status(s: &str) -> Result<PaymentStatus, DomainError> {
    match s {
        "captured" => Ok(PaymentStatus::Captured),
        _ => Err(invalid_column("payment_status", s)),
    }
}

fn invalid_column(column: &str, value: &str) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} value: {}", column, value),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_plan_conversion() {
        for plan in [PlanType::Basic, PlanType::Pro, PlanType::Agency] {
            assert_eq!(parse_plan(plan.as_str()).unwrap(), plan);
        }
    }

    #[test]
    fn roundtrip_status_conversion() {
        for status in [SubscriptionStatus::Active, SubscriptionStatus::Cancelled] {
            assert_eq!(parse_subscription_status(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn roundtrip_item_type_conversion() {
        for item in [ItemType::Plan, ItemType::Addon] {
            assert_eq!(parse_item_type(item.as_str()).unwrap(), item);
        }
    }

    #[test]
    fn roundtrip_interval_unit_conversion() {
        for unit in [IntervalUnit::Week, IntervalUnit::Month, IntervalUnit::Year] {
            assert_eq!(parse_interval_unit(unit.as_str()).unwrap(), unit);
        }
    }

    #[test]
    fn unknown_values_are_rejected() {
        assert!(parse_plan("platinum").is_err());
        assert!(parse_subscription_status("paused").is_err());
        assert!(parse_item_type("bundle").is_err());
        assert!(parse_addon_type("extra_seats").is_err());
        assert!(parse_payment_status("pending").is_err());
        assert!(parse_payment_status("refunded").is_err());
    }
}
