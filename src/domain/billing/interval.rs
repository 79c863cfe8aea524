//! Billing interval arithmetic.
//!
//! Payment events carry a free-form frequency string and an interval
//! count. These helpers translate that pair into concrete period end
//! dates using calendar-aware month math.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Timestamp format used by the payment gateway in `created_date`.
const GATEWAY_DATE_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// Normalised billing interval unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalUnit {
    Week,
    Month,
    Year,
}

impl IntervalUnit {
    /// Maps a gateway frequency string onto an interval unit.
    ///
    /// Unrecognised frequencies degrade to `Month`; a wrong period
    /// length is recoverable, a rejected payment is not.
    pub fn from_frequency(raw: &str) -> Self {
        match Self::recognise(raw) {
            Some(unit) => unit,
            None => {
                tracing::warn!(
                    frequency = raw,
                    "Unknown billing frequency, defaulting to monthly"
                );
                IntervalUnit::Month
            }
        }
    }

    fn recognise(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "weekly" => Some(IntervalUnit::Week),
            "monthly" => Some(IntervalUnit::Month),
            "annually" | "yearly" => Some(IntervalUnit::Year),
            _ => None,
        }
    }

    /// Stable string form for persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntervalUnit::Week => "week",
            IntervalUnit::Month => "month",
            IntervalUnit::Year => "year",
        }
    }
}

impl std::fmt::Display for IntervalUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Computes when the billing period starting at `start` ends.
///
/// Weekly periods are exact day arithmetic; monthly and yearly periods
/// use calendar months, clamping to the last day of shorter months
/// (Jan 31 + 1 month = Feb 28). An unrecognised frequency grants
/// exactly one month regardless of the interval count.
pub fn resolve_end_date(start: Timestamp, frequency: &str, interval: u32) -> Timestamp {
    let interval = interval.max(1);
    match IntervalUnit::recognise(frequency) {
        Some(IntervalUnit::Week) => start.add_days(7 * i64::from(interval)),
        Some(IntervalUnit::Month) => start.add_months(interval),
        Some(IntervalUnit::Year) => start.add_years(interval),
        None => {
            tracing::warn!(
                frequency,
                interval,
                "Unknown billing frequency, granting a single month"
            );
            start.add_months(1)
        }
    }
}

/// Parses the gateway's `created_date` timestamp.
///
/// A malformed date falls back to the current time with a warning; the
/// payment itself is trusted even when its timestamp is not.
pub fn parse_created_date(raw: &str) -> Timestamp {
    match NaiveDateTime::parse_from_str(raw, GATEWAY_DATE_FORMAT) {
        Ok(naive) => Timestamp::from_datetime(naive.and_utc()),
        Err(err) => {
            tracing::warn!(
                created_date = raw,
                error = %err,
                "Malformed created_date on payment event, using current time"
            );
            Timestamp::now()
        }
    }
}
