//! Mamo Pay webhook event types.
//!
//! Defines the structures for parsing Mamo Pay webhook payloads.
//! Only fields relevant to our processing are captured; parsing is
//! done by hand against `serde_json::Value` so that the first missing
//! or malformed field can be named in the rejection.

use serde_json::Value;

use crate::domain::foundation::ValidationError;

use super::interval::parse_created_date;
use super::plan::ProductType;
use crate::domain::foundation::Timestamp;

/// Event type that triggers account provisioning. All other event
/// types are acknowledged without processing.
pub const CHARGE_SUCCEEDED: &str = "charge.succeeded";

/// Currency assumed when the gateway omits `amount_currency`.
const DEFAULT_CURRENCY: &str = "USD";

/// A successful charge event received from Mamo Pay.
///
/// The transaction id doubles as the idempotency key: two events with
/// the same id describe the same charge and must only be processed
/// once.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentEvent {
    /// Gateway transaction id, used for deduplication.
    pub transaction_id: String,

    /// Charged amount in major currency units.
    pub amount: f64,

    /// ISO currency code, defaulting to USD when absent.
    pub currency: String,

    /// When the charge was created at the gateway.
    pub created_at: Timestamp,

    /// Gateway subscription id. Synthesised from the transaction id
    /// for one-off charges that carry no subscription.
    pub subscription_id: String,

    /// Customer details attached to the charge.
    pub customer: CustomerDetails,
}

/// Customer block of a charge event.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerDetails {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    /// What the charge purchased, parsed from the gateway's `planType`.
    pub product: ProductType,
    /// Raw billing frequency string, kept verbatim for period math.
    pub frequency: String,
    pub frequency_interval: u32,
    pub affiliate_link: Option<AffiliateRef>,
}

/// Affiliate attribution carried on a charge event.
#[derive(Debug, Clone, PartialEq)]
pub struct AffiliateRef {
    pub id: String,
    pub token: String,
    pub affiliate_amount: f64,
}

impl PaymentEvent {
    /// Parses a charge event out of a raw webhook payload.
    ///
    /// The caller has already checked the event type; this only
    /// validates the fields provisioning needs. Errors name the first
    /// field that failed so the gateway log is actionable.
    pub fn from_value(payload: &Value) -> Result<Self, ValidationError> {
        let transaction_id = require_string(payload, "id")?;

        let amount = payload
            .get("amount")
            .and_then(Value::as_f64)
            .ok_or_else(|| ValidationError::missing_field("amount"))?;
        if amount <= 0.0 {
            return Err(ValidationError::not_positive("amount", amount as i64));
        }

        let currency = payload
            .get("amount_currency")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CURRENCY)
            .to_string();

        let created_at = match payload.get("created_date").and_then(Value::as_str) {
            Some(raw) => parse_created_date(raw),
            None => Timestamp::now(),
        };

        // One-off charges arrive without a subscription id; a synthetic
        // id keeps the ledger uniform.
        let subscription_id = match payload.get("subscription_id").and_then(Value::as_str) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => format!("SUB_{transaction_id}"),
        };

        let details = payload
            .get("customer_details")
            .filter(|v| v.is_object())
            .ok_or_else(|| ValidationError::missing_field("customer_details"))?;

        let customer = CustomerDetails::from_value(details)?;

        Ok(PaymentEvent {
            transaction_id,
            amount,
            currency,
            created_at,
            subscription_id,
            customer,
        })
    }
}

impl CustomerDetails {
    fn from_value(details: &Value) -> Result<Self, ValidationError> {
        let email = require_string(details, "email")?;
        let first_name = require_string(details, "firstName")?;
        let last_name = require_string(details, "lastName")?;

        // Leniency applies to unrecognised values, not absent fields:
        // an unknown planType still parses (degrading to Basic), but a
        // payload without one is rejected.
        let product = ProductType::parse_lenient(&require_string(details, "planType")?);

        let frequency = require_string(details, "frequency")?;

        let frequency_interval = details
            .get("frequencyInterval")
            .and_then(Value::as_i64)
            .ok_or_else(|| ValidationError::missing_field("frequencyInterval"))?;
        if frequency_interval <= 0 {
            return Err(ValidationError::not_positive(
                "frequencyInterval",
                frequency_interval,
            ));
        }
        let frequency_interval = frequency_interval as u32;

        let affiliate_link = match details.get("affiliate_link") {
            Some(link) if link.is_object() => Some(AffiliateRef::from_value(link)?),
            _ => None,
        };

        Ok(CustomerDetails {
            email,
            first_name,
            last_name,
            product,
            frequency,
            frequency_interval,
            affiliate_link,
        })
    }
}

impl AffiliateRef {
    fn from_value(link: &Value) -> Result<Self, ValidationError> {
        let id = require_string(link, "id")?;
        let token = require_string(link, "token")?;
        let affiliate_amount = link
            .get("affiliateAmount")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);

        Ok(AffiliateRef {
            id,
            token,
            affiliate_amount,
        })
    }
}

fn require_string(value: &Value, field: &str) -> Result<String, ValidationError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ValidationError::missing_field(field))
}

/// Builder for creating test PaymentEvent payloads.
#[cfg(test)]
pub struct PaymentEventBuilder {
    payload: serde_json::Map<String, Value>,
}

#[cfg(test)]
impl Default for PaymentEventBuilder {
    fn default() -> Self {
        let payload = serde_json::json!({
            "event_type": CHARGE_SUCCEEDED,
            "id": "txn_test_123",
            "amount": 49.0,
            "amount_currency": "USD",
            "created_date": "2024-03-15-09-30-00",
            "subscription_id": "msub_abc",
            "customer_details": {
                "email": "jane@example.com",
                "firstName": "Jane",
                "lastName": "Doe",
                "planType": "pro",
                "frequency": "monthly",
                "frequencyInterval": 1
            }
        });
        match payload {
            Value::Object(map) => Self { payload: map },
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
impl PaymentEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: &str, value: Value) -> Self {
        self.payload.insert(field.to_string(), value);
        self
    }

    pub fn remove(mut self, field: &str) -> Self {
        self.payload.remove(field);
        self
    }

    pub fn customer(mut self, field: &str, value: Value) -> Self {
        if let Some(Value::Object(details)) = self.payload.get_mut("customer_details") {
            details.insert(field.to_string(), value);
        }
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.payload)
    }
}
