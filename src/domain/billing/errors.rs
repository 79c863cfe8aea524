//! Billing-specific error types.
//!
//! Errors for webhook ingestion, account provisioning, and
//! subscription cancellation.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | ValidationFailed | 400 |
//! | EmailAlreadyRegistered | 409 |
//! | SubscriptionNotFound | 404 |
//! | InvalidState | 409 |
//! | Infrastructure | 500 |
//!
//! Duplicate webhook deliveries and external gateway/email failures
//! are deliberately absent: duplicates are acknowledged as ignored
//! responses, and external failures are logged and downgraded to
//! flags, never surfaced as errors.

use crate::domain::foundation::{DomainError, ErrorCode};

/// Billing-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    /// Webhook payload or cancellation request failed validation.
    ValidationFailed {
        field: String,
        message: String,
    },

    /// A user with this email already exists. A fresh payment for a
    /// registered email is a data problem needing operator attention,
    /// not a duplicate to be silently dropped.
    EmailAlreadyRegistered(String),

    /// Subscription was not found by its external id.
    SubscriptionNotFound(String),

    /// Invalid state for the requested operation.
    InvalidState {
        current: String,
        attempted: String,
    },

    /// Infrastructure error.
    Infrastructure(String),
}

impl BillingError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn email_already_registered(email: impl Into<String>) -> Self {
        BillingError::EmailAlreadyRegistered(email.into())
    }

    pub fn subscription_not_found(external_id: impl Into<String>) -> Self {
        BillingError::SubscriptionNotFound(external_id.into())
    }

    pub fn invalid_state(current: impl Into<String>, attempted: impl Into<String>) -> Self {
        BillingError::InvalidState {
            current: current.into(),
            attempted: attempted.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            BillingError::EmailAlreadyRegistered(_) => ErrorCode::EmailAlreadyRegistered,
            BillingError::SubscriptionNotFound(_) => ErrorCode::SubscriptionNotFound,
            BillingError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            BillingError::Infrastructure(_) => ErrorCode::DatabaseError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            BillingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            BillingError::EmailAlreadyRegistered(email) => {
                format!("User with email {} already exists", email)
            }
            BillingError::SubscriptionNotFound(external_id) => {
                format!("Subscription not found: {}", external_id)
            }
            BillingError::InvalidState { current, attempted } => {
                format!("Cannot {} subscription in {} state", attempted, current)
            }
            BillingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }

    /// Returns true if this error should trigger a retry.
    ///
    /// Only infrastructure failures are worth retrying; validation and
    /// business-rule rejections will fail identically on redelivery.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BillingError::Infrastructure(_))
    }
}

impl std::fmt::Display for BillingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BillingError {}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::InvalidFormat => BillingError::ValidationFailed {
                field: "unknown".to_string(),
                message: err.to_string(),
            },
            ErrorCode::EmailAlreadyRegistered => {
                BillingError::EmailAlreadyRegistered(err.to_string())
            }
            ErrorCode::SubscriptionNotFound => {
                BillingError::SubscriptionNotFound(err.to_string())
            }
            ErrorCode::InvalidStateTransition => BillingError::InvalidState {
                current: "unknown".to_string(),
                attempted: err.to_string(),
            },
            _ => BillingError::Infrastructure(err.to_string()),
        }
    }
}

impl From<BillingError> for DomainError {
    fn from(err: BillingError) -> Self {
        DomainError::new(err.code(), err.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================
    // Constructor Tests
    // ============================================================

    #[test]
    fn validation_creates_correctly() {
        let err = BillingError::validation("email", "must not be empty");
        assert!(matches!(
            err,
            BillingError::ValidationFailed { ref field, ref message }
            if field == "email" && message == "must not be empty"
        ));
        assert_eq!(err.code(), ErrorCode::ValidationFailed);
    }

    #[test]
    fn email_already_registered_creates_correctly() {
        let err = BillingError::email_already_registered("jane@example.com");
        assert!(matches!(
            err,
            BillingError::EmailAlreadyRegistered(ref e) if e == "jane@example.com"
        ));
        assert_eq!(err.code(), ErrorCode::EmailAlreadyRegistered);
    }

    #[test]
    fn subscription_not_found_creates_correctly() {
        let err = BillingError::subscription_not_found("msub_missing");
        assert!(matches!(
            err,
            BillingError::SubscriptionNotFound(ref id) if id == "msub_missing"
        ));
        assert_eq!(err.code(), ErrorCode::SubscriptionNotFound);
    }

    #[test]
    fn infrastructure_creates_correctly() {
        let err = BillingError::infrastructure("database connection lost");
        assert!(matches!(
            err,
            BillingError::Infrastructure(ref m) if m == "database connection lost"
        ));
        assert_eq!(err.code(), ErrorCode::DatabaseError);
    }

    // ============================================================
    // Message Tests
    // ============================================================

    #[test]
    fn email_message_names_the_address() {
        let err = BillingError::email_already_registered("jane@example.com");
        assert!(err.message().contains("jane@example.com"));
    }

    #[test]
    fn not_found_message_includes_external_id() {
        let err = BillingError::subscription_not_found("msub_42");
        assert!(err.message().contains("msub_42"));
    }

    // ============================================================
    // Retryable Tests
    // ============================================================

    #[test]
    fn infrastructure_errors_are_retryable() {
        assert!(BillingError::infrastructure("timeout").is_retryable());
    }

    #[test]
    fn business_rule_errors_are_not_retryable() {
        assert!(!BillingError::email_already_registered("a@b.c").is_retryable());
        assert!(!BillingError::validation("amount", "not positive").is_retryable());
    }

    // ============================================================
    // Conversion Tests
    // ============================================================

    #[test]
    fn display_matches_message() {
        let err = BillingError::subscription_not_found("msub_1");
        assert_eq!(format!("{}", err), err.message());
    }

    #[test]
    fn converts_to_domain_error() {
        let err = BillingError::email_already_registered("jane@example.com");
        let domain_err: DomainError = err.clone().into();
        assert_eq!(domain_err.code, err.code());
    }

    #[test]
    fn converts_from_domain_error() {
        let domain_err = DomainError::new(ErrorCode::SubscriptionNotFound, "gone");
        let billing_err: BillingError = domain_err.into();
        assert_eq!(billing_err.code(), ErrorCode::SubscriptionNotFound);
    }
}
