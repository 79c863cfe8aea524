//! HTTP DTOs (Data Transfer Objects) for billing endpoints.
//!
//! These types define the JSON request/response structure for the billing
//! API. They serve as the boundary between HTTP and the application layer.

use serde::{Deserialize, Serialize};

use crate::application::handlers::billing::{
    subscription_type, CancelSubscriptionResult, IngestPaymentWebhookResult,
};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to cancel a subscription.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelSubscriptionRequest {
    /// Gateway external id of the subscription to cancel.
    pub subscription_id: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for webhook ingestion.
///
/// Every accepted delivery gets `received: true`; ignored deliveries
/// additionally carry `ignored: true` and the reason, so the gateway
/// never retries them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub received: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
}

impl From<IngestPaymentWebhookResult> for WebhookResponse {
    fn from(result: IngestPaymentWebhookResult) -> Self {
        match result {
            IngestPaymentWebhookResult::Pong => Self {
                received: true,
                ignored: Some(true),
                message: Some("pong".to_string()),
                user_id: None,
                payment_id: None,
                subscription_id: None,
            },
            IngestPaymentWebhookResult::Ignored { message } => Self {
                received: true,
                ignored: Some(true),
                message: Some(message),
                user_id: None,
                payment_id: None,
                subscription_id: None,
            },
            IngestPaymentWebhookResult::Provisioned {
                user_id,
                payment_id,
                subscription_id,
            } => Self {
                received: true,
                ignored: None,
                message: None,
                user_id: Some(user_id.to_string()),
                payment_id: Some(payment_id.to_string()),
                subscription_id: Some(subscription_id.to_string()),
            },
        }
    }
}

/// Response for a successful cancellation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelSubscriptionResponse {
    pub message: String,
    /// Gateway external id of the cancelled subscription.
    pub subscription_id: String,
    /// When access ends (ISO 8601); unchanged by the cancellation.
    pub ends_at: String,
    pub status: String,
    pub item_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addon_type: Option<String>,
    /// Product string from the originating charge, when recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<String>,
    /// Whether the mirrored subscription was cancelled at the gateway.
    pub mamopay_cancelled: bool,
}

impl From<CancelSubscriptionResult> for CancelSubscriptionResponse {
    fn from(result: CancelSubscriptionResult) -> Self {
        let subscription = &result.subscription;
        Self {
            message: format!(
                "Subscription cancelled. Access remains active until {}",
                result.ends_at.format_human_date()
            ),
            subscription_id: subscription.external_id.clone(),
            ends_at: result.ends_at.as_datetime().to_rfc3339(),
            status: subscription.status.as_str().to_string(),
            item_type: subscription.item_type.as_str().to_string(),
            addon_type: subscription.addon_type.map(|a| a.as_str().to_string()),
            subscription_type: subscription_type(subscription),
            mamopay_cancelled: result.mamopay_cancelled,
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error_code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error_code: error_code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{PaymentId, SubscriptionId, UserId};

    #[test]
    fn pong_response_has_no_ids() {
        let response = WebhookResponse::from(IngestPaymentWebhookResult::Pong);

        assert!(response.received);
        assert_eq!(response.ignored, Some(true));
        assert_eq!(response.message.as_deref(), Some("pong"));
        assert!(response.user_id.is_none());
    }

    #[test]
    fn ignored_response_carries_reason() {
        let response = WebhookResponse::from(IngestPaymentWebhookResult::Ignored {
            message: "Event type not supported".to_string(),
        });

        assert!(response.received);
        assert_eq!(response.ignored, Some(true));
        assert_eq!(response.message.as_deref(), Some("Event type not supported"));
    }

    #[test]
    fn provisioned_response_serializes_camel_case_ids() {
        let response = WebhookResponse::from(IngestPaymentWebhookResult::Provisioned {
            user_id: UserId::new(),
            payment_id: PaymentId::new(),
            subscription_id: SubscriptionId::new(),
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["received"], true);
        assert!(json.get("userId").is_some());
        assert!(json.get("paymentId").is_some());
        assert!(json.get("subscriptionId").is_some());
        assert!(json.get("ignored").is_none());
    }
}
