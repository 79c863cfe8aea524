//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to application layer command handlers.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::handlers::billing::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, IngestPaymentWebhookCommand,
    IngestPaymentWebhookHandler,
};
use crate::domain::billing::BillingError;
use crate::domain::foundation::UserId;
use crate::ports::{
    AffiliateLinkRepository, EmailSender, PaymentGateway, PaymentRepository, ProvisioningStore,
    SubscriptionRepository, UserRepository,
};

use super::dto::{CancelSubscriptionRequest, CancelSubscriptionResponse, ErrorResponse, WebhookResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies.
///
/// This struct is cloned for each request and contains Arc-wrapped
/// dependencies for efficient sharing across handlers.
#[derive(Clone)]
pub struct BillingAppState {
    pub users: Arc<dyn UserRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub affiliate_links: Arc<dyn AffiliateLinkRepository>,
    pub store: Arc<dyn ProvisioningStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub email: Arc<dyn EmailSender>,
    pub verification_secret: String,
}

impl BillingAppState {
    /// Create handlers on demand from the shared state.
    pub fn webhook_handler(&self) -> IngestPaymentWebhookHandler {
        IngestPaymentWebhookHandler::new(
            self.users.clone(),
            self.payments.clone(),
            self.affiliate_links.clone(),
            self.store.clone(),
            self.email.clone(),
            self.verification_secret.clone(),
        )
    }

    pub fn cancel_handler(&self) -> CancelSubscriptionHandler {
        CancelSubscriptionHandler::new(
            self.subscriptions.clone(),
            self.users.clone(),
            self.gateway.clone(),
            self.email.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// User Context (would come from auth middleware in production)
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user context extracted from request.
///
/// In production, this would be extracted from JWT/session by auth middleware.
/// For now, uses a header-based extraction for development/testing.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// Rejection type for AuthenticatedUser extraction.
pub struct AuthenticationRequired;

impl IntoResponse for AuthenticationRequired {
    fn into_response(self) -> axum::response::Response {
        let error = ErrorResponse::new("AUTHENTICATION_REQUIRED", "Authentication is required");
        (StatusCode::UNAUTHORIZED, Json(error)).into_response()
    }
}

impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthenticationRequired;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            // In production, this would validate JWT token from Authorization header
            // For development, we accept an X-User-Id header
            let user_id = parts
                .headers
                .get("X-User-Id")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<UserId>().ok())
                .ok_or(AuthenticationRequired)?;

            Ok(AuthenticatedUser { user_id })
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Endpoint Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/mamopay - Ingest a payment webhook
///
/// Accepts the raw JSON body, including the bare `"ping"` probe. All
/// dedup and validation outcomes short of a real error return 200 so
/// the gateway stops redelivering.
pub async fn handle_payment_webhook(
    State(state): State<BillingAppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.webhook_handler();
    let cmd = IngestPaymentWebhookCommand { payload };

    let result = handler.handle(cmd).await?;

    Ok(Json(WebhookResponse::from(result)))
}

/// POST /api/billing/cancel - Cancel a subscription
pub async fn cancel_subscription(
    State(state): State<BillingAppState>,
    user: AuthenticatedUser,
    Json(request): Json<CancelSubscriptionRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.cancel_handler();
    let cmd = CancelSubscriptionCommand {
        external_id: request.subscription_id,
        user_id: user.user_id,
    };

    let result = handler.handle(cmd).await?;

    Ok(Json(CancelSubscriptionResponse::from(result)))
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Mapping
// ════════════════════════════════════════════════════════════════════════════════

/// Wrapper to implement IntoResponse for billing errors.
pub struct BillingApiError(BillingError);

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            BillingError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            BillingError::EmailAlreadyRegistered(_) => StatusCode::CONFLICT,
            BillingError::SubscriptionNotFound(_) => StatusCode::NOT_FOUND,
            BillingError::InvalidState { .. } => StatusCode::CONFLICT,
            BillingError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse::new(self.0.code().to_string(), self.0.message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_email_maps_to_conflict() {
        let error =
            BillingApiError::from(BillingError::email_already_registered("jane@example.com"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn missing_subscription_maps_to_not_found() {
        let error = BillingApiError::from(BillingError::subscription_not_found("msub_gone"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn infrastructure_maps_to_internal_error() {
        let error = BillingApiError::from(BillingError::infrastructure("pool exhausted"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
