//! CancelSubscriptionHandler - Command handler for cancelling subscriptions.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::billing::{BillingError, Subscription};
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::{EmailSender, PaymentGateway, SubscriptionRepository, UserRepository};

use super::emails;

/// Command to cancel a subscription.
///
/// Ownership and active-status checks happen at the HTTP layer before
/// this command is built.
#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    /// Gateway external id of the subscription to cancel.
    pub external_id: String,
    /// User requesting the cancellation.
    pub user_id: UserId,
}

/// Result of a successful cancellation.
#[derive(Debug, Clone)]
pub struct CancelSubscriptionResult {
    pub subscription: Subscription,
    /// When access ends; unchanged by the cancellation.
    pub ends_at: Timestamp,
    /// Whether the mirrored subscription was cancelled at the gateway.
    /// False means the gateway call failed and was logged; local state
    /// is authoritative either way.
    pub mamopay_cancelled: bool,
}

/// Handler for cancelling subscriptions.
///
/// Local cancellation (including the add-on cascade) happens first, in
/// one transaction. The gateway sync and the confirmation email run
/// after and are best-effort: their failure is logged and reported at
/// most as a flag, never as an error.
pub struct CancelSubscriptionHandler {
    subscriptions: Arc<dyn SubscriptionRepository>,
    users: Arc<dyn UserRepository>,
    gateway: Arc<dyn PaymentGateway>,
    email: Arc<dyn EmailSender>,
}

impl CancelSubscriptionHandler {
    pub fn new(
        subscriptions: Arc<dyn SubscriptionRepository>,
        users: Arc<dyn UserRepository>,
        gateway: Arc<dyn PaymentGateway>,
        email: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            subscriptions,
            users,
            gateway,
            email,
        }
    }

    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, BillingError> {
        // 1. Find the subscription
        let mut subscription = self
            .subscriptions
            .find_by_external_id(&cmd.external_id)
            .await?
            .ok_or_else(|| BillingError::subscription_not_found(cmd.external_id.clone()))?;

        let ends_at = subscription.ends_at;

        // 2. Cancel (domain logic; ends_at is untouched)
        subscription.cancel().map_err(|e| {
            BillingError::invalid_state(format!("{:?}", subscription.status), e.to_string())
        })?;

        // 3. Persist; the repository cascades add-ons in the same
        //    transaction when this is an add-on subscription
        self.subscriptions.save_cancellation(&subscription).await?;

        tracing::info!(
            external_id = %subscription.external_id,
            user_id = %cmd.user_id,
            ends_at = %ends_at,
            "Cancelled subscription"
        );

        // 4. Best-effort gateway sync
        let mamopay_cancelled = match self
            .gateway
            .cancel_subscription(&subscription.external_id)
            .await
        {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    external_id = %subscription.external_id,
                    error = %err,
                    "Gateway cancellation failed, local state is authoritative"
                );
                false
            }
        };

        // 5. Best-effort confirmation email
        self.send_cancellation_email(&subscription, ends_at).await;

        Ok(CancelSubscriptionResult {
            subscription,
            ends_at,
            mamopay_cancelled,
        })
    }

    async fn send_cancellation_email(&self, subscription: &Subscription, ends_at: Timestamp) {
        let user = match self.users.find_by_id(&subscription.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::warn!(
                    user_id = %subscription.user_id,
                    "Subscription owner not found, skipping cancellation email"
                );
                return;
            }
            Err(err) => {
                tracing::warn!(
                    user_id = %subscription.user_id,
                    error = %err,
                    "Failed to load subscription owner, skipping cancellation email"
                );
                return;
            }
        };

        let message = emails::cancellation_email(&user.email, &user.display_name(), ends_at);
        if let Err(err) = self.email.send(&message).await {
            tracing::warn!(
                user_id = %user.id,
                error = %err,
                "Failed to send cancellation email"
            );
        }
    }
}

/// Plan name recorded on the subscription's original payload, used in
/// the cancellation response.
pub fn subscription_type(subscription: &Subscription) -> Option<String> {
    subscription
        .raw_payload
        .get("customer_details")
        .and_then(|d| d.get("planType"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
