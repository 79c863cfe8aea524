//! IngestPaymentWebhookHandler - Command handler for Mamo Pay webhook deliveries.

use std::sync::Arc;

use serde_json::Value;

use crate::domain::billing::credentials::{
    generate_readable_password, generate_username, hash_password,
};
use crate::domain::billing::interval::resolve_end_date;
use crate::domain::billing::verification::issue_verification_token;
use crate::domain::billing::{
    AddOn, BillingError, IntervalUnit, ItemType, Payment, PaymentEvent, Subscription, User,
    CHARGE_SUCCEEDED,
};
use crate::domain::foundation::{PaymentId, SubscriptionId, UserId};
use crate::ports::{
    AffiliateLinkRepository, EmailSender, PaymentRepository, ProvisionOutcome, ProvisionedAccount,
    ProvisioningStore, UserRepository,
};

use super::emails;

/// Command to ingest a raw webhook delivery.
#[derive(Debug, Clone)]
pub struct IngestPaymentWebhookCommand {
    /// Decoded request body, untouched.
    pub payload: Value,
}

/// Result of webhook ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestPaymentWebhookResult {
    /// Health-check probe answered without touching the store.
    Pong,
    /// Delivery acknowledged but not processed.
    Ignored { message: String },
    /// A new account was provisioned from the charge.
    Provisioned {
        user_id: UserId,
        payment_id: PaymentId,
        subscription_id: SubscriptionId,
    },
}

/// Handler for ingesting payment webhooks.
///
/// Validates and deduplicates the delivery, then provisions the user,
/// payment, subscription, and optional add-on in one transaction.
/// Affiliate attribution and email run after the commit and are
/// best-effort: their failure is logged, never surfaced.
pub struct IngestPaymentWebhookHandler {
    users: Arc<dyn UserRepository>,
    payments: Arc<dyn PaymentRepository>,
    affiliate_links: Arc<dyn AffiliateLinkRepository>,
    store: Arc<dyn ProvisioningStore>,
    email: Arc<dyn EmailSender>,
    verification_secret: String,
}

impl IngestPaymentWebhookHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        payments: Arc<dyn PaymentRepository>,
        affiliate_links: Arc<dyn AffiliateLinkRepository>,
        store: Arc<dyn ProvisioningStore>,
        email: Arc<dyn EmailSender>,
        verification_secret: String,
    ) -> Self {
        Self {
            users,
            payments,
            affiliate_links,
            store,
            email,
            verification_secret,
        }
    }

    pub async fn handle(
        &self,
        cmd: IngestPaymentWebhookCommand,
    ) -> Result<IngestPaymentWebhookResult, BillingError> {
        // 1. Health-check short-circuit, before any store access
        if cmd.payload.as_str() == Some("ping") {
            return Ok(IngestPaymentWebhookResult::Pong);
        }

        if !cmd.payload.is_object() {
            return Err(BillingError::validation(
                "payload",
                "Webhook payload must be a JSON object",
            ));
        }

        // 2. Filter by event type; everything but a successful charge
        //    is acknowledged and dropped
        let event_type = cmd
            .payload
            .get("event_type")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if event_type != CHARGE_SUCCEEDED {
            tracing::debug!(event_type, "Ignoring unsupported webhook event type");
            return Ok(IngestPaymentWebhookResult::Ignored {
                message: "Event type not supported".to_string(),
            });
        }

        // 3. Validate the payload shape
        let event = PaymentEvent::from_value(&cmd.payload)
            .map_err(|e| BillingError::validation(e.field(), e.to_string()))?;

        // 4. Dedup gate: the transaction id is the idempotency key
        if self
            .payments
            .find_by_transaction_id(&event.transaction_id)
            .await?
            .is_some()
        {
            tracing::info!(
                transaction_id = %event.transaction_id,
                "Duplicate webhook delivery, already processed"
            );
            return Ok(IngestPaymentWebhookResult::Ignored {
                message: "Payment already processed".to_string(),
            });
        }

        // 5. A fresh charge for a registered email is a data problem,
        //    not a duplicate
        if self
            .users
            .find_by_email(&event.customer.email)
            .await?
            .is_some()
        {
            return Err(BillingError::email_already_registered(
                event.customer.email.clone(),
            ));
        }

        // 6. Build the account
        let (account, temporary_password, verification_token) =
            self.build_account(&event, &cmd.payload).await?;

        // 7. One transaction: user + payment + subscription [+ add-on]
        match self.store.create_account(&account).await? {
            ProvisionOutcome::Created => {}
            ProvisionOutcome::DuplicateTransaction => {
                // Lost the race against a concurrent duplicate
                // delivery; the unique constraint is the backstop for
                // the dedup read above.
                tracing::info!(
                    transaction_id = %event.transaction_id,
                    "Concurrent duplicate delivery hit the transaction id constraint"
                );
                return Ok(IngestPaymentWebhookResult::Ignored {
                    message: "Payment already processed".to_string(),
                });
            }
            ProvisionOutcome::EmailExists => {
                return Err(BillingError::email_already_registered(
                    event.customer.email.clone(),
                ));
            }
        }

        tracing::info!(
            user_id = %account.user.id,
            transaction_id = %event.transaction_id,
            plan = %account.user.plan,
            "Provisioned account from charge"
        );

        // 8. Post-commit, best-effort side effects
        self.attribute_commission(&event).await;
        self.send_welcome_email(&account.user, &temporary_password, &verification_token)
            .await;

        Ok(IngestPaymentWebhookResult::Provisioned {
            user_id: account.user.id,
            payment_id: account.payment.id,
            subscription_id: account.subscription.id,
        })
    }

    /// Builds every row the provisioning transaction will insert, plus
    /// the plaintext password and token needed for the welcome email.
    async fn build_account(
        &self,
        event: &PaymentEvent,
        raw_payload: &Value,
    ) -> Result<(ProvisionedAccount, String, String), BillingError> {
        let customer = &event.customer;

        let username = generate_username(
            self.users.as_ref(),
            &customer.first_name,
            &customer.last_name,
            &customer.email,
        )
        .await?;
        let temporary_password = generate_readable_password();
        let password_hash = hash_password(&temporary_password)?;

        let starts_at = event.created_at;
        let ends_at = resolve_end_date(starts_at, &customer.frequency, customer.frequency_interval);
        let interval_unit = IntervalUnit::from_frequency(&customer.frequency);

        let affiliate_token = customer.affiliate_link.as_ref().map(|l| l.token.clone());
        let commission = customer
            .affiliate_link
            .as_ref()
            .map(|l| l.affiliate_amount)
            .unwrap_or(0.0);

        let user = User::provision(
            customer.email.clone(),
            customer.first_name.clone(),
            customer.last_name.clone(),
            username,
            password_hash.clone(),
            customer.product.plan(),
            starts_at,
            ends_at,
            affiliate_token.clone(),
        );
        let verification_token =
            issue_verification_token(&self.verification_secret, &user.id, &password_hash)?;
        let user = user.with_verification_token(verification_token.clone());

        let (item_type, addon_type) = match customer.product.addon() {
            Some(addon) => (ItemType::Addon, Some(addon)),
            None => (ItemType::Plan, None),
        };

        let payment = Payment::capture(
            event.transaction_id.clone(),
            event.amount,
            event.currency.clone(),
            item_type,
            user.id,
            affiliate_token,
            commission,
            raw_payload.clone(),
        );

        let subscription = Subscription::create(
            event.subscription_id.clone(),
            user.id,
            item_type,
            addon_type,
            interval_unit,
            customer.frequency_interval,
            starts_at,
            ends_at,
            raw_payload.clone(),
        );

        let addon = addon_type.map(|addon| {
            AddOn::create(
                user.id,
                addon,
                customer.frequency.clone(),
                starts_at,
                ends_at,
            )
        });

        Ok((
            ProvisionedAccount {
                user,
                payment,
                subscription,
                addon,
            },
            temporary_password,
            verification_token,
        ))
    }

    /// Credits the affiliate link named on the event and notifies its
    /// owner. Unknown tokens and all failures are logged and swallowed.
    async fn attribute_commission(&self, event: &PaymentEvent) {
        let Some(link_ref) = &event.customer.affiliate_link else {
            return;
        };

        let link = match self.affiliate_links.find_by_token(&link_ref.token).await {
            Ok(Some(link)) => link,
            Ok(None) => {
                tracing::warn!(token = %link_ref.token, "Unknown affiliate token on charge, skipping attribution");
                return;
            }
            Err(err) => {
                tracing::warn!(token = %link_ref.token, error = %err, "Affiliate lookup failed, skipping attribution");
                return;
            }
        };

        if let Err(err) = self
            .affiliate_links
            .add_commission(&link.token, link_ref.affiliate_amount)
            .await
        {
            tracing::warn!(token = %link.token, error = %err, "Failed to credit affiliate commission");
            return;
        }

        tracing::info!(
            token = %link.token,
            amount = link_ref.affiliate_amount,
            "Credited affiliate commission"
        );

        match self.users.find_by_id(&link.user_id).await {
            Ok(Some(owner)) => {
                let message = emails::affiliate_commission_email(
                    &owner.email,
                    link_ref.affiliate_amount,
                    &event.currency,
                );
                if let Err(err) = self.email.send(&message).await {
                    tracing::warn!(token = %link.token, error = %err, "Failed to send affiliate commission email");
                }
            }
            Ok(None) => {
                tracing::warn!(token = %link.token, "Affiliate link owner no longer exists");
            }
            Err(err) => {
                tracing::warn!(token = %link.token, error = %err, "Failed to load affiliate link owner");
            }
        }
    }

    async fn send_welcome_email(&self, user: &User, password: &str, token: &str) {
        let message = emails::welcome_email(user, password, token);
        if let Err(err) = self.email.send(&message).await {
            tracing::warn!(user_id = %user.id, error = %err, "Failed to send welcome email");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use crate::domain::billing::payment_event::PaymentEventBuilder;
    use crate::domain::billing::{AffiliateLink, PlanType, SubscriptionStatus};
    use crate::domain::foundation::{
        AffiliateLinkId, DomainError, ErrorCode, Timestamp, UserId,
    };
    use crate::ports::EmailMessage;

    const SECRET: &str = "test-verification-secret";

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct MockUserRepository {
        users: Mutex<Vec<User>>,
        calls: AtomicUsize,
    }

    impl MockUserRepository {
        fn new() -> Self {
            Self {
                users: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn with_user(user: User) -> Self {
            Self {
                users: Mutex::new(vec![user]),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| &u.id == id)
                .cloned())
        }

        async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .any(|u| u.username == username))
        }
    }

    struct MockPaymentRepository {
        payments: Mutex<Vec<Payment>>,
        calls: AtomicUsize,
    }

    impl MockPaymentRepository {
        fn new() -> Self {
            Self {
                payments: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn with_payment(payment: Payment) -> Self {
            Self {
                payments: Mutex::new(vec![payment]),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PaymentRepository for MockPaymentRepository {
        async fn find_by_transaction_id(
            &self,
            transaction_id: &str,
        ) -> Result<Option<Payment>, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .payments
                .lock()
                .unwrap()
                .iter()
                .find(|p| p.transaction_id == transaction_id)
                .cloned())
        }
    }

    struct MockAffiliateLinkRepository {
        links: Mutex<Vec<AffiliateLink>>,
        fail_add: bool,
    }

    impl MockAffiliateLinkRepository {
        fn new() -> Self {
            Self {
                links: Mutex::new(Vec::new()),
                fail_add: false,
            }
        }

        fn with_link(link: AffiliateLink) -> Self {
            Self {
                links: Mutex::new(vec![link]),
                fail_add: false,
            }
        }

        fn failing_add(link: AffiliateLink) -> Self {
            Self {
                links: Mutex::new(vec![link]),
                fail_add: true,
            }
        }

        fn total_for(&self, token: &str) -> Option<f64> {
            self.links
                .lock()
                .unwrap()
                .iter()
                .find(|l| l.token == token)
                .map(|l| l.total_commission)
        }
    }

    #[async_trait]
    impl AffiliateLinkRepository for MockAffiliateLinkRepository {
        async fn find_by_token(&self, token: &str) -> Result<Option<AffiliateLink>, DomainError> {
            Ok(self
                .links
                .lock()
                .unwrap()
                .iter()
                .find(|l| l.token == token)
                .cloned())
        }

        async fn add_commission(&self, token: &str, amount: f64) -> Result<(), DomainError> {
            if self.fail_add {
                return Err(DomainError::new(
                    ErrorCode::DatabaseError,
                    "Simulated increment failure",
                ));
            }
            let mut links = self.links.lock().unwrap();
            if let Some(link) = links.iter_mut().find(|l| l.token == token) {
                link.credit_commission(amount);
            }
            Ok(())
        }
    }

    struct MockProvisioningStore {
        accounts: Mutex<Vec<ProvisionedAccount>>,
        outcome: ProvisionOutcome,
    }

    impl MockProvisioningStore {
        fn new() -> Self {
            Self {
                accounts: Mutex::new(Vec::new()),
                outcome: ProvisionOutcome::Created,
            }
        }

        fn with_outcome(outcome: ProvisionOutcome) -> Self {
            Self {
                accounts: Mutex::new(Vec::new()),
                outcome,
            }
        }

        fn created_accounts(&self) -> Vec<ProvisionedAccount> {
            self.accounts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ProvisioningStore for MockProvisioningStore {
        async fn create_account(
            &self,
            account: &ProvisionedAccount,
        ) -> Result<ProvisionOutcome, DomainError> {
            if self.outcome == ProvisionOutcome::Created {
                self.accounts.lock().unwrap().push(account.clone());
            }
            Ok(self.outcome)
        }
    }

    struct MockEmailSender {
        sent: Mutex<Vec<EmailMessage>>,
        fail_send: bool,
    }

    impl MockEmailSender {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_send: false,
            }
        }

        fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_send: true,
            }
        }

        fn sent_messages(&self) -> Vec<EmailMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EmailSender for MockEmailSender {
        async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
            if self.fail_send {
                return Err(DomainError::new(
                    ErrorCode::EmailProviderError,
                    "Simulated send failure",
                ));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        users: Arc<MockUserRepository>,
        payments: Arc<MockPaymentRepository>,
        affiliate_links: Arc<MockAffiliateLinkRepository>,
        store: Arc<MockProvisioningStore>,
        email: Arc<MockEmailSender>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                users: Arc::new(MockUserRepository::new()),
                payments: Arc::new(MockPaymentRepository::new()),
                affiliate_links: Arc::new(MockAffiliateLinkRepository::new()),
                store: Arc::new(MockProvisioningStore::new()),
                email: Arc::new(MockEmailSender::new()),
            }
        }

        fn handler(&self) -> IngestPaymentWebhookHandler {
            IngestPaymentWebhookHandler::new(
                self.users.clone(),
                self.payments.clone(),
                self.affiliate_links.clone(),
                self.store.clone(),
                self.email.clone(),
                SECRET.to_string(),
            )
        }
    }

    fn command(payload: Value) -> IngestPaymentWebhookCommand {
        IngestPaymentWebhookCommand { payload }
    }

    fn existing_user(email: &str) -> User {
        let now = Timestamp::now();
        User::provision(
            email.to_string(),
            "Existing".to_string(),
            "User".to_string(),
            "existinguser".to_string(),
            "$argon2id$stub".to_string(),
            PlanType::Basic,
            now,
            now.add_months(1),
            None,
        )
    }

    fn affiliate_link(token: &str, owner: UserId) -> AffiliateLink {
        AffiliateLink {
            id: AffiliateLinkId::new(),
            token: token.to_string(),
            user_id: owner,
            total_commission: 0.0,
            created_at: Timestamp::now(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Short-Circuit Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn ping_returns_pong_without_store_access() {
        let fixture = Fixture::new();
        let handler = fixture.handler();

        let result = handler.handle(command(json!("ping"))).await.unwrap();

        assert_eq!(result, IngestPaymentWebhookResult::Pong);
        assert_eq!(fixture.users.call_count(), 0);
        assert_eq!(fixture.payments.call_count(), 0);
        assert!(fixture.store.created_accounts().is_empty());
    }

    #[tokio::test]
    async fn non_object_payload_is_rejected() {
        let fixture = Fixture::new();
        let handler = fixture.handler();

        let result = handler.handle(command(json!([1, 2, 3]))).await;

        assert!(matches!(
            result,
            Err(BillingError::ValidationFailed { .. })
        ));
    }

    #[tokio::test]
    async fn unsupported_event_type_is_acknowledged_without_records() {
        let fixture = Fixture::new();
        let handler = fixture.handler();

        let payload = PaymentEventBuilder::new()
            .set("event_type", json!("charge.refunded"))
            .build();
        let result = handler.handle(command(payload)).await.unwrap();

        assert_eq!(
            result,
            IngestPaymentWebhookResult::Ignored {
                message: "Event type not supported".to_string()
            }
        );
        assert!(fixture.store.created_accounts().is_empty());
        assert!(fixture.email.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn malformed_payload_surfaces_first_violated_field() {
        let fixture = Fixture::new();
        let handler = fixture.handler();

        let payload = PaymentEventBuilder::new().remove("id").build();
        let result = handler.handle(command(payload)).await;

        match result {
            Err(BillingError::ValidationFailed { field, .. }) => assert_eq!(field, "id"),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Idempotency Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn duplicate_transaction_is_ignored_without_side_effects() {
        let fixture = Fixture::new();
        let existing = Payment::capture(
            "txn_test_123".to_string(),
            49.0,
            "USD".to_string(),
            ItemType::Plan,
            UserId::new(),
            None,
            0.0,
            json!({}),
        );
        let fixture = Fixture {
            payments: Arc::new(MockPaymentRepository::with_payment(existing)),
            ..fixture
        };
        let handler = fixture.handler();

        let result = handler
            .handle(command(PaymentEventBuilder::new().build()))
            .await
            .unwrap();

        assert_eq!(
            result,
            IngestPaymentWebhookResult::Ignored {
                message: "Payment already processed".to_string()
            }
        );
        assert!(fixture.store.created_accounts().is_empty());
        assert!(fixture.email.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn constraint_race_loser_is_also_ignored() {
        // The dedup read passes but the insert hits the unique
        // constraint: a concurrent delivery won the race.
        let fixture = Fixture {
            store: Arc::new(MockProvisioningStore::with_outcome(
                ProvisionOutcome::DuplicateTransaction,
            )),
            ..Fixture::new()
        };
        let handler = fixture.handler();

        let result = handler
            .handle(command(PaymentEventBuilder::new().build()))
            .await
            .unwrap();

        assert_eq!(
            result,
            IngestPaymentWebhookResult::Ignored {
                message: "Payment already processed".to_string()
            }
        );
        assert!(fixture.email.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_fails_with_business_rule_violation() {
        let fixture = Fixture {
            users: Arc::new(MockUserRepository::with_user(existing_user(
                "jane@example.com",
            ))),
            ..Fixture::new()
        };
        let handler = fixture.handler();

        let result = handler
            .handle(command(PaymentEventBuilder::new().build()))
            .await;

        assert!(matches!(
            result,
            Err(BillingError::EmailAlreadyRegistered(ref email)) if email == "jane@example.com"
        ));
        assert!(fixture.store.created_accounts().is_empty());
        assert!(fixture.email.sent_messages().is_empty());
    }

    #[tokio::test]
    async fn email_constraint_race_surfaces_business_rule_violation() {
        let fixture = Fixture {
            store: Arc::new(MockProvisioningStore::with_outcome(
                ProvisionOutcome::EmailExists,
            )),
            ..Fixture::new()
        };
        let handler = fixture.handler();

        let result = handler
            .handle(command(PaymentEventBuilder::new().build()))
            .await;

        assert!(matches!(result, Err(BillingError::EmailAlreadyRegistered(_))));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Provisioning Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn successful_charge_provisions_account() {
        let fixture = Fixture::new();
        let handler = fixture.handler();

        let result = handler
            .handle(command(PaymentEventBuilder::new().build()))
            .await
            .unwrap();

        assert!(matches!(
            result,
            IngestPaymentWebhookResult::Provisioned { .. }
        ));

        let accounts = fixture.store.created_accounts();
        assert_eq!(accounts.len(), 1);
        let account = &accounts[0];

        assert_eq!(account.user.email, "jane@example.com");
        assert_eq!(account.user.plan, PlanType::Pro);
        assert!(!account.user.email_verified);
        assert!(account.user.verification_token.is_some());
        assert_eq!(account.payment.transaction_id, "txn_test_123");
        assert_eq!(account.subscription.external_id, "msub_abc");
        assert_eq!(account.subscription.status, SubscriptionStatus::Active);
        assert!(account.addon.is_none());
    }

    #[tokio::test]
    async fn subscription_period_follows_billing_frequency() {
        let fixture = Fixture::new();
        let handler = fixture.handler();

        let payload = PaymentEventBuilder::new()
            .customer("frequency", json!("weekly"))
            .customer("frequencyInterval", json!(2))
            .build();
        handler.handle(command(payload)).await.unwrap();

        let account = &fixture.store.created_accounts()[0];
        let expected_end = account.subscription.starts_at.add_days(14);
        assert_eq!(account.subscription.ends_at, expected_end);
        assert_eq!(account.subscription.interval_unit, IntervalUnit::Week);
        assert_eq!(account.subscription.interval_count, 2);
    }

    #[tokio::test]
    async fn addon_purchase_creates_addon_row() {
        let fixture = Fixture::new();
        let handler = fixture.handler();

        let payload = PaymentEventBuilder::new()
            .customer("planType", json!("custom_domain"))
            .build();
        handler.handle(command(payload)).await.unwrap();

        let account = &fixture.store.created_accounts()[0];
        assert_eq!(account.subscription.item_type, ItemType::Addon);
        let addon = account.addon.as_ref().unwrap();
        assert_eq!(addon.user_id, account.user.id);
        assert_eq!(addon.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn null_subscription_id_gets_synthetic_external_id() {
        let fixture = Fixture::new();
        let handler = fixture.handler();

        let payload = PaymentEventBuilder::new()
            .set("subscription_id", Value::Null)
            .build();
        handler.handle(command(payload)).await.unwrap();

        let account = &fixture.store.created_accounts()[0];
        assert_eq!(account.subscription.external_id, "SUB_txn_test_123");
    }

    #[tokio::test]
    async fn welcome_email_is_sent_after_commit() {
        let fixture = Fixture::new();
        let handler = fixture.handler();

        handler
            .handle(command(PaymentEventBuilder::new().build()))
            .await
            .unwrap();

        let sent = fixture.email.sent_messages();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "jane@example.com");
        assert!(sent[0].subject.contains("Welcome"));
    }

    #[tokio::test]
    async fn email_failure_does_not_fail_provisioning() {
        let fixture = Fixture {
            email: Arc::new(MockEmailSender::failing()),
            ..Fixture::new()
        };
        let handler = fixture.handler();

        let result = handler
            .handle(command(PaymentEventBuilder::new().build()))
            .await;

        assert!(matches!(
            result,
            Ok(IngestPaymentWebhookResult::Provisioned { .. })
        ));
        assert_eq!(fixture.store.created_accounts().len(), 1);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Affiliate Attribution Tests
    // ════════════════════════════════════════════════════════════════════════════

    fn payload_with_affiliate() -> Value {
        PaymentEventBuilder::new()
            .customer(
                "affiliate_link",
                json!({"id": "aff_1", "token": "tok_partner", "affiliateAmount": 9.8}),
            )
            .build()
    }

    #[tokio::test]
    async fn affiliate_commission_is_credited_and_owner_notified() {
        let owner = existing_user("partner@example.com");
        let owner_id = owner.id;
        let fixture = Fixture {
            users: Arc::new(MockUserRepository::with_user(owner)),
            affiliate_links: Arc::new(MockAffiliateLinkRepository::with_link(affiliate_link(
                "tok_partner",
                owner_id,
            ))),
            ..Fixture::new()
        };
        let handler = fixture.handler();

        // The new signup uses a different email than the link owner.
        let payload = PaymentEventBuilder::new()
            .customer("email", json!("newcustomer@example.com"))
            .customer(
                "affiliate_link",
                json!({"id": "aff_1", "token": "tok_partner", "affiliateAmount": 9.8}),
            )
            .build();
        handler.handle(command(payload)).await.unwrap();

        assert_eq!(fixture.affiliate_links.total_for("tok_partner"), Some(9.8));

        let sent = fixture.email.sent_messages();
        assert!(sent.iter().any(|m| m.to == "partner@example.com"));
    }

    #[tokio::test]
    async fn unknown_affiliate_token_is_silently_skipped() {
        let fixture = Fixture::new();
        let handler = fixture.handler();

        let result = handler.handle(command(payload_with_affiliate())).await;

        assert!(matches!(
            result,
            Ok(IngestPaymentWebhookResult::Provisioned { .. })
        ));
        assert_eq!(fixture.store.created_accounts().len(), 1);
    }

    #[tokio::test]
    async fn affiliate_increment_failure_does_not_fail_provisioning() {
        let fixture = Fixture {
            affiliate_links: Arc::new(MockAffiliateLinkRepository::failing_add(affiliate_link(
                "tok_partner",
                UserId::new(),
            ))),
            ..Fixture::new()
        };
        let handler = fixture.handler();

        let result = handler.handle(command(payload_with_affiliate())).await;

        assert!(matches!(
            result,
            Ok(IngestPaymentWebhookResult::Provisioned { .. })
        ));
    }

    #[tokio::test]
    async fn payment_records_commission_from_event() {
        let fixture = Fixture::new();
        let handler = fixture.handler();

        handler
            .handle(command(payload_with_affiliate()))
            .await
            .unwrap();

        let account = &fixture.store.created_accounts()[0];
        assert_eq!(account.payment.affiliate_token.as_deref(), Some("tok_partner"));
        assert_eq!(account.payment.commission_amount, 9.8);
        assert_eq!(account.user.affiliate_token.as_deref(), Some("tok_partner"));
    }
}
