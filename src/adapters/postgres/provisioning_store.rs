//! PostgreSQL implementation of the atomic provisioning store.
//!
//! All rows for a provisioned account land in one transaction. The
//! unique constraints on `payments.transaction_id` and `users.email`
//! are part of the contract: the insert that trips one of them rolls
//! the whole transaction back, and the violation is reported as a
//! [`ProvisionOutcome`] so a racing duplicate delivery resolves
//! cleanly at the database.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{ProvisionOutcome, ProvisionedAccount, ProvisioningStore};

const TRANSACTION_ID_CONSTRAINT: &str = "payments_transaction_id_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

pub struct PostgresProvisioningStore {
    pool: PgPool,
}

impl PostgresProvisioningStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a uniqueness violation to its provisioning outcome, or `None`
/// for any other error.
fn constraint_outcome(error: &sqlx::Error) -> Option<ProvisionOutcome> {
    let db_err = error.as_database_error()?;
    match db_err.constraint() {
        Some(TRANSACTION_ID_CONSTRAINT) => Some(ProvisionOutcome::DuplicateTransaction),
        Some(EMAIL_CONSTRAINT) => Some(ProvisionOutcome::EmailExists),
        _ => None,
    }
}

fn db_error(context: &str, error: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("{}: {}", context, error),
    )
}

async fn insert_user(
    tx: &mut Transaction<'_, Postgres>,
    account: &ProvisionedAccount,
) -> Result<(), sqlx::Error> {
    let user = &account.user;
    sqlx::query(
        r#"
        INSERT INTO users (
            id, email, first_name, last_name, username, password_hash,
            plan, funnels_limit, pages_per_funnel_limit,
            monthly_visitors_limit, custom_domains_limit,
            team_seats_limit, trial_starts_at, trial_ends_at,
            email_verified, verification_token, affiliate_token,
            created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18)
        "#,
    )
    .bind(user.id.as_uuid())
    .bind(&user.email)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(user.plan.as_str())
    .bind(user.limits.funnels as i32)
    .bind(user.limits.pages_per_funnel as i32)
    .bind(user.limits.monthly_visitors as i32)
    .bind(user.limits.custom_domains as i32)
    .bind(user.limits.team_seats as i32)
    .bind(user.trial_starts_at.as_datetime())
    .bind(user.trial_ends_at.as_datetime())
    .bind(user.email_verified)
    .bind(&user.verification_token)
    .bind(&user.affiliate_token)
    .bind(user.created_at.as_datetime())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_payment(
    tx: &mut Transaction<'_, Postgres>,
    account: &ProvisionedAccount,
) -> Result<(), sqlx::Error> {
    let payment = &account.payment;
    sqlx::query(
        r#"
        INSERT INTO payments (
            id, transaction_id, amount, currency, status, item_type,
            user_id, affiliate_token, commission_amount, raw_payload,
            created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(payment.id.as_uuid())
    .bind(&payment.transaction_id)
    .bind(payment.amount)
    .bind(&payment.currency)
    .bind(payment.status.as_str())
    .bind(payment.item_type.as_str())
    .bind(payment.user_id.as_uuid())
    .bind(&payment.affiliate_token)
    .bind(payment.commission_amount)
    .bind(&payment.raw_payload)
    .bind(payment.created_at.as_datetime())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_subscription(
    tx: &mut Transaction<'_, Postgres>,
    account: &ProvisionedAccount,
) -> Result<(), sqlx::Error> {
    let subscription = &account.subscription;
    sqlx::query(
        r#"
        INSERT INTO subscriptions (
            id, external_id, user_id, status, item_type, addon_type,
            interval_unit, interval_count, starts_at, ends_at,
            raw_payload, created_at, cancelled_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(subscription.id.as_uuid())
    .bind(&subscription.external_id)
    .bind(subscription.user_id.as_uuid())
    .bind(subscription.status.as_str())
    .bind(subscription.item_type.as_str())
    .bind(subscription.addon_type.map(|a| a.as_str()))
    .bind(subscription.interval_unit.as_str())
    .bind(subscription.interval_count as i32)
    .bind(subscription.starts_at.as_datetime())
    .bind(subscription.ends_at.as_datetime())
    .bind(&subscription.raw_payload)
    .bind(subscription.created_at.as_datetime())
    .bind(subscription.cancelled_at.as_ref().map(|t| *t.as_datetime()))
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_addon(
    tx: &mut Transaction<'_, Postgres>,
    account: &ProvisionedAccount,
) -> Result<(), sqlx::Error> {
    let Some(addon) = &account.addon else {
        return Ok(());
    };
    sqlx::query(
        r#"
        INSERT INTO addons (
            id, user_id, addon_type, status, billing_cycle, starts_at,
            ends_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(addon.id.as_uuid())
    .bind(addon.user_id.as_uuid())
    .bind(addon.addon_type.as_str())
    .bind(addon.status.as_str())
    .bind(&addon.billing_cycle)
    .bind(addon.starts_at.as_datetime())
    .bind(addon.ends_at.as_datetime())
    .execute(&mut **tx)
    .await?;

    Ok(())
}

#[async_trait]
impl ProvisioningStore for PostgresProvisioningStore {
    async fn create_account(
        &self,
        account: &ProvisionedAccount,
    ) -> Result<ProvisionOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin provisioning transaction", e))?;

        let inserts = async {
            insert_user(&mut tx, account).await?;
            insert_payment(&mut tx, account).await?;
            insert_subscription(&mut tx, account).await?;
            insert_addon(&mut tx, account).await?;
            Ok::<_, sqlx::Error>(())
        };

        if let Err(e) = inserts.await {
            // Rollback happens on drop; a mapped constraint violation
            // is an outcome, anything else is a real failure.
            return match constraint_outcome(&e) {
                Some(outcome) => Ok(outcome),
                None => Err(db_error("Failed to provision account", e)),
            };
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit provisioning transaction", e))?;

        Ok(ProvisionOutcome::Created)
    }
}
