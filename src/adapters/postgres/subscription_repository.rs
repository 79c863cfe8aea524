//! PostgreSQL implementation of the subscription repository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::billing::Subscription;
use crate::domain::foundation::{DomainError, ErrorCode, SubscriptionId, Timestamp, UserId};
use crate::ports::SubscriptionRepository;

use super::convert::{
    parse_addon_type, parse_interval_unit, parse_item_type, parse_subscription_status,
};

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: uuid::Uuid,
    external_id: String,
    user_id: uuid::Uuid,
    status: String,
    item_type: String,
    addon_type: Option<String>,
    interval_unit: String,
    interval_count: i32,
    starts_at: chrono::DateTime<chrono::Utc>,
    ends_at: chrono::DateTime<chrono::Utc>,
    raw_payload: serde_json::Value,
    created_at: chrono::DateTime<chrono::Utc>,
    cancelled_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(Subscription {
            id: SubscriptionId::from_uuid(row.id),
            external_id: row.external_id,
            user_id: UserId::from_uuid(row.user_id),
            status: parse_subscription_status(&row.status)?,
            item_type: parse_item_type(&row.item_type)?,
            addon_type: row.addon_type.as_deref().map(parse_addon_type).transpose()?,
            interval_unit: parse_interval_unit(&row.interval_unit)?,
            interval_count: row.interval_count as u32,
            starts_at: Timestamp::from_datetime(row.starts_at),
            ends_at: Timestamp::from_datetime(row.ends_at),
            raw_payload: row.raw_payload,
            created_at: Timestamp::from_datetime(row.created_at),
            cancelled_at: row.cancelled_at.map(Timestamp::from_datetime),
        })
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn find_by_external_id(
        &self,
        external_id: &str,
    ) -> Result<Option<Subscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, external_id, user_id, status, item_type, addon_type,
                   interval_unit, interval_count, starts_at, ends_at,
                   raw_payload, created_at, cancelled_at
            FROM subscriptions
            WHERE external_id = $1
            "#,
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to query subscription: {}", e),
            )
        })?;

        row.map(Subscription::try_from).transpose()
    }

    async fn save_cancellation(&self, subscription: &Subscription) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to begin transaction: {}", e),
            )
        })?;

        // Status and cancellation timestamp only; the end date column
        // is deliberately absent from the update.
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET status = $1, cancelled_at = $2
            WHERE id = $3
            "#,
        )
        .bind(subscription.status.as_str())
        .bind(
            subscription
                .cancelled_at
                .as_ref()
                .map(|t| *t.as_datetime()),
        )
        .bind(subscription.id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update subscription: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription not found: {}", subscription.external_id),
            ));
        }

        // Cancelling an add-on subscription retires the owner's active
        // add-ons of that type in the same transaction.
        if let Some(addon_type) = subscription.addon_type {
            sqlx::query(
                r#"
                UPDATE addons
                SET status = 'cancelled'
                WHERE user_id = $1 AND addon_type = $2 AND status = 'active'
                "#,
            )
            .bind(subscription.user_id.as_uuid())
            .bind(addon_type.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to cascade add-on cancellation: {}", e),
                )
            })?;
        }

        tx.commit().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to commit cancellation: {}", e),
            )
        })
    }
}
