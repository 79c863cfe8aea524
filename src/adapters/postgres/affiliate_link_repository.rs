//! PostgreSQL implementation of the affiliate link repository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::billing::AffiliateLink;
use crate::domain::foundation::{AffiliateLinkId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::AffiliateLinkRepository;

pub struct PostgresAffiliateLinkRepository {
    pool: PgPool,
}

impl PostgresAffiliateLinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AffiliateLinkRow {
    id: uuid::Uuid,
    token: String,
    user_id: uuid::Uuid,
    total_commission: f64,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<AffiliateLinkRow> for AffiliateLink {
    fn from(row: AffiliateLinkRow) -> Self {
        AffiliateLink {
            id: AffiliateLinkId::from_uuid(row.id),
            token: row.token,
            user_id: UserId::from_uuid(row.user_id),
            total_commission: row.total_commission,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[async_trait]
impl AffiliateLinkRepository for PostgresAffiliateLinkRepository {
    async fn find_by_token(&self, token: &str) -> Result<Option<AffiliateLink>, DomainError> {
        let row: Option<AffiliateLinkRow> = sqlx::query_as(
            r#"
            SELECT id, token, user_id, total_commission, created_at
            FROM affiliate_links
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to query affiliate link: {}", e),
            )
        })?;

        Ok(row.map(AffiliateLink::from))
    }

    async fn add_commission(&self, token: &str, amount: f64) -> Result<(), DomainError> {
        // In-place increment so concurrent attributions never lose
        // updates to a read-modify-write race.
        let result = sqlx::query(
            r#"
            UPDATE affiliate_links
            SET total_commission = total_commission + $2
            WHERE token = $1
            "#,
        )
        .bind(token)
        .bind(amount)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to add commission: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AffiliateLinkNotFound,
                format!("Affiliate link not found: {}", token),
            ));
        }

        Ok(())
    }
}
