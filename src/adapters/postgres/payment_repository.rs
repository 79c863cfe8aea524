//! PostgreSQL implementation of the payment ledger repository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::billing::Payment;
use crate::domain::foundation::{DomainError, ErrorCode, PaymentId, Timestamp, UserId};
use crate::ports::PaymentRepository;

use super::convert::{parse_item_type, parse_payment_status};

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: uuid::Uuid,
    transaction_id: String,
    amount: f64,
    currency: String,
    status: String,
    item_type: String,
    user_id: uuid::Uuid,
    affiliate_token: Option<String>,
    commission_amount: f64,
    raw_payload: serde_json::Value,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            transaction_id: row.transaction_id,
            amount: row.amount,
            currency: row.currency,
            status: parse_payment_status(&row.status)?,
            item_type: parse_item_type(&row.item_type)?,
            user_id: UserId::from_uuid(row.user_id),
            affiliate_token: row.affiliate_token,
            commission_amount: row.commission_amount,
            raw_payload: row.raw_payload,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(
            r#"
            SELECT id, transaction_id, amount, currency, status, item_type,
                   user_id, affiliate_token, commission_amount, raw_payload,
                   created_at
            FROM payments
            WHERE transaction_id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to query payment by transaction id: {}", e),
            )
        })?;

        row.map(Payment::try_from).transpose()
    }
}
