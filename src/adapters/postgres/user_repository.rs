//! PostgreSQL implementation of the user repository.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::billing::{PlanLimits, User};
use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::UserRepository;

use super::convert::parse_plan;

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: uuid::Uuid,
    email: String,
    first_name: String,
    last_name: String,
    username: String,
    password_hash: String,
    plan: String,
    funnels_limit: i32,
    pages_per_funnel_limit: i32,
    monthly_visitors_limit: i32,
    custom_domains_limit: i32,
    team_seats_limit: i32,
    trial_starts_at: chrono::DateTime<chrono::Utc>,
    trial_ends_at: chrono::DateTime<chrono::Utc>,
    email_verified: bool,
    verification_token: Option<String>,
    affiliate_token: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: UserId::from_uuid(row.id),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            username: row.username,
            password_hash: row.password_hash,
            plan: parse_plan(&row.plan)?,
            limits: PlanLimits {
                funnels: row.funnels_limit as u32,
                pages_per_funnel: row.pages_per_funnel_limit as u32,
                monthly_visitors: row.monthly_visitors_limit as u32,
                custom_domains: row.custom_domains_limit as u32,
                team_seats: row.team_seats_limit as u32,
            },
            trial_starts_at: Timestamp::from_datetime(row.trial_starts_at),
            trial_ends_at: Timestamp::from_datetime(row.trial_ends_at),
            email_verified: row.email_verified,
            verification_token: row.verification_token,
            affiliate_token: row.affiliate_token,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

const SELECT_USER: &str = r#"
    SELECT id, email, first_name, last_name, username, password_hash,
           plan, funnels_limit, pages_per_funnel_limit,
           monthly_visitors_limit, custom_domains_limit, team_seats_limit,
           trial_starts_at, trial_ends_at, email_verified,
           verification_token, affiliate_token, created_at
    FROM users
"#;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("{} WHERE lower(email) = lower($1)", SELECT_USER))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to query user by email: {}", e),
                    )
                })?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{} WHERE id = $1", SELECT_USER))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to query user by id: {}", e),
                )
            })?;

        row.map(User::try_from).transpose()
    }

    async fn username_exists(&self, username: &str) -> Result<bool, DomainError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(username)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to check username: {}", e),
                    )
                })?;

        Ok(exists)
    }
}
