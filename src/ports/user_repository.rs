//! User repository port.

use async_trait::async_trait;

use crate::domain::billing::User;
use crate::domain::foundation::{DomainError, UserId};

/// Repository port for user account lookups.
///
/// Account creation is not exposed here; new users are only ever
/// written through the provisioning transaction, together with their
/// payment and subscription rows.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by email.
    ///
    /// Returns `None` if no account exists for this email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Find a user by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Check whether a username is already taken.
    ///
    /// Called repeatedly by username generation; implementations
    /// should answer from an index, not a full row fetch.
    async fn username_exists(&self, username: &str) -> Result<bool, DomainError>;
}
