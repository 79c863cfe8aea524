//! Provisioned user account entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, UserId};

use super::plan::PlanType;
use super::plan_limits::PlanLimits;

/// A user account provisioned from a successful charge.
///
/// # Invariants
///
/// - `email` is unique; a second charge for a registered email is a
///   business-rule violation, never silent dedup
/// - `username` is unique
/// - Only the password hash is stored, never the plaintext
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,

    /// Unique account email, taken from the charge's customer block.
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    /// Unique generated username.
    pub username: String,

    /// Argon2 hash of the generated temporary password.
    pub password_hash: String,

    /// Plan tier the account was provisioned on.
    pub plan: PlanType,

    /// Resource ceilings computed from the plan at creation time.
    pub limits: PlanLimits,

    /// Start of the trial window, anchored to the charge date.
    pub trial_starts_at: Timestamp,

    /// End of the trial window.
    pub trial_ends_at: Timestamp,

    /// Whether the email address has been verified.
    pub email_verified: bool,

    /// Single-use verification token, valid 24 hours from issue.
    pub verification_token: Option<String>,

    /// Affiliate token the signup was attributed to, if any.
    pub affiliate_token: Option<String>,

    pub created_at: Timestamp,
}

impl User {
    /// Creates an unverified account from validated customer details.
    #[allow(clippy::too_many_arguments)]
    pub fn provision(
        email: String,
        first_name: String,
        last_name: String,
        username: String,
        password_hash: String,
        plan: PlanType,
        trial_starts_at: Timestamp,
        trial_ends_at: Timestamp,
        affiliate_token: Option<String>,
    ) -> Self {
        Self {
            id: UserId::new(),
            email,
            first_name,
            last_name,
            username,
            password_hash,
            plan,
            limits: PlanLimits::for_plan(plan),
            trial_starts_at,
            trial_ends_at,
            email_verified: false,
            verification_token: None,
            affiliate_token,
            created_at: Timestamp::now(),
        }
    }

    /// Attaches the emailed verification token.
    ///
    /// Issued after construction because the token embeds the user id.
    pub fn with_verification_token(mut self, token: String) -> Self {
        self.verification_token = Some(token);
        self
    }

    /// Display name used in outbound email.
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(first: &str, last: &str) -> User {
        let now = Timestamp::now();
        User::provision(
            "jane@example.com".to_string(),
            first.to_string(),
            last.to_string(),
            "janedoe".to_string(),
            "$argon2id$stub".to_string(),
            PlanType::Pro,
            now,
            now.add_months(1),
            None,
        )
    }

    #[test]
    fn provision_starts_unverified_with_plan_limits() {
        let user = test_user("Jane", "Doe");

        assert!(!user.email_verified);
        assert_eq!(user.limits, PlanLimits::for_plan(PlanType::Pro));
        assert_eq!(user.plan, PlanType::Pro);
    }

    #[test]
    fn display_name_joins_first_and_last() {
        assert_eq!(test_user("Jane", "Doe").display_name(), "Jane Doe");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        assert_eq!(test_user("", "").display_name(), "janedoe");
    }
}
