//! Email verification tokens.
//!
//! A provisioned account starts unverified and carries a single-use
//! JWT. The token embeds a digest of the password hash, so rotating
//! the password invalidates any outstanding token, and expires 24
//! hours after issue.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp, UserId};

/// Token lifetime in seconds.
const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
struct VerificationClaims {
    /// User the token verifies.
    sub: String,
    /// SHA-256 digest of the account's password hash at issue time.
    pwd: String,
    /// Issued-at, seconds since epoch.
    iat: i64,
    /// Expiry, seconds since epoch.
    exp: i64,
}

fn digest_password_hash(password_hash: &str) -> String {
    hex::encode(Sha256::digest(password_hash.as_bytes()))
}

/// Issues a verification token for a freshly provisioned account.
///
/// # Errors
///
/// - `InternalError` if signing fails
pub fn issue_verification_token(
    secret: &str,
    user_id: &UserId,
    password_hash: &str,
) -> Result<String, DomainError> {
    let issued_at = Timestamp::now().as_datetime().timestamp();
    let claims = VerificationClaims {
        sub: user_id.to_string(),
        pwd: digest_password_hash(password_hash),
        iat: issued_at,
        exp: issued_at + TOKEN_TTL_SECS,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Failed to sign verification token: {err}"),
        )
    })
}

/// Checks a verification token and returns the user id it verifies.
///
/// # Errors
///
/// - `ValidationFailed` if the token is expired, tampered with, or was
///   issued against a different password hash
pub fn check_verification_token(
    secret: &str,
    token: &str,
    current_password_hash: &str,
) -> Result<UserId, DomainError> {
    let data = decode::<VerificationClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            format!("Invalid verification token: {err}"),
        )
    })?;

    if data.claims.pwd != digest_password_hash(current_password_hash) {
        return Err(DomainError::new(
            ErrorCode::ValidationFailed,
            "Verification token no longer matches the account",
        ));
    }

    data.claims.sub.parse().map_err(|_| {
        DomainError::new(
            ErrorCode::ValidationFailed,
            "Verification token carries a malformed user id",
        )
    })
}
