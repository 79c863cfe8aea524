//! Authentication configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Authentication configuration (verification tokens)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing email verification tokens
    pub verification_secret: String,
}

impl AuthConfig {
    /// Validate authentication configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.verification_secret.is_empty() {
            return Err(ValidationError::MissingRequired("VERIFICATION_SECRET"));
        }
        if self.verification_secret.len() < 32 {
            return Err(ValidationError::VerificationSecretTooShort);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_secret_fails_validation() {
        assert!(AuthConfig::default().validate().is_err());
    }

    #[test]
    fn short_secret_fails_validation() {
        let config = AuthConfig {
            verification_secret: "too-short".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn long_secret_passes() {
        let config = AuthConfig {
            verification_secret: "a".repeat(48),
        };
        assert!(config.validate().is_ok());
    }
}
