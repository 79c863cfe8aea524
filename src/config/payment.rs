//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration (Mamo Pay)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Mamo Pay business API key
    pub mamopay_api_key: String,

    /// Mamo Pay API base URL
    #[serde(default = "default_api_base_url")]
    pub mamopay_api_base_url: String,
}

impl PaymentConfig {
    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mamopay_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("MAMOPAY_API_KEY"));
        }
        if !self.mamopay_api_base_url.starts_with("http://")
            && !self.mamopay_api_base_url.starts_with("https://")
        {
            return Err(ValidationError::InvalidMamoPayUrl);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            mamopay_api_key: String::new(),
            mamopay_api_base_url: default_api_base_url(),
        }
    }
}

fn default_api_base_url() -> String {
    "https://business.mamopay.com/manage_api/v1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_fails_validation() {
        assert!(PaymentConfig::default().validate().is_err());
    }

    #[test]
    fn non_http_base_url_fails_validation() {
        let config = PaymentConfig {
            mamopay_api_key: "mamo_key".to_string(),
            mamopay_api_base_url: "ftp://example.com".to_string(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn valid_config_passes() {
        let config = PaymentConfig {
            mamopay_api_key: "mamo_key".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
