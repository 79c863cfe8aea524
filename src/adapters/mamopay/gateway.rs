//! Mamo Pay gateway adapter.
//!
//! Cancels mirrored subscriptions at the gateway. Callers hold the
//! authoritative state locally, so every method here is best-effort
//! from their point of view; this adapter still reports failures
//! faithfully and leaves the tolerance decision to the caller.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::PaymentGateway;

/// Mamo Pay API configuration.
#[derive(Clone)]
pub struct MamoPayConfig {
    /// Business API key.
    api_key: SecretString,

    /// Base URL for the Mamo Pay business API.
    api_base_url: String,
}

impl MamoPayConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://business.mamopay.com/manage_api/v1".to_string(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Mamo Pay payment gateway adapter.
pub struct MamoPayGateway {
    config: MamoPayConfig,
    http_client: reqwest::Client,
}

impl MamoPayGateway {
    pub fn new(config: MamoPayConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PaymentGateway for MamoPayGateway {
    async fn cancel_subscription(&self, external_id: &str) -> Result<(), DomainError> {
        let url = format!("{}/subscriptions/{}", self.config.api_base_url, external_id);

        let response = self
            .http_client
            .delete(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::GatewayError,
                    format!("Mamo Pay request failed: {}", e),
                )
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(
                %status,
                external_id,
                "Mamo Pay cancellation rejected"
            );
            return Err(DomainError::new(
                ErrorCode::GatewayError,
                format!("Mamo Pay API error ({}): {}", status, error_text),
            ));
        }

        Ok(())
    }
}
