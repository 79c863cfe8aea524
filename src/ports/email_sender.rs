//! Email sender port.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;

/// A rendered transactional email ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

impl EmailMessage {
    pub fn new(
        to: impl Into<String>,
        subject: impl Into<String>,
        html_body: impl Into<String>,
    ) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            html_body: html_body.into(),
        }
    }
}

/// Port for the transactional email provider.
///
/// All billing email is best-effort: a send failure is logged and
/// never fails the operation that triggered it.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send a single transactional email.
    ///
    /// # Errors
    ///
    /// - `EmailProviderError` on any transport or API failure
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError>;
}
