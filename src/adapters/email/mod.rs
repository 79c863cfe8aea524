//! Resend transactional email adapter.
//!
//! Implements the `EmailSender` port against the Resend HTTP API. The
//! API key is handled via `secrecy::SecretString`.

mod resend;

pub use resend::{ResendConfig, ResendEmailSender};
