//! Mamo Pay payment gateway adapter.
//!
//! Implements the `PaymentGateway` port against the Mamo Pay business
//! API. The API key is handled via `secrecy::SecretString`.

mod gateway;

pub use gateway::{MamoPayConfig, MamoPayGateway};
