//! Funnel Forge - Billing and Subscription Lifecycle Core
//!
//! This crate implements webhook-driven account provisioning, the
//! payment and subscription ledger, affiliate commission attribution,
//! and subscription cancellation for the Funnel Forge platform.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
