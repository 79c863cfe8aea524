//! Billing domain module.
//!
//! Handles the subscription lifecycle: webhook ingestion, account
//! provisioning, the payment/subscription ledger, affiliate
//! commission attribution, and cancellation.
//!
//! # Module Structure
//!
//! - `payment_event` - Validated inbound charge events
//! - `user` - Provisioned account entity
//! - `payment` - Payment ledger entity
//! - `subscription` - Subscription aggregate and status state machine
//! - `addon` - Add-on entitlements
//! - `affiliate` - Affiliate link commission tracking
//! - `credentials` - Username/password generation
//! - `interval` - Billing period date arithmetic
//! - `plan` / `plan_limits` - Plan tiers and their resource ceilings
//! - `verification` - Email verification tokens

pub mod addon;
pub mod affiliate;
pub mod credentials;
pub mod errors;
pub mod interval;
pub mod payment;
pub mod payment_event;
pub mod plan;
pub mod plan_limits;
pub mod status;
pub mod subscription;
pub mod user;
pub mod verification;

pub use addon::{AddOn, AddonType};
pub use affiliate::AffiliateLink;
pub use errors::BillingError;
pub use interval::IntervalUnit;
pub use payment::{Payment, PaymentStatus};
pub use payment_event::{AffiliateRef, CustomerDetails, PaymentEvent, CHARGE_SUCCEEDED};
pub use plan::{PlanType, ProductType};
pub use plan_limits::PlanLimits;
pub use status::SubscriptionStatus;
pub use subscription::{ItemType, Subscription};
pub use user::User;
