//! Transactional email bodies for the billing flow.
//!
//! Pure formatting functions; sending (and failure handling) is the
//! caller's concern.

use crate::domain::billing::User;
use crate::domain::foundation::Timestamp;
use crate::ports::EmailMessage;

/// Welcome email for a freshly provisioned account, carrying the
/// generated credentials and the verification link token.
pub fn welcome_email(user: &User, temporary_password: &str, verification_token: &str) -> EmailMessage {
    let body = format!(
        "<h1>Welcome to Funnel Forge, {name}!</h1>\
         <p>Your account is ready on the {plan} plan.</p>\
         <p>Username: <strong>{username}</strong><br>\
         Temporary password: <strong>{password}</strong></p>\
         <p>Please verify your email within 24 hours:</p>\
         <p><a href=\"https://app.funnelforge.io/verify?token={token}\">Verify my email</a></p>",
        name = user.display_name(),
        plan = user.plan.display_name(),
        username = user.username,
        password = temporary_password,
        token = verification_token,
    );
    EmailMessage::new(user.email.clone(), "Welcome to Funnel Forge", body)
}

/// Congratulations email for an affiliate whose link earned a
/// commission.
pub fn affiliate_commission_email(to: &str, amount: f64, currency: &str) -> EmailMessage {
    let body = format!(
        "<h1>You earned a commission!</h1>\
         <p>A signup through your affiliate link just earned you \
         <strong>{amount:.2} {currency}</strong>. It has been added to \
         your commission balance.</p>"
    );
    EmailMessage::new(to, "You earned an affiliate commission", body)
}

/// Cancellation confirmation, naming the date access runs until.
pub fn cancellation_email(to: &str, name: &str, ends_at: Timestamp) -> EmailMessage {
    let body = format!(
        "<h1>Your subscription has been cancelled</h1>\
         <p>Hi {name},</p>\
         <p>Your subscription will not renew. You keep full access \
         until <strong>{until}</strong>.</p>",
        until = ends_at.format_human_date(),
    );
    EmailMessage::new(to, "Subscription cancelled", body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::PlanType;

    fn test_user() -> User {
        let now = Timestamp::now();
        User::provision(
            "jane@example.com".to_string(),
            "Jane".to_string(),
            "Doe".to_string(),
            "janedoe".to_string(),
            "$argon2id$stub".to_string(),
            PlanType::Pro,
            now,
            now.add_months(1),
            None,
        )
    }

    #[test]
    fn welcome_email_carries_credentials_and_token() {
        let message = welcome_email(&test_user(), "brave-falcon-123", "tok.abc");

        assert_eq!(message.to, "jane@example.com");
        assert!(message.html_body.contains("janedoe"));
        assert!(message.html_body.contains("brave-falcon-123"));
        assert!(message.html_body.contains("token=tok.abc"));
    }

    #[test]
    fn commission_email_formats_amount() {
        let message = affiliate_commission_email("partner@example.com", 9.8, "USD");
        assert!(message.html_body.contains("9.80 USD"));
    }

    #[test]
    fn cancellation_email_names_access_end_date() {
        let ends_at = Timestamp::now().add_months(1);
        let message = cancellation_email("jane@example.com", "Jane Doe", ends_at);
        assert!(message.html_body.contains(&ends_at.format_human_date()));
    }
}
