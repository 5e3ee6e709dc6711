//! Error taxonomy for the account operations.
//!
//! Several variants deliberately collapse distinct internal causes into a
//! single outward outcome: wrong code and expired code are both
//! `InvalidOrExpiredOtp`, unknown email and wrong password are both
//! `Unauthorized`, and `NotFound` on resend covers "no such account" as well
//! as "already verified".

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Validation failed")]
    Validation(Vec<String>),

    #[error("User with this email already exists")]
    Conflict,

    #[error("Invalid or expired OTP")]
    InvalidOrExpiredOtp,

    #[error("User not found or already verified")]
    NotFound,

    #[error("Invalid email or password")]
    Unauthorized,

    /// Password login on an account created through a federated provider.
    #[error("This account uses federated sign-in. Please use that provider to log in.")]
    WrongAuthMethod,

    /// Password was correct but the email challenge is still outstanding.
    #[error("Please verify your email before logging in")]
    EmailNotVerified { email: String },

    #[error("Access token is required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Failed to send OTP email. Please try again.")]
    Delivery,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_message_does_not_leak_cause() {
        // Unknown email and wrong password must read identically.
        assert_eq!(AuthError::Unauthorized.to_string(), "Invalid email or password");
    }

    #[test]
    fn otp_failure_message_is_generic() {
        assert_eq!(
            AuthError::InvalidOrExpiredOtp.to_string(),
            "Invalid or expired OTP"
        );
    }
}
