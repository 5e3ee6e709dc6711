//! Outbound OTP delivery abstraction.
//!
//! The signup and resend flows hand a freshly generated code to an
//! [`OtpMailer`]; the mailer decides how to deliver (SMTP, API, etc.) and
//! returns `Ok`/`Err`. The default for local dev is [`LogMailer`], which logs
//! the code instead of sending real email.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

/// Email delivery capability for verification codes.
#[async_trait]
pub trait OtpMailer: Send + Sync {
    /// Deliver a verification code or return an error so the caller can take
    /// the documented degraded path.
    async fn send_otp(&self, email: &str, otp: &str, name: &str) -> Result<()>;
}

/// Local dev mailer that logs the code instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogMailer;

#[async_trait]
impl OtpMailer for LogMailer {
    async fn send_otp(&self, email: &str, otp: &str, name: &str) -> Result<()> {
        info!(
            to_email = %email,
            name = %name,
            otp = %otp,
            "otp email send stub"
        );
        Ok(())
    }
}
