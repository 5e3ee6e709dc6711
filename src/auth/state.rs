//! Auth configuration and injected capabilities.

use secrecy::SecretString;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::rate_limit::RateLimiter;
use crate::{mail::OtpMailer, store::AccountStore};

const DEFAULT_TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_OTP_TTL_SECONDS: i64 = 10 * 60;
const DEFAULT_MAIL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct AuthConfig {
    jwt_secret: SecretString,
    token_ttl_seconds: i64,
    otp_ttl_seconds: i64,
    mail_timeout: Duration,
}

impl AuthConfig {
    #[must_use]
    pub fn new(jwt_secret: SecretString) -> Self {
        Self {
            jwt_secret,
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            otp_ttl_seconds: DEFAULT_OTP_TTL_SECONDS,
            mail_timeout: DEFAULT_MAIL_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_token_ttl_seconds(mut self, seconds: i64) -> Self {
        self.token_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_otp_ttl_seconds(mut self, seconds: i64) -> Self {
        self.otp_ttl_seconds = seconds;
        self
    }

    /// Upper bound on a single OTP delivery attempt.
    #[must_use]
    pub fn with_mail_timeout(mut self, timeout: Duration) -> Self {
        self.mail_timeout = timeout;
        self
    }

    pub(crate) fn jwt_secret(&self) -> &SecretString {
        &self.jwt_secret
    }

    #[must_use]
    pub fn token_ttl_seconds(&self) -> i64 {
        self.token_ttl_seconds
    }

    #[must_use]
    pub fn otp_ttl_seconds(&self) -> i64 {
        self.otp_ttl_seconds
    }

    #[must_use]
    pub fn mail_timeout(&self) -> Duration {
        self.mail_timeout
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("token_ttl_seconds", &self.token_ttl_seconds)
            .field("otp_ttl_seconds", &self.otp_ttl_seconds)
            .field("mail_timeout", &self.mail_timeout)
            .finish()
    }
}

/// Everything the account operations need, behind injected capabilities.
pub struct AuthState {
    config: AuthConfig,
    store: Arc<dyn AccountStore>,
    mailer: Arc<dyn OtpMailer>,
    rate_limiter: Arc<dyn RateLimiter>,
}

impl AuthState {
    pub fn new(
        config: AuthConfig,
        store: Arc<dyn AccountStore>,
        mailer: Arc<dyn OtpMailer>,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            config,
            store,
            mailer,
            rate_limiter,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn store(&self) -> &dyn AccountStore {
        self.store.as_ref()
    }

    pub(crate) fn mailer(&self) -> &dyn OtpMailer {
        self.mailer.as_ref()
    }

    #[must_use]
    pub fn rate_limiter(&self) -> &dyn RateLimiter {
        self.rate_limiter.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::rate_limit::NoopRateLimiter;
    use crate::mail::LogMailer;
    use crate::store::{AccountStore, memory::MemoryStore};

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::new(SecretString::from("sekreto"));

        assert_eq!(config.token_ttl_seconds(), DEFAULT_TOKEN_TTL_SECONDS);
        assert_eq!(config.otp_ttl_seconds(), DEFAULT_OTP_TTL_SECONDS);
        assert_eq!(config.mail_timeout(), DEFAULT_MAIL_TIMEOUT);

        let config = config
            .with_token_ttl_seconds(120)
            .with_otp_ttl_seconds(30)
            .with_mail_timeout(Duration::from_secs(2));
        assert_eq!(config.token_ttl_seconds(), 120);
        assert_eq!(config.otp_ttl_seconds(), 30);
        assert_eq!(config.mail_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn debug_redacts_the_secret() {
        let config = AuthConfig::new(SecretString::from("sekreto"));
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sekreto"));
    }

    #[tokio::test]
    async fn auth_state_exposes_capabilities() {
        let state = AuthState::new(
            AuthConfig::new(SecretString::from("sekreto")),
            Arc::new(MemoryStore::new()),
            Arc::new(LogMailer),
            Arc::new(NoopRateLimiter),
        );

        assert!(state.store().ping().await.is_ok());
        assert_eq!(state.config().otp_ttl_seconds(), DEFAULT_OTP_TTL_SECONDS);
    }
}
