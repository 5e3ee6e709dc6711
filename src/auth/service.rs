//! The account operations: register, verify, resend, login, authenticate.
//!
//! Each operation validates first, normalizes the email, then performs at
//! most one store mutation. The store carries the atomicity (create-if-absent
//! and OTP check-and-clear); this module only sequences the steps and maps
//! outcomes to [`AuthError`].

use tokio::time::timeout;
use tracing::{error, warn};
use uuid::Uuid;

use super::{
    error::AuthError,
    otp, password,
    state::AuthState,
    token,
    validate::{self, normalize_email},
};
use crate::mail::OtpMailer;
use crate::store::{Account, AccountStore, CreateOutcome, NewAccount, PublicAccount};

/// Outcome of a successful registration.
#[derive(Debug)]
pub struct Registration {
    pub account_id: Uuid,
    pub email: String,
    /// False when the account was created but the OTP email did not go out.
    pub otp_delivered: bool,
}

/// A verified login or OTP verification: token plus public projection.
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub account: PublicAccount,
}

impl AuthState {
    /// Create an unverified account with a fresh OTP challenge and attempt
    /// delivery. Delivery failure does not roll back the account; the caller
    /// is told to request a new code.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        date_of_birth: &str,
        password: &str,
    ) -> Result<Registration, AuthError> {
        let dob = validate::validate_signup(name, email, date_of_birth, password)
            .map_err(AuthError::Validation)?;
        let email = normalize_email(email);

        let password_hash = password::hash_password(password)?;
        let code = otp::generate_otp();
        let expiry = otp::otp_expiry(self.config().otp_ttl_seconds(), chrono::Utc::now());

        let new_account = NewAccount {
            name: name.trim().to_string(),
            email: email.clone(),
            date_of_birth: dob,
            password_hash: Some(password_hash),
            otp_code: code.clone(),
            otp_expiry: expiry,
        };

        let account = match self.store().create(new_account).await? {
            CreateOutcome::Created(account) => account,
            CreateOutcome::Conflict => return Err(AuthError::Conflict),
        };

        let send = self.mailer().send_otp(&account.email, &code, &account.name);
        let otp_delivered = match timeout(self.config().mail_timeout(), send).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!("failed to send OTP email to new account: {err}");
                false
            }
            Err(_) => {
                warn!(
                    "OTP email to new account timed out after {:?}",
                    self.config().mail_timeout()
                );
                false
            }
        };

        Ok(Registration {
            account_id: account.id,
            email: account.email,
            otp_delivered,
        })
    }

    /// Consume an outstanding challenge and issue a session. Unknown email,
    /// wrong code and expired code all yield the same error.
    pub async fn verify_otp(&self, email: &str, code: &str) -> Result<Session, AuthError> {
        validate::validate_otp(email, code).map_err(AuthError::Validation)?;
        let email = normalize_email(email);

        let account = self
            .store()
            .consume_otp(&email, code.trim(), chrono::Utc::now())
            .await?
            .ok_or(AuthError::InvalidOrExpiredOtp)?;

        self.session_for(account)
    }

    /// Issue a new challenge for an unverified account. Delivery failure here
    /// is a hard error: there is no creation side effect to protect.
    pub async fn resend_otp(&self, email: &str) -> Result<(), AuthError> {
        validate::validate_email_only(email).map_err(AuthError::Validation)?;
        let email = normalize_email(email);

        let code = otp::generate_otp();
        let expiry = otp::otp_expiry(self.config().otp_ttl_seconds(), chrono::Utc::now());

        let account = self
            .store()
            .refresh_otp(&email, &code, expiry)
            .await?
            .ok_or(AuthError::NotFound)?;

        let send = self.mailer().send_otp(&account.email, &code, &account.name);
        match timeout(self.config().mail_timeout(), send).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => {
                error!("failed to resend OTP email: {err}");
                Err(AuthError::Delivery)
            }
            Err(_) => {
                error!(
                    "OTP email resend timed out after {:?}",
                    self.config().mail_timeout()
                );
                Err(AuthError::Delivery)
            }
        }
    }

    /// Password login. Password verification runs before the verified-email
    /// gate, so an unverified response never confirms a password guess alone.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        validate::validate_login(email, password).map_err(AuthError::Validation)?;
        let email = normalize_email(email);

        let account = self
            .store()
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let Some(hash) = account.password_hash.as_deref() else {
            return Err(AuthError::WrongAuthMethod);
        };

        if !password::verify_password(password, hash) {
            return Err(AuthError::Unauthorized);
        }

        if !account.is_email_verified {
            return Err(AuthError::EmailNotVerified {
                email: account.email,
            });
        }

        self.session_for(account)
    }

    /// Resolve a bearer token to the account it belongs to. A token for a
    /// deleted account fails the same way as a bad token.
    pub async fn authenticate(&self, bearer: Option<&str>) -> Result<PublicAccount, AuthError> {
        let token = bearer.ok_or(AuthError::MissingToken)?;

        let account_id =
            token::verify(self.config().jwt_secret(), token).ok_or(AuthError::InvalidToken)?;

        let account = self
            .store()
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        Ok(account.into_public())
    }

    fn session_for(&self, account: Account) -> Result<Session, AuthError> {
        let token = token::issue(
            self.config().jwt_secret(),
            account.id,
            self.config().token_ttl_seconds(),
        )?;
        Ok(Session {
            token,
            account: account.into_public(),
        })
    }
}
