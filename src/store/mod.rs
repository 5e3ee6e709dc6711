//! Account records and the storage abstraction.
//!
//! The service talks to storage through [`AccountStore`]; [`postgres::PgStore`]
//! is the production backend and [`memory::MemoryStore`] backs tests and local
//! development. Every mutation that the verification flow depends on
//! (create-if-absent, OTP check-and-clear) is a single atomic store operation.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

/// Full account record as stored. Never serialized to clients.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    /// Normalized (trimmed, lowercased) and unique.
    pub email: String,
    pub date_of_birth: NaiveDate,
    /// Argon2id PHC string. `None` for accounts created through a federated
    /// identity provider; those can never pass password login.
    pub password_hash: Option<String>,
    pub is_email_verified: bool,
    /// Present only while a verification challenge is outstanding.
    pub otp_code: Option<String>,
    pub otp_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The projection that crosses the API boundary.
///
/// `Account::into_public` is the only conversion point, so the password hash
/// and any pending OTP can never leak into a response by accident.
#[derive(ToSchema, Serialize, Debug, Clone)]
pub struct PublicAccount {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "dateOfBirth")]
    pub date_of_birth: NaiveDate,
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

impl Account {
    #[must_use]
    pub fn into_public(self) -> PublicAccount {
        PublicAccount {
            id: self.id.to_string(),
            name: self.name,
            email: self.email,
            date_of_birth: self.date_of_birth,
            is_verified: self.is_email_verified,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Input for [`AccountStore::create`]. Email must already be normalized.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub password_hash: Option<String>,
    pub otp_code: String,
    pub otp_expiry: DateTime<Utc>,
}

#[derive(Debug)]
pub enum CreateOutcome {
    Created(Account),
    /// An account with the same normalized email already exists.
    Conflict,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Atomic create-if-absent keyed by normalized email. Two concurrent
    /// creates for the same email yield one `Created` and one `Conflict`.
    async fn create(&self, account: NewAccount) -> Result<CreateOutcome>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>>;

    /// Atomic check-and-clear of an outstanding challenge: matches email,
    /// code and an unexpired expiry, marks the account verified and removes
    /// the code in one step. Returns the updated account, or `None` when
    /// nothing matched (unknown email, wrong code, or expired).
    async fn consume_otp(
        &self,
        email: &str,
        otp: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>>;

    /// Replace the outstanding challenge on an unverified account. Returns
    /// `None` when the account does not exist or is already verified.
    async fn refresh_otp(
        &self,
        email: &str,
        otp: &str,
        expiry: DateTime<Utc>,
    ) -> Result<Option<Account>>;

    /// Connectivity probe for the health endpoint.
    async fn ping(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_account() -> Account {
        let created = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Account {
            id: Uuid::new_v4(),
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2000, 3, 15).unwrap(),
            password_hash: Some("$argon2id$v=19$m=19456,t=2,p=1$salt$hash".to_string()),
            is_email_verified: false,
            otp_code: Some("123456".to_string()),
            otp_expiry: Some(created + chrono::Duration::minutes(10)),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn public_projection_drops_sensitive_fields() {
        let account = sample_account();
        let id = account.id;

        let public = account.into_public();
        assert_eq!(public.id, id.to_string());
        assert!(!public.is_verified);

        let value = serde_json::to_value(&public).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("dateOfBirth"));
        assert!(object.contains_key("isVerified"));
        assert!(!object.contains_key("password_hash"));
        assert!(!object.contains_key("passwordHash"));
        assert!(!object.contains_key("otp_code"));
        assert!(!object.contains_key("otpCode"));
    }
}
