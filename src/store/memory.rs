//! In-memory backend for [`AccountStore`], used by tests and local dev.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Account, AccountStore, CreateOutcome, NewAccount};

#[derive(Default)]
pub struct MemoryStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rewrite the expiry of an outstanding challenge. Test helper for
    /// exercising the expired-code path without waiting out the window.
    pub async fn set_otp_expiry(&self, email: &str, expiry: DateTime<Utc>) {
        let mut accounts = self.accounts.lock().await;
        if let Some(account) = accounts.values_mut().find(|a| a.email == email) {
            if account.otp_code.is_some() {
                account.otp_expiry = Some(expiry);
            }
        }
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create(&self, account: NewAccount) -> Result<CreateOutcome> {
        let mut accounts = self.accounts.lock().await;
        // Single lock over lookup and insert stands in for the unique index.
        if accounts.values().any(|a| a.email == account.email) {
            return Ok(CreateOutcome::Conflict);
        }

        let now = Utc::now();
        let record = Account {
            id: Uuid::new_v4(),
            name: account.name,
            email: account.email,
            date_of_birth: account.date_of_birth,
            password_hash: account.password_hash,
            is_email_verified: false,
            otp_code: Some(account.otp_code),
            otp_expiry: Some(account.otp_expiry),
            created_at: now,
            updated_at: now,
        };
        accounts.insert(record.id, record.clone());
        Ok(CreateOutcome::Created(record))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(&id).cloned())
    }

    async fn consume_otp(
        &self,
        email: &str,
        otp: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>> {
        let mut accounts = self.accounts.lock().await;
        let Some(account) = accounts.values_mut().find(|a| a.email == email) else {
            return Ok(None);
        };

        let code_matches = account.otp_code.as_deref() == Some(otp);
        let not_expired = account.otp_expiry.is_some_and(|expiry| expiry > now);
        if !code_matches || !not_expired {
            return Ok(None);
        }

        account.is_email_verified = true;
        account.otp_code = None;
        account.otp_expiry = None;
        account.updated_at = now;
        Ok(Some(account.clone()))
    }

    async fn refresh_otp(
        &self,
        email: &str,
        otp: &str,
        expiry: DateTime<Utc>,
    ) -> Result<Option<Account>> {
        let mut accounts = self.accounts.lock().await;
        let Some(account) = accounts
            .values_mut()
            .find(|a| a.email == email && !a.is_email_verified)
        else {
            return Ok(None);
        };

        account.otp_code = Some(otp.to_string());
        account.otp_expiry = Some(expiry);
        account.updated_at = Utc::now();
        Ok(Some(account.clone()))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
