//! Postgres backend for [`AccountStore`].
//!
//! Expected schema (`accounts`): `id UUID PRIMARY KEY DEFAULT gen_random_uuid()`,
//! `name TEXT`, `email TEXT UNIQUE`, `date_of_birth DATE`,
//! `password_hash TEXT NULL`, `is_email_verified BOOLEAN DEFAULT FALSE`,
//! `otp_code TEXT NULL`, `otp_expiry TIMESTAMPTZ NULL`,
//! `created_at TIMESTAMPTZ DEFAULT NOW()`, `updated_at TIMESTAMPTZ DEFAULT NOW()`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Connection, PgPool, Row, postgres::PgRow};
use tracing::{Instrument, info_span};
use uuid::Uuid;

use super::{Account, AccountStore, CreateOutcome, NewAccount};

const ACCOUNT_COLUMNS: &str = "id, name, email, date_of_birth, password_hash, \
     is_email_verified, otp_code, otp_expiry, created_at, updated_at";

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn account_from_row(row: &PgRow) -> Account {
    Account {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        date_of_birth: row.get("date_of_birth"),
        password_hash: row.get("password_hash"),
        is_email_verified: row.get("is_email_verified"),
        otp_code: row.get("otp_code"),
        otp_expiry: row.get("otp_expiry"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create(&self, account: NewAccount) -> Result<CreateOutcome> {
        let query = format!(
            "INSERT INTO accounts \
             (name, email, date_of_birth, password_hash, otp_code, otp_expiry) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query.as_str()
        );
        let result = sqlx::query(&query)
            .bind(&account.name)
            .bind(&account.email)
            .bind(account.date_of_birth)
            .bind(&account.password_hash)
            .bind(&account.otp_code)
            .bind(account.otp_expiry)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(row) => Ok(CreateOutcome::Created(account_from_row(&row))),
            // The unique index on email is the arbiter for concurrent signups.
            Err(err) if is_unique_violation(&err) => Ok(CreateOutcome::Conflict),
            Err(err) => Err(err).context("failed to insert account"),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up account by email")?;
        Ok(row.as_ref().map(account_from_row))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to look up account by id")?;
        Ok(row.as_ref().map(account_from_row))
    }

    async fn consume_otp(
        &self,
        email: &str,
        otp: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>> {
        // Conditional UPDATE so a matching code can be consumed exactly once;
        // a replay or a concurrent verify finds no row.
        let query = format!(
            "UPDATE accounts \
             SET is_email_verified = TRUE, otp_code = NULL, otp_expiry = NULL, \
                 updated_at = NOW() \
             WHERE email = $1 AND otp_code = $2 AND otp_expiry > $3 \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(email)
            .bind(otp)
            .bind(now)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to consume verification code")?;
        Ok(row.as_ref().map(account_from_row))
    }

    async fn refresh_otp(
        &self,
        email: &str,
        otp: &str,
        expiry: DateTime<Utc>,
    ) -> Result<Option<Account>> {
        let query = format!(
            "UPDATE accounts \
             SET otp_code = $2, otp_expiry = $3, updated_at = NOW() \
             WHERE email = $1 AND is_email_verified = FALSE \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(email)
            .bind(otp)
            .bind(expiry)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to refresh verification code")?;
        Ok(row.as_ref().map(account_from_row))
    }

    async fn ping(&self) -> Result<()> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self
            .pool
            .acquire()
            .instrument(acquire_span)
            .await
            .context("failed to acquire database connection")?;

        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping()
            .instrument(ping_span)
            .await
            .context("failed to ping database")?;

        Ok(())
    }
}
