//! Session tokens: HS256 JWTs binding a session to an account id.

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const EXPIRY_LEEWAY_SECONDS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub(crate) fn issue(secret: &SecretString, account_id: Uuid, ttl_seconds: i64) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: account_id.to_string(),
        iat: now,
        exp: now + ttl_seconds.max(1),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .context("failed to sign session token")
}

/// Resolve a token to the account id it was issued for.
///
/// Any failure (bad signature, expired, malformed, non-uuid subject)
/// collapses to `None`; callers never learn which check failed.
pub(crate) fn verify(secret: &SecretString, token: &str) -> Option<Uuid> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = EXPIRY_LEEWAY_SECONDS;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .ok()
    .and_then(|data| Uuid::parse_str(&data.claims.sub).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("sekreto")
    }

    #[test]
    fn issue_then_verify_round_trip() {
        let account_id = Uuid::new_v4();
        let token = issue(&secret(), account_id, 3600).unwrap();
        assert_eq!(verify(&secret(), &token), Some(account_id));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = issue(&secret(), Uuid::new_v4(), 3600).unwrap();
        assert_eq!(verify(&SecretString::from("alia"), &token), None);
    }

    #[test]
    fn verify_rejects_single_byte_tampering() {
        let token = issue(&secret(), Uuid::new_v4(), 3600).unwrap();

        // Flip one character inside the signature segment.
        let mut bytes = token.into_bytes();
        let index = bytes.len() - 10;
        bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert_eq!(verify(&secret(), &tampered), None);
    }

    #[test]
    fn verify_rejects_expired_tokens() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret().expose_secret().as_bytes()),
        )
        .unwrap();

        assert_eq!(verify(&secret(), &token), None);
    }

    #[test]
    fn verify_rejects_garbage() {
        assert_eq!(verify(&secret(), "not-a-jwt"), None);
        assert_eq!(verify(&secret(), ""), None);
    }

    #[test]
    fn verify_rejects_non_uuid_subject() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "ana@example.com".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret().expose_secret().as_bytes()),
        )
        .unwrap();

        assert_eq!(verify(&secret(), &token), None);
    }
}
