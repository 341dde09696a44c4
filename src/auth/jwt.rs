use std::time::Duration;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{auth::repo_types::Account, config::JwtConfig};

/// Session token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,      // account id
    pub role: String,   // e.g. "carer"
    pub is_admin: bool, // privilege flag
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

/// Signs and verifies session tokens (HS256).
#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs(cfg.ttl_minutes.max(0) as u64 * 60),
        }
    }

    pub fn sign(&self, account: &Account) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|secs| now.checked_add(TimeDuration::seconds(secs)))
            .ok_or_else(|| anyhow::anyhow!("token lifetime out of range"))?;
        let claims = Claims {
            sub: account.id,
            role: account.role.clone(),
            is_admin: account.is_admin,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(account_id = %account.id, role = %account.role, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(account_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::{AccountStatus, DEFAULT_ROLE};

    fn make_keys(secret: &str, issuer: &str, audience: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes: 5,
        })
    }

    fn account(is_admin: bool) -> Account {
        Account {
            id: Uuid::new_v4(),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            email: "grace@example.com".into(),
            password_hash: "$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".into(),
            date_of_birth: None,
            profile_image: None,
            address: None,
            phone_number: None,
            bio: None,
            created_at: OffsetDateTime::now_utc(),
            last_login: None,
            account_status: AccountStatus::Active,
            role: DEFAULT_ROLE.into(),
            is_admin,
        }
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud");
        let acct = account(false);
        let token = keys.sign(&acct).expect("sign");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, acct.id);
        assert_eq!(claims.role, "carer");
        assert!(!claims.is_admin);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert_eq!(claims.exp - claims.iat, 5 * 60);
    }

    #[test]
    fn payload_carries_only_identity_and_privileges() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let acct = account(true);
        let token = keys.sign(&acct).expect("sign");

        // Decode without checking the signature to inspect the raw payload.
        let mut validation = Validation::default();
        validation.insecure_disable_signature_validation();
        validation.validate_aud = false;
        let raw = decode::<serde_json::Value>(&token, &DecodingKey::from_secret(b""), &validation)
            .expect("decode payload")
            .claims;

        let mut keys_in_payload: Vec<&str> =
            raw.as_object().unwrap().keys().map(String::as_str).collect();
        keys_in_payload.sort_unstable();
        assert_eq!(
            keys_in_payload,
            ["aud", "exp", "iat", "is_admin", "iss", "role", "sub"]
        );
        assert_eq!(raw["sub"], acct.id.to_string());
        assert_eq!(raw["is_admin"], true);
        assert!(!token.contains(&acct.password_hash));
    }

    #[test]
    fn sign_errors_instead_of_overflowing() {
        let mut keys = make_keys("dev-secret", "iss", "aud");
        keys.ttl = Duration::from_secs(u64::MAX / 2);
        let err = keys.sign(&account(false)).unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let good = make_keys("secret-a", "iss", "aud");
        let bad = make_keys("secret-b", "iss", "aud");
        let token = good.sign(&account(false)).expect("sign");
        assert!(bad.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good = make_keys("same-secret", "good-iss", "good-aud");
        let bad = make_keys("same-secret", "bad-iss", "bad-aud");
        let token = good.sign(&account(false)).expect("sign");
        let err = bad.verify(&token).unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let keys = make_keys("dev-secret", "iss", "aud");
        let token = keys.sign(&account(false)).expect("sign");
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = keys.sign(&account(true)).expect("sign");
        let forged_payload = forged.split('.').nth(1).unwrap();
        parts[1] = forged_payload;
        assert!(keys.verify(&parts.join(".")).is_err());
    }
}
