use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use tracing::error;

use crate::config::HashConfig;

/// Symbols a password must draw at least one character from.
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";
pub const PASSWORD_MIN_LEN: usize = 8;

lazy_static! {
    static ref PASSWORD_CHARSET_RE: Regex = Regex::new(r"^[A-Za-z0-9@$!%*?&]+$").unwrap();
}

/// Format-level password check: minimum length, one uppercase, one lowercase,
/// one digit, one symbol from [`PASSWORD_SYMBOLS`], and nothing outside that alphabet.
pub fn is_acceptable_password(plain: &str) -> bool {
    plain.len() >= PASSWORD_MIN_LEN
        && PASSWORD_CHARSET_RE.is_match(plain)
        && plain.chars().any(|c| c.is_ascii_uppercase())
        && plain.chars().any(|c| c.is_ascii_lowercase())
        && plain.chars().any(|c| c.is_ascii_digit())
        && plain.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

/// Argon2id hasher with a configurable work factor. Each hash gets a fresh
/// random salt; verification is constant-time inside `argon2`.
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(cfg: &HashConfig) -> anyhow::Result<Self> {
        let params = Params::new(cfg.memory_kib, cfg.iterations, cfg.parallelism, None)
            .map_err(|e| anyhow::anyhow!("invalid argon2 params: {e}"))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                anyhow::anyhow!(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// `Ok(false)` on mismatch; `Err` only when the stored hash cannot be parsed.
    /// Parameters are read from the PHC string, so hashes made under an older
    /// work factor still verify.
    pub fn verify(&self, plain: &str, hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            anyhow::anyhow!(e.to_string())
        })?;
        Ok(self
            .argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}
