use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::auth::{
    dto::RegisterRequest,
    jwt::JwtKeys,
    password::{is_acceptable_password, CredentialHasher},
    repo::{AccountStore, StoreError},
    repo_types::{Account, AccountStatus, Address, NewAccount, DEFAULT_ROLE},
};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid email address")]
    InvalidEmail,
    #[error("password does not meet the format requirements")]
    WeakPassword,
    #[error("email is already in use")]
    DuplicateEmail,
    #[error("account not found")]
    AccountNotFound,
    #[error("wrong password")]
    InvalidCredentials,
    #[error("account store failure: {0}")]
    Store(#[source] StoreError),
    #[error("credential hashing failed: {0}")]
    Hasher(#[source] anyhow::Error),
    #[error("token signing failed: {0}")]
    Token(#[source] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => AuthError::DuplicateEmail,
            other => AuthError::Store(other),
        }
    }
}

impl AuthError {
    /// True for failures of the store, hasher or signer rather than of the request.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            AuthError::Store(_) | AuthError::Hasher(_) | AuthError::Token(_)
        )
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: String, field: &'static str) -> Result<String, AuthError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::MissingField(field));
    }
    Ok(value.to_string())
}

fn normalize_address(addr: Address) -> Option<Address> {
    let addr = Address {
        street: trimmed(addr.street),
        city: trimmed(addr.city),
        state: trimmed(addr.state),
        postal_code: trimmed(addr.postal_code),
        country: trimmed(addr.country),
    };
    (addr != Address::default()).then_some(addr)
}

async fn hash_blocking(hasher: &CredentialHasher, plain: String) -> Result<String, AuthError> {
    let hasher = hasher.clone();
    tokio::task::spawn_blocking(move || hasher.hash(&plain))
        .await
        .map_err(|e| AuthError::Hasher(e.into()))?
        .map_err(AuthError::Hasher)
}

async fn verify_blocking(
    hasher: &CredentialHasher,
    plain: String,
    hash: String,
) -> Result<bool, AuthError> {
    let hasher = hasher.clone();
    tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash))
        .await
        .map_err(|e| AuthError::Hasher(e.into()))?
        .map_err(AuthError::Hasher)
}

/// Validates the payload, checks email uniqueness, hashes the password and
/// persists the account. Format problems are reported before the store is touched.
pub async fn register_account(
    store: &dyn AccountStore,
    hasher: &CredentialHasher,
    req: RegisterRequest,
) -> Result<Account, AuthError> {
    let first_name = required(req.first_name, "firstName")?;
    let last_name = required(req.last_name, "lastName")?;
    let email = normalize_email(&req.email);
    if email.is_empty() {
        return Err(AuthError::MissingField("email"));
    }
    if !is_valid_email(&email) {
        return Err(AuthError::InvalidEmail);
    }
    if !is_acceptable_password(&req.password) {
        return Err(AuthError::WeakPassword);
    }

    if store.find_by_email(&email).await?.is_some() {
        return Err(AuthError::DuplicateEmail);
    }

    let password_hash = hash_blocking(hasher, req.password).await?;

    let account = store
        .create(NewAccount {
            first_name,
            last_name,
            email,
            password_hash,
            date_of_birth: req.date_of_birth,
            profile_image: trimmed(req.profile_image),
            address: req.address.and_then(normalize_address),
            phone_number: trimmed(req.phone_number),
            bio: trimmed(req.bio),
            account_status: AccountStatus::Active,
            role: DEFAULT_ROLE.to_string(),
            is_admin: false,
        })
        .await?;
    debug!(account_id = %account.id, "account persisted");
    Ok(account)
}

/// Looks the account up by email, verifies the password and signs a session token.
pub async fn authenticate(
    store: &dyn AccountStore,
    hasher: &CredentialHasher,
    keys: &JwtKeys,
    email: &str,
    password: String,
) -> Result<(Account, String), AuthError> {
    let email = normalize_email(email);
    let account = store
        .find_by_email(&email)
        .await?
        .ok_or(AuthError::AccountNotFound)?;

    if !verify_blocking(hasher, password, account.password_hash.clone()).await? {
        warn!(account_id = %account.id, "password mismatch");
        return Err(AuthError::InvalidCredentials);
    }

    let token = keys.sign(&account).map_err(AuthError::Token)?;
    Ok((account, token))
}
