use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::{Date, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::auth::repo_types::{Account, AccountStatus, Address, NewAccount};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("an account with this email already exists")]
    DuplicateEmail,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("corrupt account record: {0}")]
    Corrupt(String),
}

/// Persistence for accounts. Emails are passed in already normalised
/// (trimmed, lowercase); implementations must keep them unique.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Inserts a new account. A uniqueness violation on email is reported as
    /// [`StoreError::DuplicateEmail`].
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password_hash: String,
    date_of_birth: Option<Date>,
    profile_image: Option<String>,
    address: Option<Json<Address>>,
    phone_number: Option<String>,
    bio: Option<String>,
    created_at: OffsetDateTime,
    last_login: Option<OffsetDateTime>,
    account_status: String,
    role: String,
    is_admin: bool,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let account_status = row
            .account_status
            .parse::<AccountStatus>()
            .map_err(|e| StoreError::Corrupt(format!("{e} (account {})", row.id)))?;
        Ok(Account {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password_hash: row.password_hash,
            date_of_birth: row.date_of_birth,
            profile_image: row.profile_image,
            address: row.address.map(|Json(a)| a),
            phone_number: row.phone_number,
            bio: row.bio,
            created_at: row.created_at,
            last_login: row.last_login,
            account_status,
            role: row.role,
            is_admin: row.is_admin,
        })
    }
}

const ACCOUNT_COLUMNS: &str = "id, first_name, last_name, email, password_hash, date_of_birth, \
     profile_image, address, phone_number, bio, created_at, last_login, account_status, role, is_admin";

/// Postgres-backed store. `accounts.email` carries a unique index.
#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = lower($1)");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(email)
            .fetch_optional(&self.db)
            .await?;
        row.map(Account::try_from).transpose()
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO accounts (
                first_name, last_name, email, password_hash, date_of_birth, profile_image,
                address, phone_number, bio, account_status, role, is_admin
            )
            VALUES ($1, $2, lower($3), $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&account.email)
            .bind(&account.password_hash)
            .bind(account.date_of_birth)
            .bind(&account.profile_image)
            .bind(account.address.map(Json))
            .bind(&account.phone_number)
            .bind(&account.bio)
            .bind(account.account_status.as_str())
            .bind(&account.role)
            .bind(account.is_admin)
            .fetch_one(&self.db)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    debug!(constraint = ?db_err.constraint(), "unique violation on insert");
                    StoreError::DuplicateEmail
                }
                other => StoreError::Database(other),
            })?;
        Account::try_from(row)
    }
}
