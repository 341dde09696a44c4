use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{
    repo::{AccountStore, StoreError},
    repo_types::{Account, NewAccount},
};

/// Process-local store keyed by lowercase email, backing [`AppState::fake`](crate::state::AppState::fake).
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<String, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let key = email.to_lowercase();
        Ok(self.accounts.read().await.get(&key).cloned())
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let key = account.email.to_lowercase();
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&key) {
            return Err(StoreError::DuplicateEmail);
        }

        let stored = Account {
            id: Uuid::new_v4(),
            first_name: account.first_name,
            last_name: account.last_name,
            email: key.clone(),
            password_hash: account.password_hash,
            date_of_birth: account.date_of_birth,
            profile_image: account.profile_image,
            address: account.address,
            phone_number: account.phone_number,
            bio: account.bio,
            created_at: OffsetDateTime::now_utc(),
            last_login: None,
            account_status: account.account_status,
            role: account.role,
            is_admin: account.is_admin,
        };
        accounts.insert(key, stored.clone());
        Ok(stored)
    }
}
