use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Lifecycle state of an account.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
    Banned,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "Active",
            AccountStatus::Inactive => "Inactive",
            AccountStatus::Banned => "Banned",
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown account status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for AccountStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(AccountStatus::Active),
            "Inactive" => Ok(AccountStatus::Inactive),
            "Banned" => Ok(AccountStatus::Banned),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Postal address sub-record, stored as a JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Account record as persisted by the store.
///
/// Never serialized directly; responses go through
/// [`PublicAccount`](super::dto::PublicAccount).
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String, // argon2 PHC string
    pub date_of_birth: Option<Date>,
    pub profile_image: Option<String>,
    pub address: Option<Address>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub created_at: OffsetDateTime,
    pub last_login: Option<OffsetDateTime>,
    pub account_status: AccountStatus,
    pub role: String,
    pub is_admin: bool,
}

/// Fields supplied at creation; the store assigns id and `created_at`.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub date_of_birth: Option<Date>,
    pub profile_image: Option<String>,
    pub address: Option<Address>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub account_status: AccountStatus,
    pub role: String,
    pub is_admin: bool,
}

pub const DEFAULT_ROLE: &str = "carer";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_its_own_display() {
        for status in [AccountStatus::Active, AccountStatus::Inactive, AccountStatus::Banned] {
            assert_eq!(status.to_string().parse::<AccountStatus>().unwrap(), status);
        }
        assert!("Suspended".parse::<AccountStatus>().is_err());
    }

    #[test]
    fn address_rejects_unknown_fields() {
        let err = serde_json::from_str::<Address>(r#"{"street":"1 Main St","zip":"123"}"#);
        assert!(err.is_err());

        let addr: Address = serde_json::from_str(r#"{"postalCode":"AB1 2CD"}"#).unwrap();
        assert_eq!(addr.postal_code.as_deref(), Some("AB1 2CD"));
    }
}
