use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};
use uuid::Uuid;

use crate::auth::repo_types::{Account, AccountStatus, Address};

/// Parses a date of birth given either as `YYYY-MM-DD` or as an RFC 3339
/// timestamp; only the calendar date of a timestamp is kept.
pub fn parse_date_of_birth(raw: &str) -> Result<Date, String> {
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339).map(|t| t.date()))
        .map_err(|_| {
            format!("invalid dateOfBirth {raw:?}: expected YYYY-MM-DD or an RFC 3339 timestamp")
        })
}

fn deserialize_date_of_birth<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_date_of_birth(raw.trim())
            .map(Some)
            .map_err(de::Error::custom),
        None => Ok(None),
    }
}

fn serialize_date_of_birth<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match date {
        Some(d) => {
            let formatted = d
                .format(format_description!("[year]-[month]-[day]"))
                .map_err(ser::Error::custom)?;
            serializer.serialize_some(&formatted)
        }
        None => serializer.serialize_none(),
    }
}

/// Request body for registration.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default, deserialize_with = "deserialize_date_of_birth")]
    pub date_of_birth: Option<Date>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Request body for login.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Account as returned to clients. No password hash, no admin flag.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(
        default,
        serialize_with = "serialize_date_of_birth",
        deserialize_with = "deserialize_date_of_birth",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_birth: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_login: Option<OffsetDateTime>,
    pub account_status: AccountStatus,
    pub role: String,
}

impl From<Account> for PublicAccount {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            first_name: a.first_name,
            last_name: a.last_name,
            email: a.email,
            date_of_birth: a.date_of_birth,
            profile_image: a.profile_image,
            address: a.address,
            phone_number: a.phone_number,
            bio: a.bio,
            created_at: a.created_at,
            last_login: a.last_login,
            account_status: a.account_status,
            role: a.role,
        }
    }
}

/// Response returned after a successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: PublicAccount,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_account() -> Account {
        Account {
            id: Uuid::new_v4(),
            first_name: "Mary".into(),
            last_name: "Seacole".into(),
            email: "mary@example.com".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            date_of_birth: None,
            profile_image: None,
            address: Some(Address {
                city: Some("Kingston".into()),
                ..Address::default()
            }),
            phone_number: None,
            bio: Some("Nurse".into()),
            created_at: OffsetDateTime::now_utc(),
            last_login: None,
            account_status: AccountStatus::Active,
            role: "carer".into(),
            is_admin: true,
        }
    }

    #[test]
    fn public_account_omits_hash_and_admin_flag() {
        let json = serde_json::to_value(PublicAccount::from(stored_account())).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("passwordHash"));
        assert!(!obj.contains_key("isAdmin"));
        assert!(!json.to_string().contains("argon2"));
        assert_eq!(obj["accountStatus"], "Active");
        assert_eq!(obj["address"]["city"], "Kingston");
    }

    #[test]
    fn register_request_rejects_unknown_fields() {
        let body = r#"{"firstName":"A","lastName":"B","email":"a@b.com","password":"Abc12345!","isAdmin":true}"#;
        assert!(serde_json::from_str::<RegisterRequest>(body).is_err());
    }

    #[test]
    fn register_request_parses_optional_profile() {
        let body = r#"{
            "firstName": "A", "lastName": "B", "email": "a@b.com", "password": "Abc12345!",
            "dateOfBirth": "1990-05-01T00:00:00Z",
            "address": {"street": "1 Main St", "postalCode": "12345"},
            "phoneNumber": "+44 20 7946 0000"
        }"#;
        let req: RegisterRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.date_of_birth.unwrap().year(), 1990);
        assert_eq!(req.address.unwrap().postal_code.as_deref(), Some("12345"));
        assert!(req.bio.is_none());
    }

    #[test]
    fn date_of_birth_accepts_plain_dates_and_timestamps() {
        let expected = Date::from_calendar_date(1990, time::Month::May, 1).unwrap();
        assert_eq!(parse_date_of_birth("1990-05-01").unwrap(), expected);
        assert_eq!(parse_date_of_birth("1990-05-01T00:00:00Z").unwrap(), expected);
        assert_eq!(parse_date_of_birth("1990-05-01T22:30:00+00:00").unwrap(), expected);
        assert!(parse_date_of_birth("01/05/1990").is_err());
        assert!(parse_date_of_birth("1990-13-01").is_err());

        let body = r#"{"firstName":"A","lastName":"B","email":"a@b.com","password":"Abc12345!","dateOfBirth":"1990-05-01"}"#;
        let req: RegisterRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.date_of_birth, Some(expected));
    }

    #[test]
    fn public_account_renders_date_of_birth_as_calendar_date() {
        let mut account = stored_account();
        account.date_of_birth = Some(Date::from_calendar_date(1985, time::Month::November, 23).unwrap());
        let json = serde_json::to_value(PublicAccount::from(account)).unwrap();
        assert_eq!(json["dateOfBirth"], "1985-11-23");
    }
}
