use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the accounts table
#[derive(Clone, FromRow)]
pub struct AccountModel {
    pub id: String,       // UUID v4 as string
    pub username: String, // Stored lower-cased
    pub email: String,    // Stored lower-cased
    pub full_name: String,
    pub password_hash: String,         // Argon2id PHC string
    pub refresh_token: Option<String>, // The single live refresh token, if any
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AccountModel {
    /// Creates a new account with generated ID and timestamps
    pub fn new(username: &str, email: &str, full_name: &str, password_hash: String) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4().to_string(),
            username: normalize_identifier(username),
            email: normalize_identifier(email),
            full_name: full_name.trim().to_string(),
            password_hash,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True if the identifier names this account. An identifier containing `@` is
    /// matched against the email only, anything else against the username only.
    pub fn matches_identifier(&self, identifier: &str) -> bool {
        let identifier = normalize_identifier(identifier);
        if names_email(&identifier) {
            self.email == identifier
        } else {
            self.username == identifier
        }
    }

    pub fn has_session(&self) -> bool {
        self.refresh_token.is_some()
    }

    pub fn to_public(&self) -> PublicAccount {
        PublicAccount {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl std::fmt::Debug for AccountModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountModel")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("has_session", &self.has_session())
            .finish_non_exhaustive()
    }
}

/// Account as exposed outside the service: no password hash, no refresh token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicAccount {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Usernames and emails are compared case-insensitively
pub fn normalize_identifier(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Usernames never contain `@`, so any identifier that does is an email
pub fn names_email(identifier: &str) -> bool {
    identifier.contains('@')
}
