use serde::Deserialize;

use super::models::names_email;
use crate::shared::AppError;

/// Registration request body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
}

impl RegisterRequest {
    /// Rejects blank fields, usernames that could be read as an email, and obviously
    /// malformed emails
    pub fn validate(&self) -> Result<(), AppError> {
        let fields = [&self.username, &self.email, &self.password, &self.full_name];
        if fields.iter().any(|field| field.trim().is_empty()) {
            return Err(AppError::Validation("All fields are required".to_string()));
        }

        if names_email(&self.username) {
            return Err(AppError::Validation(
                "Username must not contain '@'".to_string(),
            ));
        }

        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err(AppError::Validation("Email address is invalid".to_string())),
        }
    }
}
