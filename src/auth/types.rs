use serde::{Deserialize, Serialize};

use crate::account::models::PublicAccount;

/// JWT claims shared by access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub sub: String, // Account id
    pub exp: usize,  // Expiration timestamp (standard JWT claim)
    pub iat: usize,  // Issued at timestamp (standard JWT claim)
    pub jti: String, // Unique per token so same-second re-issues still differ
}

/// Freshly issued access/refresh token pair
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenPair { .. }")
    }
}

/// Login body; the caller sends either a username or an email
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

impl LoginRequest {
    pub fn identifier(&self) -> Option<&str> {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Body returned by login and refresh
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicAccount>,
    pub access_token: String,
    pub refresh_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json;

    #[test]
    fn test_token_claims_serialization() {
        let claims = TokenClaims {
            sub: "account-id".to_string(),
            exp: 1234567890,
            iat: 1234567800,
            jti: "jti".to_string(),
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("account-id"));

        let deserialized: TokenClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, claims);
    }

    #[test]
    fn test_login_identifier_prefers_username() {
        let request: LoginRequest = serde_json::from_str(
            r#"{"username": "alice", "email": "alice@example.com", "password": "pw"}"#,
        )
        .unwrap();
        assert_eq!(request.identifier(), Some("alice"));

        let request: LoginRequest =
            serde_json::from_str(r#"{"email": " alice@example.com ", "password": "pw"}"#).unwrap();
        assert_eq!(request.identifier(), Some("alice@example.com"));

        let request: LoginRequest =
            serde_json::from_str(r#"{"username": "  ", "password": "pw"}"#).unwrap();
        assert_eq!(request.identifier(), None);
    }

    #[test]
    fn test_token_pair_debug_hides_tokens() {
        let pair = TokenPair {
            access_token: "secret-access".to_string(),
            refresh_token: "secret-refresh".to_string(),
        };
        assert!(!format!("{:?}", pair).contains("secret"));
    }

    #[test]
    fn test_session_response_uses_camel_case() {
        let response = SessionResponse {
            user: None,
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("accessToken"));
        assert!(json.contains("refreshToken"));
        assert!(!json.contains("user"));
    }
}
