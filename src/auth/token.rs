use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{errors::AuthError, types::TokenClaims};

/// Signs and verifies one kind of token with its own secret and lifetime
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    pub ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::default();
        // Expired means expired; no grace period
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Creates a signed token for the given account id
    #[instrument(skip(self))]
    pub fn issue(&self, account_id: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = (now + self.ttl).timestamp().max(0) as usize;

        debug!(
            ttl_seconds = self.ttl.num_seconds(),
            exp_timestamp = exp,
            "Creating JWT token with expiration"
        );

        let claims = TokenClaims {
            sub: account_id.to_string(),
            exp,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AuthError::TokenIssuanceFailed
        })
    }

    /// Verifies signature and expiry, returning the claims if valid
    #[instrument(skip(self, token))]
    pub fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| {
                debug!(account_id = %data.claims.sub, exp = data.claims.exp, "JWT token decoded successfully");
                data.claims
            })
            .map_err(|e| {
                debug!(error = %e, "Failed to decode JWT token");
                AuthError::InvalidToken
            })
    }
}
