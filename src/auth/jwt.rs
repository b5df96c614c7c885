use crate::types::{AppError, Claims, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

/// Default session lifetime: one day.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 86_400;

/// Why a presented token was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => {
                AppError::Auth("Token verification failed. Token expired.".to_string())
            }
            TokenError::InvalidSignature | TokenError::Malformed => {
                AppError::Auth("Token verification failed. Invalid token.".to_string())
            }
        }
    }
}

/// Issues and verifies HS256 session tokens.
///
/// Tokens are stateless: nothing is stored server side, so a token stays
/// valid until its `exp` claim passes.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: i64,
}

impl TokenService {
    /// Creates a token service.
    ///
    /// # Arguments
    /// * `secret` - Signing secret, resolved from configuration at startup
    /// * `ttl` - Token validity in seconds
    pub fn new(secret: &str, ttl: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Mints a token bound to `user_id`.
    pub fn issue(&self, user_id: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.ttl)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Checks signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })
    }
}
