use crate::error::AppError;
use crate::models::Account;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Validity window of an issued token.
pub const TOKEN_TTL_HOURS: i64 = 24;

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;
const HMAC_FAMILY: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token, the account id.
    pub sub: i64,
    pub email: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    pub fn for_account(account: &Account) -> Self {
        let now = Utc::now();
        Self {
            sub: account.id,
            email: account.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum TokenError {
    /// The token header names an algorithm outside the HMAC family.
    InvalidSigningMethod,
    /// Malformed, wrongly signed or expired.
    Invalid(jsonwebtoken::errors::Error),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::InvalidSigningMethod => f.write_str("invalid signing method"),
            TokenError::Invalid(e) => write!(f, "invalid token: {}", e),
        }
    }
}

impl std::error::Error for TokenError {}

/// Signing and verification keys derived once from the configured secret.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = HMAC_FAMILY.to_vec();
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(SIGNING_ALGORITHM), claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Issues a token for `account`, valid for the next 24 hours.
    pub fn issue(&self, account: &Account) -> Result<String, AppError> {
        self.encode(&Claims::for_account(account))
    }

    /// Checks the algorithm family, then signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(TokenError::Invalid)?;
        if !HMAC_FAMILY.contains(&header.alg) {
            return Err(TokenError::InvalidSigningMethod);
        }

        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(TokenError::Invalid)
    }
}
