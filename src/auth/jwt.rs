//! # Token Verifier
//!
//! Signs and verifies the bearer tokens presented in the `authorization`
//! header.
//!
//! ## Invariants
//! - Stateless verification (no storage lookup)
//! - Every guard goes through [`JwtManager::verify`]
//! - The signing secret is fixed once the manager is built

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::errors::{AuthError, AuthResult};
use super::principal::{Principal, Role};

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;

const BEARER_PREFIX: &str = "Bearer ";

/// Claims embedded in every access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    #[serde(rename = "userId")]
    pub user_id: i64,

    pub role: Role,

    /// Issued at (Unix epoch seconds)
    pub iat: i64,

    /// Expiration (Unix epoch seconds)
    pub exp: i64,
}

/// Signing configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret for HS256
    pub secret: String,

    /// Access token lifetime
    pub token_ttl: Duration,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }
}

/// JWT manager for token issuance and verification
#[derive(Clone)]
pub struct JwtManager {
    token_ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtManager {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            token_ttl: config.token_ttl,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Sign a token for the given subject
    pub fn issue(&self, subject_id: i64, role: Role) -> AuthResult<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            user_id: subject_id,
            role,
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenGenerationFailed)
    }

    /// Verify a raw `authorization` header value and build the principal.
    ///
    /// `None` means the header was absent.
    pub fn verify(&self, raw_header: Option<&str>) -> AuthResult<Principal> {
        let token = extract_bearer(raw_header)?;
        let claims = self.decode_claims(token)?;

        let issued_at = from_unix(claims.iat)?;
        let expires_at = from_unix(claims.exp)?;

        Ok(Principal {
            subject_id: claims.user_id,
            role: claims.role,
            issued_at,
            expires_at,
        })
    }

    /// Check signature and expiry
    pub fn decode_claims(&self, token: &str) -> AuthResult<TokenClaims> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(kind = ?e.kind(), "token rejected");
                AuthError::InvalidOrExpired
            })
    }

    /// Lifetime of newly issued tokens
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }
}

/// Pull the token out of `Bearer <token>`
fn extract_bearer(raw_header: Option<&str>) -> AuthResult<&str> {
    let header = raw_header.ok_or(AuthError::MissingOrMalformed)?;
    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or(AuthError::MissingOrMalformed)?
        .trim();

    if token.is_empty() || token.contains(' ') {
        return Err(AuthError::MissingOrMalformed);
    }
    Ok(token)
}

fn from_unix(secs: i64) -> AuthResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0).ok_or(AuthError::InvalidOrExpired)
}

/// Token returned to the client at login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl TokenResponse {
    pub fn bearer(token: String, ttl: Duration) -> Self {
        Self {
            token,
            token_type: "Bearer".to_string(),
            expires_in: ttl.num_seconds(),
        }
    }
}
