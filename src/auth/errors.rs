//! # Auth Errors
//!
//! Error types for the authentication and authorization guards.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
///
/// Messages are fixed strings: nothing from the verification internals is
/// echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // ==================
    // Authentication Errors (401)
    // ==================
    /// No `authorization` header, a scheme other than `Bearer`, or an empty token
    #[error("Authorization header missing or malformed")]
    MissingOrMalformed,

    /// Signature mismatch, undecodable token, or expiry in the past
    #[error("Invalid or expired token")]
    InvalidOrExpired,

    /// Login with unknown email or wrong password; both read the same
    #[error("Invalid credentials")]
    InvalidCredentials,

    // ==================
    // Authorization Errors (403)
    // ==================
    /// Authenticated, but the role does not match the route's requirement
    #[error("Insufficient role for this operation")]
    Forbidden,

    // ==================
    // Internal Errors (500)
    // ==================
    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    /// Token signing failed
    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingOrMalformed => 401,
            AuthError::InvalidOrExpired => 401,
            AuthError::InvalidCredentials => 401,

            AuthError::Forbidden => 403,

            AuthError::HashingFailed => 500,
            AuthError::TokenGenerationFailed => 500,
        }
    }

    /// "Who are you" failures, as opposed to "you may not"
    pub fn is_unauthenticated(&self) -> bool {
        self.status_code() == 401
    }

    /// Returns whether this error is the caller's fault
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
