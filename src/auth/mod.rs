//! # Auth Module
//!
//! Bearer token verification, the authentication and authorization guards,
//! and the user store they issue tokens for.

pub mod context;
pub mod crypto;
pub mod errors;
pub mod guard;
pub mod jwt;
pub mod principal;
pub mod user;

pub use context::{Identity, RequestContext};
pub use errors::{AuthError, AuthResult};
pub use guard::{AuthenticationGuard, AuthorizationGuard};
pub use jwt::{JwtConfig, JwtManager, TokenClaims, TokenResponse};
pub use principal::{Principal, Role};
pub use user::{InMemoryUserRepository, User, UserRepository};
