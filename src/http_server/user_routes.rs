//! User HTTP Routes
//!
//! Signup and login are public; changing or removing a user needs an admin token.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::HeaderMap,
    routing::{post, put},
    Router,
};
use serde::Serialize;

use crate::api::{method_not_allowed, ApiError, ApiResult, ResponseEnvelope, RouteRequirement};
use crate::auth::crypto::hash_password;
use crate::auth::user::{LoginRequest, SignupRequest, UpdateUserRequest, UserPatch};
use crate::auth::{AuthError, Role, TokenResponse, User};
use crate::schema::catalog;

use super::state::AppState;

pub const SIGNUP: RouteRequirement = RouteRequirement::public().with_body(catalog::USER_SIGNUP);
pub const LOGIN: RouteRequirement = RouteRequirement::public().with_body(catalog::USER_LOGIN);
pub const UPDATE: RouteRequirement = RouteRequirement::role(Role::Admin).with_body(catalog::USER_UPDATE);
pub const DELETE: RouteRequirement = RouteRequirement::role(Role::Admin);

pub const REQUIREMENTS: &[RouteRequirement] = &[SIGNUP, LOGIN, UPDATE, DELETE];

/// User routes with shared state
pub fn user_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/signup", post(signup_handler).fallback(method_not_allowed))
        .route("/login", post(login_handler).fallback(method_not_allowed))
        .route(
            "/user/:id",
            put(update_handler).delete(delete_handler).fallback(method_not_allowed),
        )
        .with_state(state)
}

// ==================
// Response Types
// ==================

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub token: TokenResponse,
    pub user: User,
}

// ==================
// Handlers
// ==================

/// Signup handler
async fn signup_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<ResponseEnvelope<User>> {
    state.gate.admit(&headers, &SIGNUP)?;
    let request: SignupRequest = state
        .gate
        .accept(&SIGNUP, &body?)?
        .into_typed()
        .map_err(ApiError::internal)?;

    let password_hash = hash_password(&request.password)?;
    let user = state.users.create(request.email, password_hash, request.role)?;

    tracing::info!(user_id = user.id, role = %user.role, "user signed up");
    Ok(ResponseEnvelope::created(user).with_message("User created successfully"))
}

/// Login handler
async fn login_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<ResponseEnvelope<LoginResponse>> {
    state.gate.admit(&headers, &LOGIN)?;
    let request: LoginRequest = state
        .gate
        .accept(&LOGIN, &body?)?
        .into_typed()
        .map_err(ApiError::internal)?;

    let user = state
        .users
        .find_by_email(&request.email)?
        .ok_or(AuthError::InvalidCredentials)?;

    if !user.verify_password(&request.password)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let token = state.jwt.issue(user.id, user.role)?;
    let response = LoginResponse {
        token: TokenResponse::bearer(token, state.jwt.token_ttl()),
        user,
    };

    Ok(ResponseEnvelope::ok(response).with_message("Login successful"))
}

/// Update a user's email, password or role
async fn update_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<ResponseEnvelope<User>> {
    let ctx = state.gate.admit(&headers, &UPDATE)?;
    let id = state.gate.path_id(&id)?;
    let request: UpdateUserRequest = state
        .gate
        .accept(&UPDATE, &body?)?
        .into_typed()
        .map_err(ApiError::internal)?;

    let user = state.users.update(id, UserPatch::from_request(request)?)?;
    tracing::info!(
        request_id = %ctx.request_id,
        user_id = id,
        elapsed_ms = ctx.elapsed_ms(),
        "user updated"
    );
    Ok(ResponseEnvelope::ok(user).with_message("User updated successfully"))
}

/// Delete a user
async fn delete_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<ResponseEnvelope<()>> {
    let ctx = state.gate.admit(&headers, &DELETE)?;
    let id = state.gate.path_id(&id)?;

    state.users.delete(id)?;
    tracing::info!(
        request_id = %ctx.request_id,
        user_id = id,
        elapsed_ms = ctx.elapsed_ms(),
        "user deleted"
    );

    Ok(ResponseEnvelope::acknowledged("User deleted successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_auth_routes_are_public() {
        assert!(!SIGNUP.requires_auth());
        assert!(!LOGIN.requires_auth());
        assert_eq!(UPDATE.required_role(), Some(Role::Admin));
        assert_eq!(DELETE.required_role(), Some(Role::Admin));
    }

    #[test]
    fn test_login_response_shape() {
        let user = User {
            id: 1,
            email: "ada@example.com".to_string(),
            role: Role::User,
            password_hash: "hash".to_string(),
            created_at: chrono::Utc::now(),
        };
        let response = LoginResponse {
            token: TokenResponse::bearer("abc".to_string(), Duration::seconds(60)),
            user,
        };
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["token"], "abc");
        assert_eq!(json["tokenType"], "Bearer");
        assert_eq!(json["expiresIn"], 60);
        assert_eq!(json["user"]["email"], "ada@example.com");
        assert!(json["user"].get("passwordHash").is_none());
    }
}
