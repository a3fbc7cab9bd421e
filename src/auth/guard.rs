//! # Guards
//!
//! Pre-handler checks. Authorization composes authentication by delegation:
//! the role check only ever looks at a principal the authentication guard
//! attached.

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::context::RequestContext;
use super::errors::{AuthError, AuthResult};
use super::jwt::JwtManager;
use super::principal::Role;

/// Verifies the bearer token and attaches the principal to the context
#[derive(Clone)]
pub struct AuthenticationGuard {
    verifier: Arc<JwtManager>,
}

impl AuthenticationGuard {
    pub fn new(verifier: Arc<JwtManager>) -> Self {
        Self { verifier }
    }

    /// Run the token verifier against the request's `authorization` header.
    ///
    /// A header that is present but not valid UTF-8 counts as malformed.
    pub fn authenticate(&self, headers: &HeaderMap, ctx: &mut RequestContext) -> AuthResult<()> {
        let raw = match headers.get(AUTHORIZATION) {
            None => None,
            Some(value) => Some(value.to_str().map_err(|_| {
                ctx.reject();
                AuthError::MissingOrMalformed
            })?),
        };

        match self.verifier.verify(raw) {
            Ok(principal) => {
                tracing::debug!(
                    request_id = %ctx.request_id,
                    subject = principal.subject_id,
                    role = %principal.role,
                    "authenticated"
                );
                ctx.attach(principal);
                Ok(())
            }
            Err(err) => {
                tracing::debug!(request_id = %ctx.request_id, error = %err, "authentication rejected");
                ctx.reject();
                Err(err)
            }
        }
    }
}

/// Role check layered on top of an [`AuthenticationGuard`]
#[derive(Clone)]
pub struct AuthorizationGuard {
    authentication: AuthenticationGuard,
}

impl AuthorizationGuard {
    pub fn new(authentication: AuthenticationGuard) -> Self {
        Self { authentication }
    }

    pub fn authentication(&self) -> &AuthenticationGuard {
        &self.authentication
    }

    /// Authenticate, then require `role`
    pub fn admit(&self, headers: &HeaderMap, ctx: &mut RequestContext, role: Role) -> AuthResult<()> {
        self.authentication.authenticate(headers, ctx)?;
        Self::authorize(ctx, role)
    }

    /// Compare the attached principal's role with `required`.
    ///
    /// Exact match only. A context without a principal fails closed.
    pub fn authorize(ctx: &RequestContext, required: Role) -> AuthResult<()> {
        let principal = ctx.principal().ok_or(AuthError::Forbidden)?;

        if principal.has_role(required) {
            Ok(())
        } else {
            tracing::debug!(
                request_id = %ctx.request_id,
                subject = principal.subject_id,
                role = %principal.role,
                required = %required,
                "authorization denied"
            );
            Err(AuthError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::context::Identity;
    use crate::auth::jwt::JwtConfig;
    use axum::http::HeaderValue;

    fn guards() -> (Arc<JwtManager>, AuthorizationGuard) {
        let manager = Arc::new(JwtManager::new(JwtConfig::new("guard_test_secret")));
        let guard = AuthorizationGuard::new(AuthenticationGuard::new(manager.clone()));
        (manager, guard)
    }

    fn headers_with(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_authenticate_attaches_principal() {
        let (manager, guard) = guards();
        let token = manager.issue(11, Role::User).unwrap();

        let mut ctx = RequestContext::new();
        guard
            .authentication()
            .authenticate(&headers_with(&token), &mut ctx)
            .unwrap();

        assert_eq!(ctx.principal().unwrap().subject_id, 11);
    }

    #[test]
    fn test_missing_header_is_unauthenticated_not_forbidden() {
        let (_, guard) = guards();
        let mut ctx = RequestContext::new();

        let err = guard.admit(&HeaderMap::new(), &mut ctx, Role::Admin).unwrap_err();
        assert_eq!(err, AuthError::MissingOrMalformed);
        assert_eq!(ctx.identity(), &Identity::Rejected);
    }

    #[test]
    fn test_admin_token_passes_admin_route() {
        let (manager, guard) = guards();
        let token = manager.issue(1, Role::Admin).unwrap();

        let mut ctx = RequestContext::new();
        assert!(guard.admit(&headers_with(&token), &mut ctx, Role::Admin).is_ok());
    }

    #[test]
    fn test_admin_token_forbidden_on_user_route() {
        let (manager, guard) = guards();
        let token = manager.issue(1, Role::Admin).unwrap();

        let mut ctx = RequestContext::new();
        let err = guard.admit(&headers_with(&token), &mut ctx, Role::User).unwrap_err();
        assert_eq!(err, AuthError::Forbidden);
        // identity stays attached: authenticated but not allowed
        assert!(ctx.is_authenticated());
    }

    #[test]
    fn test_authorize_without_principal_fails_closed() {
        let ctx = RequestContext::new();
        assert_eq!(
            AuthorizationGuard::authorize(&ctx, Role::User),
            Err(AuthError::Forbidden)
        );
    }

    #[test]
    fn test_non_utf8_header_is_malformed() {
        let (_, guard) = guards();
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer \xff").unwrap());

        let mut ctx = RequestContext::new();
        let err = guard.authentication().authenticate(&headers, &mut ctx).unwrap_err();
        assert_eq!(err, AuthError::MissingOrMalformed);
    }
}
