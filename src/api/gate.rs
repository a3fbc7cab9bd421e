//! # Request Gate
//!
//! Runs a route's static requirements against an inbound request, in order:
//! authentication, authorization, then payload validation. The first failing
//! stage short-circuits with its own error kind.

use std::sync::Arc;

use axum::http::HeaderMap;
use serde_json::{json, Value};

use crate::auth::{AuthenticationGuard, AuthorizationGuard, JwtManager, RequestContext, Role};
use crate::schema::{
    catalog, SchemaRef, SchemaRegistry, SchemaResult, SchemaValidator, ValidatedPayload, ValidationError,
};

use super::errors::{ApiError, ApiResult};

/// Static per-endpoint metadata.
///
/// Built only through the `const` constructors, so a required role always
/// implies required authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteRequirement {
    requires_auth: bool,
    required_role: Option<Role>,
    body_schema: Option<SchemaRef>,
}

impl RouteRequirement {
    /// Anyone may call
    pub const fn public() -> Self {
        Self {
            requires_auth: false,
            required_role: None,
            body_schema: None,
        }
    }

    /// Any valid token
    pub const fn authenticated() -> Self {
        Self {
            requires_auth: true,
            required_role: None,
            body_schema: None,
        }
    }

    /// Valid token carrying exactly `role`
    pub const fn role(role: Role) -> Self {
        Self {
            requires_auth: true,
            required_role: Some(role),
            body_schema: None,
        }
    }

    pub const fn with_body(mut self, schema: SchemaRef) -> Self {
        self.body_schema = Some(schema);
        self
    }

    pub fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    pub fn required_role(&self) -> Option<Role> {
        self.required_role
    }

    pub fn body_schema(&self) -> Option<SchemaRef> {
        self.body_schema
    }
}

/// Guards plus schemas, shared by every handler
#[derive(Clone)]
pub struct Gate {
    authorization: AuthorizationGuard,
    schemas: Arc<SchemaRegistry>,
}

impl Gate {
    pub fn new(verifier: Arc<JwtManager>, schemas: Arc<SchemaRegistry>) -> Self {
        Self {
            authorization: AuthorizationGuard::new(AuthenticationGuard::new(verifier)),
            schemas,
        }
    }

    /// Startup check: every referenced body schema exists
    pub fn check_requirements<'r>(
        &self,
        requirements: impl IntoIterator<Item = &'r RouteRequirement>,
    ) -> SchemaResult<()> {
        let refs: Vec<_> = requirements.into_iter().filter_map(|r| r.body_schema).collect();
        self.schemas.ensure_registered(&refs)?;
        self.schemas.ensure_registered(&[catalog::PATH_ID])
    }

    /// Run the guards the route asks for and hand back the request context
    pub fn admit(&self, headers: &HeaderMap, requirement: &RouteRequirement) -> ApiResult<RequestContext> {
        let mut ctx = RequestContext::new();

        if !requirement.requires_auth {
            return Ok(ctx);
        }

        match requirement.required_role {
            Some(role) => self.authorization.admit(headers, &mut ctx, role)?,
            None => self.authorization.authentication().authenticate(headers, &mut ctx)?,
        }

        Ok(ctx)
    }

    /// Parse the raw body and validate it against the route's schema
    pub fn accept(&self, requirement: &RouteRequirement, body: &[u8]) -> ApiResult<ValidatedPayload> {
        let schema = requirement
            .body_schema
            .ok_or_else(|| ApiError::internal("route declares no body schema"))?;

        let payload = parse_body(body)?;
        self.validate(schema, &payload)
    }

    /// Validate an already-parsed value against a named schema
    pub fn validate(&self, schema: SchemaRef, payload: &Value) -> ApiResult<ValidatedPayload> {
        let outcome = SchemaValidator::new(&self.schemas).validate(schema, payload)?;
        outcome.map_err(ApiError::ValidationFailed)
    }

    /// Validate a numeric `:id` path segment
    pub fn path_id(&self, raw: &str) -> ApiResult<i64> {
        self.validate(catalog::PATH_ID, &json!({ "id": raw }))?;

        raw.parse::<i64>().map_err(|_| {
            ApiError::ValidationFailed(vec![ValidationError::field("id", "ID must be a valid number")])
        })
    }
}

fn parse_body(body: &[u8]) -> ApiResult<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::ValidationFailed(vec![ValidationError::payload(
            "The request body is required.",
        )]));
    }

    serde_json::from_slice(body).map_err(|e| {
        ApiError::ValidationFailed(vec![ValidationError::payload(format!(
            "The request body is not valid JSON: {}",
            e
        ))])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthError, JwtConfig};
    use axum::http::{header::AUTHORIZATION, HeaderValue};

    const ADMIN_ONLY: RouteRequirement = RouteRequirement::role(Role::Admin).with_body(catalog::PRODUCT_CREATE);

    fn gate() -> (Arc<JwtManager>, Gate) {
        let verifier = Arc::new(JwtManager::new(JwtConfig::new("gate_test_secret")));
        let schemas = Arc::new(catalog::registry().unwrap());
        (verifier.clone(), Gate::new(verifier, schemas))
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_role_implies_auth() {
        let req = RouteRequirement::role(Role::User);
        assert!(req.requires_auth());
        assert_eq!(req.required_role(), Some(Role::User));
        assert!(!RouteRequirement::public().requires_auth());
    }

    #[test]
    fn test_public_route_skips_guards() {
        let (_, gate) = gate();
        let ctx = gate.admit(&HeaderMap::new(), &RouteRequirement::public()).unwrap();
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn test_missing_token_is_unauthenticated() {
        let (_, gate) = gate();
        let err = gate.admit(&HeaderMap::new(), &ADMIN_ONLY).unwrap_err();
        assert_eq!(err, ApiError::Unauthenticated(AuthError::MissingOrMalformed));
    }

    #[test]
    fn test_wrong_role_is_forbidden() {
        let (verifier, gate) = gate();
        let token = verifier.issue(2, Role::User).unwrap();
        let err = gate.admit(&bearer(&token), &ADMIN_ONLY).unwrap_err();
        assert_eq!(err, ApiError::Forbidden);
    }

    #[test]
    fn test_authenticated_route_accepts_any_role() {
        let (verifier, gate) = gate();
        let token = verifier.issue(2, Role::User).unwrap();
        let ctx = gate.admit(&bearer(&token), &RouteRequirement::authenticated()).unwrap();
        assert_eq!(ctx.principal().unwrap().subject_id, 2);
    }

    #[test]
    fn test_accept_reports_all_violations() {
        let (_, gate) = gate();
        let err = gate
            .accept(&ADMIN_ONLY, br#"{"name": "ab", "price": -5, "category": 1}"#)
            .unwrap_err();
        match err {
            ApiError::ValidationFailed(errors) => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_accept_rejects_bad_json_and_empty_body() {
        let (_, gate) = gate();
        assert!(matches!(gate.accept(&ADMIN_ONLY, b"{not json"), Err(ApiError::ValidationFailed(_))));
        assert!(matches!(gate.accept(&ADMIN_ONLY, b"  "), Err(ApiError::ValidationFailed(_))));
    }

    #[test]
    fn test_accept_without_schema_is_internal() {
        let (_, gate) = gate();
        let err = gate.accept(&RouteRequirement::public(), b"{}").unwrap_err();
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[test]
    fn test_path_id() {
        let (_, gate) = gate();
        assert_eq!(gate.path_id("17").unwrap(), 17);
        assert!(matches!(gate.path_id("abc"), Err(ApiError::ValidationFailed(_))));
        assert!(matches!(
            gate.path_id("99999999999999999999999"),
            Err(ApiError::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_check_requirements_catches_unknown_schema() {
        let (_, gate) = gate();
        let bad = RouteRequirement::public().with_body(SchemaRef::new("nope"));
        assert!(gate.check_requirements(&[ADMIN_ONLY]).is_ok());
        assert!(gate.check_requirements(&[bad]).is_err());
    }
}
