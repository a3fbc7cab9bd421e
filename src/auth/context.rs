//! Request Context
//!
//! Per-request state produced by the guards. Owned exclusively by one
//! request's handling path.

use std::time::Instant;

use uuid::Uuid;

use super::principal::Principal;

/// Where the request stands in the authentication state machine.
///
/// `NoIdentity -> (verifying) -> Authenticated | Rejected`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    /// No guard has run, or the route is public
    #[default]
    NoIdentity,
    /// Token verified
    Authenticated(Principal),
    /// Token presented but refused
    Rejected,
}

/// Context carried from the guards into the handler
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request ID for log correlation
    pub request_id: Uuid,

    identity: Identity,

    started_at: Instant,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            identity: Identity::NoIdentity,
            started_at: Instant::now(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The attached principal, if authentication succeeded
    pub fn principal(&self) -> Option<&Principal> {
        match &self.identity {
            Identity::Authenticated(principal) => Some(principal),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal().is_some()
    }

    pub(crate) fn attach(&mut self, principal: Principal) {
        self.identity = Identity::Authenticated(principal);
    }

    pub(crate) fn reject(&mut self) {
        self.identity = Identity::Rejected;
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
