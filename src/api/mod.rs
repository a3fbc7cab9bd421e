//! API Layer for gatekeep
//!
//! Sits between the router and the handlers. Owns the gate that admits
//! requests, the envelope every response is wrapped in, and the single
//! translator from internal failures to HTTP errors.
//!
//! # Design Principles
//!
//! - Authentication before authorization before validation
//! - 401 and 403 are never collapsed
//! - Internal details never reach the client
//! - One response shape for success and failure

mod errors;
mod gate;
mod response;

pub use errors::{method_not_allowed, panic_response, route_not_found, ApiError, ApiResult, INTERNAL_MESSAGE};
pub use gate::{Gate, RouteRequirement};
pub use response::ResponseEnvelope;
