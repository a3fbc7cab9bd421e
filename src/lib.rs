//! gatekeep - request gating for a small product and user HTTP API
//!
//! Every request passes token authentication, role authorization and
//! payload validation, in that order, before a handler runs. Every
//! response, success or failure, leaves in the same envelope.

pub mod api;
pub mod auth;
pub mod cli;
pub mod http_server;
pub mod observability;
pub mod schema;
pub mod storage;
