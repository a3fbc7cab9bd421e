//! Shared application state
//!
//! Built once at startup and shared across handlers behind an `Arc`.

use std::sync::Arc;

use crate::api::{Gate, RouteRequirement};
use crate::auth::{InMemoryUserRepository, JwtConfig, JwtManager, UserRepository};
use crate::schema::{catalog, SchemaResult};
use crate::storage::{InMemoryProductRepository, ProductRepository};

use super::{product_routes, user_routes};

pub struct AppState {
    pub gate: Gate,
    pub jwt: Arc<JwtManager>,
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// Build the schema catalog and check every route against it.
    ///
    /// A malformed or missing schema fails here, before any request is served.
    pub fn new(
        jwt_config: JwtConfig,
        products: Arc<dyn ProductRepository>,
        users: Arc<dyn UserRepository>,
    ) -> SchemaResult<Self> {
        let jwt = Arc::new(JwtManager::new(jwt_config));
        let gate = Gate::new(jwt.clone(), Arc::new(catalog::registry()?));

        gate.check_requirements(Self::requirements())?;

        Ok(Self {
            gate,
            jwt,
            products,
            users,
        })
    }

    /// State backed by the in-memory repositories
    pub fn in_memory(jwt_config: JwtConfig) -> SchemaResult<Self> {
        Self::new(
            jwt_config,
            Arc::new(InMemoryProductRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        )
    }

    fn requirements() -> impl Iterator<Item = &'static RouteRequirement> {
        product_routes::REQUIREMENTS
            .iter()
            .chain(user_routes::REQUIREMENTS.iter())
    }
}
