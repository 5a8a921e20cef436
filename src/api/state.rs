//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database};
use crate::services::{ServiceContainer, Services};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    /// Hospital services
    pub services: Arc<dyn ServiceContainer>,
    /// Redis cache; rate limiting is off without it
    pub cache: Option<Arc<Cache>>,
    /// Database handle for health checks
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(database: Arc<Database>, cache: Option<Arc<Cache>>, config: Config) -> Self {
        let services = Arc::new(Services::from_connection(
            database.get_connection(),
            config,
        ));

        Self {
            services,
            cache,
            database: Some(database),
        }
    }

    /// Create state around an existing container (used by tests).
    pub fn new(services: Arc<dyn ServiceContainer>) -> Self {
        Self {
            services,
            cache: None,
            database: None,
        }
    }
}
