//! Hospital Management API
//!
//! Multi-tenant REST API for hospitals: onboarding, department hierarchy,
//! staff and role-based permissions, patients, vitals with clinical alerts,
//! prescriptions with pharmacy dispensing, and appointment scheduling.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Hospital entities and the rules that need no database
//! - **services**: Use cases, one service per aggregate
//! - **infra**: PostgreSQL repositories, migrations, Redis and the unit of work
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, Principal};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
