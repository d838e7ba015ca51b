use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Env;

// --- Module Structure ---

// Domain model and error taxonomy.
pub mod error;
pub mod models;

// Authorization core: identity, visibility, rules and ownership stamping.
pub mod attribution;
pub mod auth;
pub mod policy;
pub mod scope;

// Persistence and runtime plumbing.
pub mod config;
pub mod memory;
pub mod repository;

// Client operations composed from the pieces above.
pub mod handlers;

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AuthzError;
pub use memory::MemoryRepository;
pub use repository::{PostgresRepository, RepositoryState};

/// AppState
///
/// Shared, cheaply clonable container for the services every operation needs.
#[derive(Clone)]
pub struct AppState {
    /// Course graph storage (Postgres in production, in-memory in tests).
    pub repo: RepositoryState,
    /// Loaded environment configuration.
    pub config: AppConfig,
}

/// init_tracing
///
/// Installs the global subscriber: pretty output locally, JSON in production.
/// `RUST_LOG` overrides the default filter. Calling it twice is a no-op.
pub fn init_tracing(config: &AppConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "course_acl=debug,sqlx=warn".into());

    let result = match config.env {
        Env::Local => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        Env::Production => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
