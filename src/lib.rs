// src/lib.rs
use anyhow::Result;
use app_state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::env;
use std::sync::Arc;

use domain::{MetricsPtr, RepositoryPtr};

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod extract;
mod graphical;
mod handlers;
mod hasher;
mod infrastructure;
mod session;
mod verifier;

// Hoist up only the public symbol(s)
pub use graphical::{points_match, DEFAULT_TOLERANCE_PX};
pub use hasher::{SecretHasher, DEFAULT_HASH_COST};
pub use session::{SessionIssuer, TokenError, DEFAULT_TOKEN_EXPIRY_DAYS};
pub use verifier::{
    AuthError, ColorCheck, ColorCheckInput, CredentialVerifier, GraphicalCheckInput,
    GraphicalPasswordInput, LoginInput, RegisterInput, Session, SportCheck, SportCheckInput,
};

pub use config::*;

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    connect_with_retry, // ---
    create_memory_repository,
    create_noop_metrics,
    create_postgres_repository,
    create_prom_metrics,
};

/// Build the HTTP router against an explicit repository and configuration.
///
/// This is the seam the tests use: the integration suite wires in the
/// in-memory store here so no external services are needed.
pub fn create_router_with(
    repository: RepositoryPtr,
    metrics: MetricsPtr,
    auth: &AuthConfig,
) -> Router {
    // ---
    let verifier = Arc::new(CredentialVerifier::new(
        repository.clone(),
        SecretHasher::new(auth.hash_cost),
        SessionIssuer::new(auth.signing_secret.as_bytes().to_vec(), auth.token_expiry),
        auth.graphical_tolerance_px,
    ));

    let app_state = AppState::new(verifier, repository, metrics);

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest(
            "/api/auth",
            Router::new()
                .route("/register", post(handlers::register))
                .route("/login", post(handlers::login))
                .route("/me", get(handlers::me))
                .route("/logout", get(handlers::logout))
                .route("/verify-color", post(handlers::verify_color))
                .route("/verify-sport", post(handlers::verify_sport))
                .route("/verify-graphical", post(handlers::verify_graphical)),
        )
        .route("/api/users", get(handlers::list_users))
        .route("/api/users/profile", put(handlers::update_profile))
        .route(
            "/api/users/{id}",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        .route("/api/admin/user-stats", get(handlers::user_stats))
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            handlers::track_metrics,
        ))
        .with_state(app_state)
}

/// Build the HTTP router with metrics implementation determined by environment variables.
pub async fn create_router() -> Result<Router> {
    // ---
    // Load all configuration from environment
    let config = AppConfig::from_env()?;

    // Determine metrics implementation from environment
    let metrics_type = env::var("GRAPHPASS_METRICS_TYPE").unwrap_or_else(|_| "noop".to_string());
    let metrics = if metrics_type == "prom" {
        create_prom_metrics()?
    } else {
        create_noop_metrics()?
    };

    tracing_subscriber::fmt::try_init().ok(); // ✅ Ignores if already initialized

    // Create infrastructure dependencies
    let pool = connect_with_retry(&config.database).await?;
    let repository = create_postgres_repository(pool);

    Ok(create_router_with(repository, metrics, &config.auth))
}
