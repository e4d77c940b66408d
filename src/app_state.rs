//! Application state management.
//!
//! This module defines the shared state structure that gets passed to all
//! Axum handlers via the `State` extractor. The `AppState` contains shared
//! resources like the credential store, metrics implementation, and the
//! credential verifier with its hashing and token-signing collaborators.
//!
//! The state is designed to be cheaply cloneable (using `Arc` internally
//! where needed) so it can be passed efficiently to each request handler
//! without expensive copying of resources.

use crate::domain::{MetricsPtr, RepositoryPtr};
use crate::verifier::CredentialVerifier;
use std::sync::Arc;

/// Shared application state passed to all Axum handlers.
///
/// This struct serves as the Dependency Injection container for the application.
/// It holds all shared resources needed by HTTP handlers and is cloned cheaply
/// for each request via Axum's `State` extractor.
///
/// # Design Principles
///
/// - **Dependency Inversion**: Handlers depend on abstractions (Repository trait),
///   not concrete implementations (PostgresRepository or the in-memory store).
/// - **Immutable After Initialization**: State is built once at startup and
///   never mutated. Handlers create new connections/transactions per request.
/// - **Cheap Cloning**: All heavy resources are wrapped in `Arc`, making the
///   struct efficiently cloneable.
///
/// # Lifecycle
///
/// 1. Created once in `create_router()` during application startup
/// 2. Attached to the Axum router via `.with_state(app_state)`
/// 3. Cloned automatically by Axum for each incoming HTTP request
/// 4. Handlers extract via `State(state): State<AppState>`
#[derive(Clone)]
pub(crate) struct AppState {
    /// Protocol state machine for registration and the login flows.
    ///
    /// Owns the hasher and session issuer; handlers never touch either
    /// directly.
    verifier: Arc<CredentialVerifier>,

    /// Repository abstraction for persistent storage.
    ///
    /// Used directly by the profile/admin handlers; the verifier holds its
    /// own reference for the protocol operations.
    repository: RepositoryPtr,

    /// Metrics implementation for recording application events.
    ///
    /// Either Prometheus-backed (production) or no-op (testing/development).
    metrics: MetricsPtr,
}

impl AppState {
    // ---

    pub fn new(
        verifier: Arc<CredentialVerifier>,
        repository: RepositoryPtr,
        metrics: MetricsPtr,
    ) -> Self {
        // ---
        AppState {
            verifier,
            repository,
            metrics,
        }
    }

    /// Get a reference to the credential verifier.
    pub(crate) fn verifier(&self) -> &CredentialVerifier {
        // ---
        &self.verifier
    }

    /// Get a reference to the repository implementation.
    pub(crate) fn repository(&self) -> &RepositoryPtr {
        // ---
        &self.repository
    }

    /// Get a reference to the metrics implementation.
    pub(crate) fn metrics(&self) -> &MetricsPtr {
        // ---
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    // ---

    use super::*;
    use crate::hasher::SecretHasher;
    use crate::infrastructure::{create_memory_repository, create_noop_metrics};
    use crate::session::SessionIssuer;

    #[test]
    fn test_app_state_creation_and_clone() {
        // ---
        // Test basic creation and that Clone works
        let repository = create_memory_repository();
        let metrics = create_noop_metrics().unwrap();
        let verifier = Arc::new(CredentialVerifier::new(
            repository.clone(),
            SecretHasher::new(4),
            SessionIssuer::new(b"state-test-secret".to_vec(), chrono::Duration::days(30)),
            15,
        ));

        let app_state = AppState::new(verifier, repository, metrics);
        let _cloned = app_state.clone();

        // Verify accessors work
        let _verifier_ref = app_state.verifier();
        let _repo_ref = app_state.repository();
        let _metrics_ref = app_state.metrics();
    }
}
