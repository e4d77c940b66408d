mod metrics;
mod models;
mod repository;

// Publicly expose the Metrics abstraction
pub use metrics::{Metrics, MetricsPtr};

// Publicly expose the persistence abstractions
pub use repository::{ProfileUpdate, Repository, RepositoryPtr, StoreError, UserStats};

// Publicly expose the credential record model
pub use models::{
    is_valid_email, normalize_email, GraphicalPassword, Point, Role, User, UserSummary,
    GRAPHICAL_POINT_COUNT,
};
