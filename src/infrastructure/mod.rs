mod database;
mod memory_repository;
pub mod metrics;

// Re-export the factory functions for easy access
pub use database::{connect_with_retry, create_postgres_repository};
pub use memory_repository::create_memory_repository;
pub use metrics::{create_noop_metrics, create_prom_metrics};
