// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod admin;
mod auth;
mod health;
mod metrics;
mod root;
mod shared_types;
mod users;

// Core handlers
pub use health::health_check;
pub use metrics::{metrics_handler, track_metrics};
pub use root::root_handler;

// Authentication protocol handlers
pub use auth::{login, logout, me, register, verify_color, verify_graphical, verify_sport};

// User administration handlers
pub use users::{delete_user, get_user, list_users, update_profile};

// Admin dashboard handlers
pub use admin::user_stats;

// Shared response types
pub use shared_types::ErrorResponse;
