pub mod api;
pub mod domain;
pub mod infrastructure;
pub mod models;
pub mod services;

// Convenience re-exports so binaries and tests can reach the
// infrastructure pieces without the full path.
pub use infrastructure::auth;
pub use infrastructure::config;
pub use infrastructure::db;
