//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::{BookRepository, UserRepository};
use crate::infrastructure::config::Config;
use crate::infrastructure::{SeaOrmBookRepository, SeaOrmUserRepository};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection (used directly by the borrowing lifecycle)
    db: DatabaseConnection,
    /// Runtime configuration
    pub config: Config,
    /// Book repository
    pub book_repo: Arc<dyn BookRepository>,
    /// User repository
    pub user_repo: Arc<dyn UserRepository>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        let book_repo = Arc::new(SeaOrmBookRepository::new(db.clone()));
        let user_repo = Arc::new(SeaOrmUserRepository::new(db.clone()));

        Self {
            db,
            config,
            book_repo,
            user_repo,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl AsRef<DatabaseConnection> for AppState {
    fn as_ref(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Allow extracting DatabaseConnection from AppState in handlers
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
