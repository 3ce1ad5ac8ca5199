//! Repository trait definitions
//!
//! These traits define the contract for data access used by the CRUD
//! surface around the borrowing core. Implementations live in the
//! infrastructure layer.

use async_trait::async_trait;

use super::LifecycleError;
use crate::models::user::Role;
use crate::models::{book, user};

/// Filter criteria for catalog queries
#[derive(Debug, Default, Clone)]
pub struct BookFilter {
    pub genre: Option<String>,
    pub is_digital: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Paginated result with total count
#[derive(Debug)]
pub struct PaginatedBooks {
    pub books: Vec<book::Model>,
    pub total: u64,
}

/// Input for adding a book to the catalog
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CreateBookInput {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub publication_year: i32,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub quantity: i32,
    #[serde(default)]
    pub is_digital: bool,
    pub digital_link: Option<String>,
}

/// Input for updating catalog fields of a book. Quantity changes do not go
/// through here; they are ledger operations (see services::inventory_service).
#[derive(Debug, Default, Clone, serde::Deserialize)]
pub struct UpdateBookInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub publication_year: Option<i32>,
    pub description: Option<Option<String>>,
    pub cover_image: Option<Option<String>>,
    pub is_digital: Option<bool>,
    pub digital_link: Option<Option<String>>,
}

/// Repository trait for the Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Find all books matching the filter criteria with pagination support
    async fn find_all(&self, filter: BookFilter) -> Result<PaginatedBooks, LifecycleError>;

    /// Find a single book by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<book::Model>, LifecycleError>;

    /// Find a book by its ISBN (used for duplicate detection)
    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<book::Model>, LifecycleError>;

    /// Add a new book; available copies start equal to the quantity
    async fn create(&self, input: CreateBookInput) -> Result<book::Model, LifecycleError>;

    /// Update catalog fields of an existing book
    async fn update(&self, id: i32, input: UpdateBookInput) -> Result<book::Model, LifecycleError>;

    /// Delete a book by ID
    async fn delete(&self, id: i32) -> Result<(), LifecycleError>;
}

/// Input for creating a user account
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Input for administrative user updates
#[derive(Debug, Default, Clone)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
}

/// Repository trait for the User entity
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find all users
    async fn find_all(&self) -> Result<Vec<user::Model>, LifecycleError>;

    /// Find a user by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<user::Model>, LifecycleError>;

    /// Find a user by email (login, duplicate detection)
    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, LifecycleError>;

    /// Create a new user
    async fn create(&self, input: CreateUserInput) -> Result<user::Model, LifecycleError>;

    /// Update an existing user
    async fn update(&self, id: i32, input: UpdateUserInput) -> Result<user::Model, LifecycleError>;

    /// Delete a user by ID
    async fn delete(&self, id: i32) -> Result<(), LifecycleError>;
}
