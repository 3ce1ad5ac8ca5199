use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Closed set of account roles. Stored as lowercase strings, matched
/// exhaustively wherever authorization decisions are made.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "student")]
    Student,
    #[sea_orm(string_value = "librarian")]
    Librarian,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    /// Staff accounts may manage the catalog and act on other users'
    /// borrowings.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Librarian | Role::Admin)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    /// JSON array of book ids the user currently holds. Denormalized from
    /// the active borrowing records and written only in the same
    /// transaction that creates or completes a record.
    pub borrowed_books: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::borrowing::Entity")]
    Borrowings,
}

impl Related<super::borrowing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Borrowings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn borrowed_book_ids(&self) -> Vec<i32> {
        serde_json::from_str(&self.borrowed_books).unwrap_or_default()
    }
}
