use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle states of a borrowing record. `Returned` is terminal;
/// `Requested` is reserved in the schema but records are always created
/// directly in `Borrowed`. `Overdue` is set by an external sweep and is
/// treated like `Borrowed` at return time.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
#[serde(rename_all = "lowercase")]
pub enum BorrowingStatus {
    #[sea_orm(string_value = "requested")]
    Requested,
    #[sea_orm(string_value = "borrowed")]
    Borrowed,
    #[sea_orm(string_value = "overdue")]
    Overdue,
    #[sea_orm(string_value = "returned")]
    Returned,
}

impl BorrowingStatus {
    /// Non-terminal statuses. A (user, book) pair may hold at most one
    /// record in any of these.
    pub const ACTIVE: [BorrowingStatus; 3] = [
        BorrowingStatus::Requested,
        BorrowingStatus::Borrowed,
        BorrowingStatus::Overdue,
    ];

    pub fn is_active(&self) -> bool {
        !matches!(self, BorrowingStatus::Returned)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "borrowings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrow_date: String,
    /// Supplied by the borrower at creation; must not predate the borrow.
    pub expected_return_date: String,
    /// Set exactly once, when the record transitions to `Returned`.
    pub actual_return_date: Option<String>,
    pub status: BorrowingStatus,
    /// Computed at return time from full days late, never negative.
    pub fine_amount: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Book,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
