use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub genre: String,
    pub publication_year: i32,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    /// Total number of copies owned by the library. Always >= 1.
    pub quantity: i32,
    /// Copies currently on the shelf. Maintained by the inventory ledger:
    /// 0 <= available_copies <= quantity, and for physical books equals
    /// quantity minus the number of active borrowings.
    pub available_copies: i32,
    /// Digital titles have unlimited concurrent access and never pass
    /// through the ledger.
    pub is_digital: bool,
    pub digital_link: Option<String>,
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
