//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::{
    BookFilter, BookRepository, CreateBookInput, LifecycleError, PaginatedBooks, UpdateBookInput,
};
use crate::models::book::{self, ActiveModel, Column, Entity as BookEntity};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn find_all(&self, filter: BookFilter) -> Result<PaginatedBooks, LifecycleError> {
        let mut query = BookEntity::find();

        if let Some(genre) = filter.genre {
            query = query.filter(Column::Genre.eq(genre));
        }
        if let Some(is_digital) = filter.is_digital {
            query = query.filter(Column::IsDigital.eq(is_digital));
        }

        let query = query.order_by_desc(Column::CreatedAt);
        let total = query.clone().count(&self.db).await?;

        let page = filter.page.unwrap_or(1).max(1);
        let limit = filter.limit.unwrap_or(50).max(1);
        let books = query
            .paginate(&self.db, limit)
            .fetch_page(page - 1)
            .await?;

        Ok(PaginatedBooks { books, total })
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<book::Model>, LifecycleError> {
        Ok(BookEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_isbn(&self, isbn: &str) -> Result<Option<book::Model>, LifecycleError> {
        Ok(BookEntity::find()
            .filter(Column::Isbn.eq(isbn))
            .one(&self.db)
            .await?)
    }

    async fn create(&self, input: CreateBookInput) -> Result<book::Model, LifecycleError> {
        let now = chrono::Utc::now().to_rfc3339();

        let new_book = ActiveModel {
            title: Set(input.title),
            author: Set(input.author),
            isbn: Set(input.isbn),
            genre: Set(input.genre),
            publication_year: Set(input.publication_year),
            description: Set(input.description),
            cover_image: Set(input.cover_image),
            quantity: Set(input.quantity),
            // A new title starts with every copy on the shelf
            available_copies: Set(input.quantity),
            is_digital: Set(input.is_digital),
            digital_link: Set(input.digital_link),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(new_book.insert(&self.db).await?)
    }

    async fn update(
        &self,
        id: i32,
        input: UpdateBookInput,
    ) -> Result<book::Model, LifecycleError> {
        let existing = BookEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        let mut active: ActiveModel = existing.into();

        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(author) = input.author {
            active.author = Set(author);
        }
        if let Some(isbn) = input.isbn {
            active.isbn = Set(isbn);
        }
        if let Some(genre) = input.genre {
            active.genre = Set(genre);
        }
        if let Some(year) = input.publication_year {
            active.publication_year = Set(year);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(cover_image) = input.cover_image {
            active.cover_image = Set(cover_image);
        }
        if let Some(is_digital) = input.is_digital {
            active.is_digital = Set(is_digital);
        }
        if let Some(digital_link) = input.digital_link {
            active.digital_link = Set(digital_link);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        Ok(active.update(&self.db).await?)
    }

    async fn delete(&self, id: i32) -> Result<(), LifecycleError> {
        let result = BookEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(LifecycleError::NotFound);
        }

        Ok(())
    }
}
