//! SeaORM implementation of UserRepository

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

use crate::domain::{CreateUserInput, LifecycleError, UpdateUserInput, UserRepository};
use crate::models::user::{self, ActiveModel, Column, Entity as UserEntity};

/// SeaORM-based implementation of UserRepository
pub struct SeaOrmUserRepository {
    db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn find_all(&self) -> Result<Vec<user::Model>, LifecycleError> {
        Ok(UserEntity::find().all(&self.db).await?)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<user::Model>, LifecycleError> {
        Ok(UserEntity::find_by_id(id).one(&self.db).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, LifecycleError> {
        Ok(UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn create(&self, input: CreateUserInput) -> Result<user::Model, LifecycleError> {
        let now = chrono::Utc::now().to_rfc3339();

        let new_user = ActiveModel {
            name: Set(input.name),
            email: Set(input.email),
            password_hash: Set(input.password_hash),
            role: Set(input.role),
            borrowed_books: Set("[]".to_owned()),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        Ok(new_user.insert(&self.db).await?)
    }

    async fn update(
        &self,
        id: i32,
        input: UpdateUserInput,
    ) -> Result<user::Model, LifecycleError> {
        let existing = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        let mut active: ActiveModel = existing.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(password_hash) = input.password_hash {
            active.password_hash = Set(password_hash);
        }
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        active.updated_at = Set(chrono::Utc::now().to_rfc3339());

        Ok(active.update(&self.db).await?)
    }

    async fn delete(&self, id: i32) -> Result<(), LifecycleError> {
        let result = UserEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(LifecycleError::NotFound);
        }

        Ok(())
    }
}
