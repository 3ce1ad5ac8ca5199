//! Inventory Ledger - authoritative copy counts per book
//!
//! `available_copies` is a denormalized counter: it never goes negative,
//! never exceeds `quantity`, and for physical books always equals
//! `quantity` minus the number of active borrowings. Only the borrowing
//! lifecycle and administrative quantity edits write it, and both go
//! through this module.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};

use crate::domain::LifecycleError;
use crate::models::book::{self, Column, Entity as Book};

/// Take one copy off the shelf.
///
/// The decrement is a single conditional UPDATE, so two borrowers racing
/// for the last copy cannot both succeed: whoever loses the race matches
/// zero rows and observes `OutOfStock`. Digital titles are never reserved
/// and fall through to the same error.
pub async fn reserve_copy<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
) -> Result<(), LifecycleError> {
    let result = Book::update_many()
        .col_expr(
            Column::AvailableCopies,
            Expr::col(Column::AvailableCopies).sub(1),
        )
        .col_expr(
            Column::UpdatedAt,
            Expr::value(chrono::Utc::now().to_rfc3339()),
        )
        .filter(Column::Id.eq(book_id))
        .filter(Column::IsDigital.eq(false))
        .filter(Column::AvailableCopies.gt(0))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(LifecycleError::OutOfStock);
    }

    Ok(())
}

/// Put a copy back on the shelf.
///
/// The increment is clamped at `quantity`: if the counter is already at
/// capacity the UPDATE matches no rows and the call is a no-op. Callers
/// are responsible for not releasing the same borrowing twice.
pub async fn release_copy<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
) -> Result<(), LifecycleError> {
    Book::update_many()
        .col_expr(
            Column::AvailableCopies,
            Expr::col(Column::AvailableCopies).add(1),
        )
        .col_expr(
            Column::UpdatedAt,
            Expr::value(chrono::Utc::now().to_rfc3339()),
        )
        .filter(Column::Id.eq(book_id))
        .filter(Column::IsDigital.eq(false))
        .filter(Expr::col(Column::AvailableCopies).lt(Expr::col(Column::Quantity)))
        .exec(conn)
        .await?;

    Ok(())
}

/// Administrative quantity edit.
///
/// Applies the same delta to `available_copies` as to `quantity`, clamped
/// to `[0, new_total]` so outstanding borrowings survive a shrink.
pub async fn adjust_quantity(
    db: &DatabaseConnection,
    book_id: i32,
    new_total: i32,
) -> Result<book::Model, LifecycleError> {
    if new_total < 1 {
        return Err(LifecycleError::InvalidRequest(
            "quantity must be at least 1".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let existing = Book::find_by_id(book_id)
        .one(&txn)
        .await?
        .ok_or(LifecycleError::NotFound)?;

    let change = new_total - existing.quantity;
    let new_available = (existing.available_copies + change).clamp(0, new_total);

    let mut active: book::ActiveModel = existing.into();
    active.quantity = Set(new_total);
    active.available_copies = Set(new_available);
    active.updated_at = Set(chrono::Utc::now().to_rfc3339());

    let updated = active.update(&txn).await?;
    txn.commit().await?;

    Ok(updated)
}
