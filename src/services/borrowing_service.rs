//! Borrowing Lifecycle - state machine and business rules for borrowing records
//!
//! A record is created directly in `Borrowed` and leaves the active set
//! only through `return_book`. Each operation touches three things - the
//! record, the book's available-copy counter, and the user's denormalized
//! borrowed list - and applies them in one transaction: a failure anywhere
//! rolls back everything.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::domain::LifecycleError;
use crate::models::book::{self, Entity as Book};
use crate::models::borrowing::{self, BorrowingStatus, Entity as Borrowing};
use crate::models::user::{self, Entity as User, Role};
use crate::services::inventory_service;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Borrow a book for `user_id`.
///
/// Order of checks: date validity, book and user existence, the
/// at-most-one-active rule, then copy availability. Digital titles skip
/// the ledger entirely and are always borrowable.
pub async fn borrow(
    db: &DatabaseConnection,
    user_id: i32,
    book_id: i32,
    expected_return_date: &str,
) -> Result<borrowing::Model, LifecycleError> {
    let expected = DateTime::parse_from_rfc3339(expected_return_date).map_err(|_| {
        LifecycleError::InvalidRequest(
            "expected return date must be an RFC 3339 timestamp".to_string(),
        )
    })?;

    let now = Utc::now();
    if expected.with_timezone(&Utc) < now {
        return Err(LifecycleError::InvalidRequest(
            "expected return date must not be in the past".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let book = Book::find_by_id(book_id)
        .one(&txn)
        .await?
        .ok_or(LifecycleError::NotFound)?;

    let user = User::find_by_id(user_id)
        .one(&txn)
        .await?
        .ok_or(LifecycleError::NotFound)?;

    let active = Borrowing::find()
        .filter(borrowing::Column::UserId.eq(user_id))
        .filter(borrowing::Column::BookId.eq(book_id))
        .filter(borrowing::Column::Status.is_in(BorrowingStatus::ACTIVE))
        .one(&txn)
        .await?;

    if active.is_some() {
        return Err(LifecycleError::DuplicateBorrowing);
    }

    if !book.is_digital {
        inventory_service::reserve_copy(&txn, book_id).await?;
    }

    let now_str = now.to_rfc3339();
    let record = borrowing::ActiveModel {
        user_id: Set(user_id),
        book_id: Set(book_id),
        borrow_date: Set(now_str.clone()),
        expected_return_date: Set(expected.to_rfc3339()),
        actual_return_date: Set(None),
        status: Set(BorrowingStatus::Borrowed),
        fine_amount: Set(0.0),
        created_at: Set(now_str.clone()),
        updated_at: Set(now_str.clone()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut borrowed = user.borrowed_book_ids();
    if !borrowed.contains(&book_id) {
        borrowed.push(book_id);
    }
    let mut user_active: user::ActiveModel = user.into();
    user_active.borrowed_books = Set(serde_json::to_string(&borrowed).unwrap_or_default());
    user_active.updated_at = Set(now_str);
    user_active.update(&txn).await?;

    txn.commit().await?;

    Ok(record)
}

/// Return a borrowed book.
///
/// Permitted for the borrower themselves or for staff. `Borrowed` and
/// `Overdue` records return identically; a `Returned` record is terminal
/// and yields `AlreadyReturned` without touching the ledger again.
pub async fn return_book(
    db: &DatabaseConnection,
    borrowing_id: i32,
    acting_user_id: i32,
    acting_role: Role,
    fine_rate_per_day: f64,
) -> Result<borrowing::Model, LifecycleError> {
    let txn = db.begin().await?;

    let record = Borrowing::find_by_id(borrowing_id)
        .one(&txn)
        .await?
        .ok_or(LifecycleError::NotFound)?;

    if record.user_id != acting_user_id && !acting_role.is_staff() {
        return Err(LifecycleError::Forbidden);
    }

    if record.status == BorrowingStatus::Returned {
        return Err(LifecycleError::AlreadyReturned);
    }

    let now = Utc::now();
    let fine = compute_fine(&record.expected_return_date, now, fine_rate_per_day);

    let book_id = record.book_id;
    let record_user_id = record.user_id;

    let mut active: borrowing::ActiveModel = record.into();
    active.actual_return_date = Set(Some(now.to_rfc3339()));
    active.status = Set(BorrowingStatus::Returned);
    active.fine_amount = Set(fine);
    active.updated_at = Set(now.to_rfc3339());
    let updated = active.update(&txn).await?;

    // Credit the ledger. A book removed from the catalog while on loan is
    // tolerated: the record still closes.
    if let Some(book) = Book::find_by_id(book_id).one(&txn).await? {
        if !book.is_digital {
            inventory_service::release_copy(&txn, book_id).await?;
        }
    }

    if let Some(user) = User::find_by_id(record_user_id).one(&txn).await? {
        let borrowed: Vec<i32> = user
            .borrowed_book_ids()
            .into_iter()
            .filter(|id| *id != book_id)
            .collect();
        let mut user_active: user::ActiveModel = user.into();
        user_active.borrowed_books = Set(serde_json::to_string(&borrowed).unwrap_or_default());
        user_active.updated_at = Set(now.to_rfc3339());
        user_active.update(&txn).await?;
    }

    txn.commit().await?;

    Ok(updated)
}

/// Fine owed for a return at `actual`, given the stored expected date.
///
/// Days late are counted in full: any started day owes a whole day's rate,
/// so a return one minute past the deadline already costs one day.
fn compute_fine(expected_return_date: &str, actual: DateTime<Utc>, rate_per_day: f64) -> f64 {
    let Ok(expected) = DateTime::parse_from_rfc3339(expected_return_date) else {
        return 0.0;
    };

    let late_millis = (actual - expected.with_timezone(&Utc)).num_milliseconds();
    if late_millis <= 0 {
        return 0.0;
    }

    let late_days = (late_millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY;
    late_days as f64 * rate_per_day
}

/// Enriched borrowing record with user and book details
#[derive(Debug, Clone, Serialize)]
pub struct BorrowingWithDetails {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub borrow_date: String,
    pub expected_return_date: String,
    pub actual_return_date: Option<String>,
    pub status: BorrowingStatus,
    pub fine_amount: f64,
    pub user_name: String,
    pub user_email: String,
    pub book_title: String,
    pub book_author: String,
    pub book_isbn: String,
}

/// List every borrowing record with related user and book info
pub async fn list_all(
    db: &DatabaseConnection,
) -> Result<Vec<BorrowingWithDetails>, LifecycleError> {
    let records = Borrowing::find()
        .order_by_desc(borrowing::Column::BorrowDate)
        .find_also_related(User)
        .all(db)
        .await?;

    enrich(db, records).await
}

/// List a user's active (non-returned) borrowings
pub async fn list_active_for_user(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<BorrowingWithDetails>, LifecycleError> {
    let records = Borrowing::find()
        .filter(borrowing::Column::UserId.eq(user_id))
        .filter(borrowing::Column::Status.is_in(BorrowingStatus::ACTIVE))
        .order_by_desc(borrowing::Column::BorrowDate)
        .find_also_related(User)
        .all(db)
        .await?;

    enrich(db, records).await
}

async fn enrich(
    db: &DatabaseConnection,
    records: Vec<(borrowing::Model, Option<user::Model>)>,
) -> Result<Vec<BorrowingWithDetails>, LifecycleError> {
    let book_ids: Vec<i32> = records.iter().map(|(r, _)| r.book_id).collect();

    let mut book_map: HashMap<i32, book::Model> = HashMap::new();
    if !book_ids.is_empty() {
        let books = Book::find()
            .filter(book::Column::Id.is_in(book_ids))
            .all(db)
            .await?;
        for b in books {
            book_map.insert(b.id, b);
        }
    }

    let result = records
        .into_iter()
        .map(|(record, user)| {
            let book = book_map.get(&record.book_id);

            BorrowingWithDetails {
                id: record.id,
                user_id: record.user_id,
                book_id: record.book_id,
                borrow_date: record.borrow_date,
                expected_return_date: record.expected_return_date,
                actual_return_date: record.actual_return_date,
                status: record.status,
                fine_amount: record.fine_amount,
                user_name: user
                    .as_ref()
                    .map(|u| u.name.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                user_email: user
                    .map(|u| u.email)
                    .unwrap_or_else(|| "Unknown".to_string()),
                book_title: book
                    .map(|b| b.title.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                book_author: book
                    .map(|b| b.author.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
                book_isbn: book
                    .map(|b| b.isbn.clone())
                    .unwrap_or_else(|| "Unknown".to_string()),
            }
        })
        .collect();

    Ok(result)
}
