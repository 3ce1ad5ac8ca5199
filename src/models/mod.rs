pub mod book;
pub mod borrowing;
pub mod user;

pub use borrowing::BorrowingStatus;
pub use user::Role;
