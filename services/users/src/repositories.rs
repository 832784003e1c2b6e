//! Storage abstraction for user records

use async_trait::async_trait;
use chrono::NaiveDate;
use common::error::DatabaseResult;

use crate::models::{FieldUpdate, User};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;

/// Persistence capabilities the user service relies on
///
/// Implementations must reject a save that would give two users the same
/// email with [`common::error::DatabaseError::UniqueViolation`]; the
/// service's own uniqueness check cannot close the race between concurrent
/// writers on its own.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>>;

    /// Users born within `[from, to]`, open on a missing side, in id order
    async fn find_by_birth_date_range(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DatabaseResult<Vec<User>>;

    /// Whether any user has exactly this email
    async fn exists_by_email(&self, email: &str) -> DatabaseResult<bool>;

    /// Insert when `user.id` is `None`, otherwise overwrite the stored record
    async fn save(&self, user: User) -> DatabaseResult<User>;

    /// Change one column of an existing user in a single atomic write
    ///
    /// Other columns are left as stored, so concurrent updates of different
    /// fields do not overwrite each other. `None` when no user has this ID.
    async fn update_field(&self, id: i64, update: &FieldUpdate) -> DatabaseResult<Option<User>>;

    /// Whether a user with this ID exists
    async fn exists_by_id(&self, id: i64) -> DatabaseResult<bool>;

    /// Remove a user by ID
    async fn delete_by_id(&self, id: i64) -> DatabaseResult<()>;
}
