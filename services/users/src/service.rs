//! User service: the only path through which users are read or changed
//!
//! Every mutating operation runs its checks before touching storage and then
//! issues exactly one write, so a caller sees either the updated user or a
//! single [`UserError`] with nothing persisted.

use chrono::{NaiveDate, Utc};
use common::error::DatabaseError;
use std::sync::Arc;
use tracing::info;

use crate::{
    error::{UserError, UserResult},
    models::{DateRange, Field, FieldUpdate, User, UserDraft},
    repositories::UserStore,
    uniqueness::UniquenessGuard,
    validation::{Validator, validate_date_range_order, validate_required_field},
};

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Orchestrates validation, uniqueness and persistence for users
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    guard: UniquenessGuard,
    validator: Validator,
    today: fn() -> NaiveDate,
}

impl UserService {
    /// Create a new user service
    pub fn new(store: Arc<dyn UserStore>, validator: Validator) -> Self {
        Self {
            guard: UniquenessGuard::new(store.clone()),
            store,
            validator,
            today: utc_today,
        }
    }

    /// Replace the source of the current date used by the birth date rules
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Current date as seen by the birth date rules
    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    /// Get a user by ID
    pub async fn get_by_id(&self, id: i64) -> UserResult<User> {
        info!("Fetching user: {}", id);

        self.store
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id))
    }

    /// Users whose birth date falls inside `range`, bounds included
    pub async fn find_by_birth_date_range(&self, range: &DateRange) -> UserResult<Vec<User>> {
        validate_date_range_order(range)?;

        info!(
            "Finding users born between {:?} and {:?}",
            range.from, range.to
        );
        Ok(self
            .store
            .find_by_birth_date_range(range.from, range.to)
            .await?)
    }

    /// Create a new user from a candidate
    pub async fn create(&self, draft: &UserDraft) -> UserResult<User> {
        let user = self.validator.validate_user(draft, self.today())?;
        self.guard.check_email_available(&user.email, None).await?;

        let user = self.persist(user).await?;
        info!(id = ?user.id, "Created user");
        Ok(user)
    }

    /// Overwrite every mutable field of an existing user
    pub async fn replace(&self, id: i64, draft: &UserDraft) -> UserResult<User> {
        let existing = self.get_by_id(id).await?;
        let candidate = self.validator.validate_user(draft, self.today())?;
        self.guard
            .check_email_available(&candidate.email, Some(&existing.email))
            .await?;

        info!("Replacing user: {}", id);
        self.persist(User {
            id: existing.id,
            ..candidate
        })
        .await
    }

    pub async fn update_first_name(&self, id: i64, first_name: &str) -> UserResult<User> {
        self.get_by_id(id).await?;
        validate_required_field(Some(first_name), Field::FirstName)?;

        self.apply(id, FieldUpdate::FirstName(first_name.to_string())).await
    }

    pub async fn update_last_name(&self, id: i64, last_name: &str) -> UserResult<User> {
        self.get_by_id(id).await?;
        validate_required_field(Some(last_name), Field::LastName)?;

        self.apply(id, FieldUpdate::LastName(last_name.to_string())).await
    }

    /// Change the email, keeping it well formed and unique
    pub async fn update_email(&self, id: i64, email: &str) -> UserResult<User> {
        let user = self.get_by_id(id).await?;
        self.validator.validate_email(email)?;
        self.guard
            .check_email_available(email, Some(&user.email))
            .await?;

        self.apply(id, FieldUpdate::Email(email.to_string())).await
    }

    /// Change the birth date; both the in-the-past and minimum age rules apply
    pub async fn update_birth_date(&self, id: i64, birth_date: NaiveDate) -> UserResult<User> {
        self.get_by_id(id).await?;
        self.validator.validate_birth_date(birth_date, self.today())?;

        self.apply(id, FieldUpdate::BirthDate(birth_date)).await
    }

    pub async fn update_address(&self, id: i64, address: &str) -> UserResult<User> {
        self.get_by_id(id).await?;
        self.apply(id, FieldUpdate::Address(address.to_string())).await
    }

    pub async fn update_phone(&self, id: i64, phone: &str) -> UserResult<User> {
        self.get_by_id(id).await?;
        self.apply(id, FieldUpdate::Phone(phone.to_string())).await
    }

    /// Delete a user by ID
    pub async fn delete_by_id(&self, id: i64) -> UserResult<()> {
        if !self.store.exists_by_id(id).await? {
            return Err(UserError::NotFound(id));
        }

        info!("Deleting user: {}", id);
        self.store.delete_by_id(id).await?;
        Ok(())
    }

    /// Whole-record write used by create and replace
    ///
    /// A unique violation reported by storage means a concurrent writer took
    /// the email after the guard passed.
    async fn persist(&self, user: User) -> UserResult<User> {
        let id = user.id;
        let email = user.email.clone();

        self.store.save(user).await.map_err(|e| match (e, id) {
            (DatabaseError::UniqueViolation { .. }, _) => UserError::DuplicateEmail(email),
            (DatabaseError::Query(sqlx::Error::RowNotFound), Some(id)) => UserError::NotFound(id),
            (other, _) => other.into(),
        })
    }

    /// Column-scoped write used by the field patches
    ///
    /// Only the patched column is written, so two patches of different fields
    /// of the same user both survive however they interleave.
    async fn apply(&self, id: i64, update: FieldUpdate) -> UserResult<User> {
        info!("Patching user: {}", id);

        match self.store.update_field(id, &update).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(UserError::NotFound(id)),
            Err(DatabaseError::UniqueViolation { .. }) => match update {
                FieldUpdate::Email(email) => Err(UserError::DuplicateEmail(email)),
                _ => Err(UserError::Unexpected(
                    "unique constraint violated by a non-email column".to_string(),
                )),
            },
            Err(other) => Err(other.into()),
        }
    }
}
