//! In-memory user store

use async_trait::async_trait;
use chrono::NaiveDate;
use common::error::{DatabaseError, DatabaseResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::UserStore;
use crate::models::{DateRange, FieldUpdate, User};

const EMAIL_CONSTRAINT: &str = "users_email_key";

#[derive(Debug, Default)]
struct MemoryState {
    users: BTreeMap<i64, User>,
    last_id: i64,
}

/// User store kept in process memory
///
/// Ids are handed out sequentially starting at 1 and never reused. Email
/// uniqueness is enforced under the write lock, mirroring the database
/// constraint.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryUserStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.get(&id).cloned())
    }

    async fn find_by_birth_date_range(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DatabaseResult<Vec<User>> {
        let range = DateRange::new(from, to);
        let state = self.state.read().await;

        Ok(state
            .users
            .values()
            .filter(|user| range.contains(user.birth_date))
            .cloned()
            .collect())
    }

    async fn exists_by_email(&self, email: &str) -> DatabaseResult<bool> {
        let state = self.state.read().await;
        Ok(state.users.values().any(|user| user.email == email))
    }

    async fn save(&self, mut user: User) -> DatabaseResult<User> {
        let mut state = self.state.write().await;

        let taken = state
            .users
            .values()
            .any(|other| other.email == user.email && other.id != user.id);
        if taken {
            return Err(DatabaseError::UniqueViolation {
                constraint: EMAIL_CONSTRAINT.to_string(),
            });
        }

        let id = match user.id {
            Some(id) if state.users.contains_key(&id) => id,
            Some(_) => return Err(DatabaseError::Query(sqlx::Error::RowNotFound)),
            None => {
                state.last_id += 1;
                state.last_id
            }
        };

        info!("Saving user: {}", id);
        user.id = Some(id);
        state.users.insert(id, user.clone());

        Ok(user)
    }

    async fn update_field(&self, id: i64, update: &FieldUpdate) -> DatabaseResult<Option<User>> {
        let mut state = self.state.write().await;

        if let FieldUpdate::Email(email) = update {
            let taken = state
                .users
                .values()
                .any(|other| &other.email == email && other.id != Some(id));
            if taken {
                return Err(DatabaseError::UniqueViolation {
                    constraint: EMAIL_CONSTRAINT.to_string(),
                });
            }
        }

        let Some(user) = state.users.get_mut(&id) else {
            return Ok(None);
        };

        info!("Updating user: {}", id);
        update.apply_to(user);
        Ok(Some(user.clone()))
    }

    async fn exists_by_id(&self, id: i64) -> DatabaseResult<bool> {
        let state = self.state.read().await;
        Ok(state.users.contains_key(&id))
    }

    async fn delete_by_id(&self, id: i64) -> DatabaseResult<()> {
        let mut state = self.state.write().await;
        state.users.remove(&id);
        Ok(())
    }
}
