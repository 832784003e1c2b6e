//! Email uniqueness guard

use std::sync::Arc;
use tracing::warn;

use crate::{
    error::{UserError, UserResult},
    repositories::UserStore,
};

/// Checks a candidate email against storage before it is accepted
#[derive(Clone)]
pub struct UniquenessGuard {
    store: Arc<dyn UserStore>,
}

impl UniquenessGuard {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Fail with [`UserError::DuplicateEmail`] when another user owns `candidate`
    ///
    /// `current_owner` is the email already persisted for the user being
    /// updated, if any. Keeping one's own email is never a duplicate. The
    /// comparison is exact and case-sensitive.
    pub async fn check_email_available(
        &self,
        candidate: &str,
        current_owner: Option<&str>,
    ) -> UserResult<()> {
        if current_owner == Some(candidate) {
            return Ok(());
        }

        if self.store.exists_by_email(candidate).await? {
            warn!("Rejected email already owned by another user");
            return Err(UserError::DuplicateEmail(candidate.to_string()));
        }

        Ok(())
    }
}
