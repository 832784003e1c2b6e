//! PostgreSQL user store

use async_trait::async_trait;
use chrono::NaiveDate;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use super::UserStore;
use crate::models::{FieldUpdate, User};

/// User store backed by the `users` table
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user store
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        birth_date: row.get("birth_date"),
        address: row.get("address"),
        phone: row.get("phone"),
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        info!("Finding user by ID: {}", id);

        let row = sqlx::query(
            r#"
            SELECT id, first_name, last_name, email, birth_date, address, phone
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn find_by_birth_date_range(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DatabaseResult<Vec<User>> {
        info!("Finding users born between {:?} and {:?}", from, to);

        let rows = sqlx::query(
            r#"
            SELECT id, first_name, last_name, email, birth_date, address, phone
            FROM users
            WHERE ($1::date IS NULL OR birth_date >= $1)
              AND ($2::date IS NULL OR birth_date <= $2)
            ORDER BY id
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn exists_by_email(&self, email: &str) -> DatabaseResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn save(&self, user: User) -> DatabaseResult<User> {
        let row = match user.id {
            None => {
                info!("Creating new user");

                sqlx::query(
                    r#"
                    INSERT INTO users (first_name, last_name, email, birth_date, address, phone)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING id, first_name, last_name, email, birth_date, address, phone
                    "#,
                )
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(&user.email)
                .bind(user.birth_date)
                .bind(&user.address)
                .bind(&user.phone)
                .fetch_one(&self.pool)
                .await
            }
            Some(id) => {
                info!("Updating user: {}", id);

                sqlx::query(
                    r#"
                    UPDATE users
                    SET first_name = $2, last_name = $3, email = $4,
                        birth_date = $5, address = $6, phone = $7
                    WHERE id = $1
                    RETURNING id, first_name, last_name, email, birth_date, address, phone
                    "#,
                )
                .bind(id)
                .bind(&user.first_name)
                .bind(&user.last_name)
                .bind(&user.email)
                .bind(user.birth_date)
                .bind(&user.address)
                .bind(&user.phone)
                .fetch_one(&self.pool)
                .await
            }
        }
        .map_err(DatabaseError::from_query)?;

        Ok(user_from_row(&row))
    }

    async fn update_field(&self, id: i64, update: &FieldUpdate) -> DatabaseResult<Option<User>> {
        let (column, text) = match update {
            FieldUpdate::FirstName(value) => ("first_name", Some(value.as_str())),
            FieldUpdate::LastName(value) => ("last_name", Some(value.as_str())),
            FieldUpdate::Email(value) => ("email", Some(value.as_str())),
            FieldUpdate::Address(value) => ("address", Some(value.as_str())),
            FieldUpdate::Phone(value) => ("phone", Some(value.as_str())),
            FieldUpdate::BirthDate(_) => ("birth_date", None),
        };
        info!("Updating {} of user: {}", column, id);

        // Column names come from the fixed list above, never from input.
        let sql = format!(
            r#"
            UPDATE users
            SET {} = $2
            WHERE id = $1
            RETURNING id, first_name, last_name, email, birth_date, address, phone
            "#,
            column
        );

        let query = sqlx::query(&sql).bind(id);
        let query = match update {
            FieldUpdate::BirthDate(birth_date) => query.bind(*birth_date),
            _ => query.bind(text),
        };

        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(row.as_ref().map(user_from_row))
    }

    async fn exists_by_id(&self, id: i64) -> DatabaseResult<bool> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from_query)
    }

    async fn delete_by_id(&self, id: i64) -> DatabaseResult<()> {
        info!("Deleting user: {}", id);

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_query)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::database::{DatabaseConfig, init_pool, run_migrations};

    async fn store() -> PgUserStore {
        let config = DatabaseConfig::from_env().expect("database config");
        let pool = init_pool(&config).await.expect("database pool");
        run_migrations(&pool).await.expect("migrations");
        PgUserStore::new(pool)
    }

    fn user(email: &str) -> User {
        User {
            id: None,
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            email: email.to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
            address: None,
            phone: Some("+1 555 0100".to_string()),
        }
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_save_find_delete() {
        let store = store().await;
        let email = format!("pg-{}@example.com", chrono::Utc::now().timestamp_micros());

        let saved = store.save(user(&email)).await.unwrap();
        let id = saved.id.expect("generated id");

        let found = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(found.email, email);
        assert!(store.exists_by_email(&email).await.unwrap());

        store.delete_by_id(id).await.unwrap();
        assert!(!store.exists_by_id(id).await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_update_field_changes_only_its_column() {
        let store = store().await;
        let email = format!("col-{}@example.com", chrono::Utc::now().timestamp_micros());
        let id = store.save(user(&email)).await.unwrap().id.unwrap();

        let updated = store
            .update_field(id, &FieldUpdate::FirstName("Janet".to_string()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.first_name, "Janet");
        assert_eq!(updated.phone.as_deref(), Some("+1 555 0100"));

        let missing = store
            .update_field(-1, &FieldUpdate::Phone("1".to_string()))
            .await
            .unwrap();
        assert!(missing.is_none());

        store.delete_by_id(id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_long_names_are_stored() {
        let store = store().await;
        let email = format!("long-{}@example.com", chrono::Utc::now().timestamp_micros());
        let mut long = user(&email);
        long.first_name = "J".repeat(300);

        let saved = store.save(long).await.unwrap();
        assert_eq!(saved.first_name.len(), 300);

        store.delete_by_id(saved.id.unwrap()).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running PostgreSQL instance"]
    async fn test_duplicate_email_hits_unique_constraint() {
        let store = store().await;
        let email = format!("dup-{}@example.com", chrono::Utc::now().timestamp_micros());

        let first = store.save(user(&email)).await.unwrap();
        let second = store.save(user(&email)).await;
        assert!(matches!(
            second,
            Err(DatabaseError::UniqueViolation { .. })
        ));

        store.delete_by_id(first.id.unwrap()).await.unwrap();
    }
}
