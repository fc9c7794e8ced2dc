//! # User Repository
//!
//! Borrower records. Only read when the open-loan list needs display names,
//! and written by seeding or an admin import.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{generate_id, CreateError};
use loantrack_core::validation::{validate_email, validate_user_name};
use loantrack_core::{CoreError, User};

const USER_COLUMNS: &str = "id, name, last_name, phone_number, email, role, created_at";

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Lists all users.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY name, id");
        let users = sqlx::query_as::<_, User>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Registers a user with only the required fields.
    pub async fn create(&self, name: &str, email: &str) -> Result<User, CreateError> {
        validate_user_name(name).map_err(CoreError::from)?;
        validate_email(email).map_err(CoreError::from)?;

        let user = User {
            id: generate_id(),
            name: name.trim().to_string(),
            last_name: None,
            phone_number: None,
            email: email.trim().to_lowercase(),
            role: None,
            created_at: Utc::now(),
        };

        Ok(self.insert(&user).await?)
    }

    /// Inserts a user exactly as given.
    pub async fn insert(&self, user: &User) -> DbResult<User> {
        debug!(user_id = %user.id, "Inserting user");

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, last_name, phone_number, email, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.last_name)
        .bind(&user.phone_number)
        .bind(&user.email)
        .bind(&user.role)
        .bind(user.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(user.clone()),
            Err(e) => match DbError::from(e) {
                DbError::UniqueViolation { field, .. } if field.ends_with("email") => {
                    Err(DbError::duplicate("email", &user.email))
                }
                other => Err(other),
            },
        }
    }

    /// Counts users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    async fn repo() -> UserRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().users()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = repo().await;
        let user = repo.create(" Kari ", "Kari@Example.com").await.unwrap();

        assert_eq!(user.name, "Kari");
        assert_eq!(user.email, "kari@example.com");
        assert_eq!(repo.get_by_id(&user.id).await.unwrap(), Some(user));
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let repo = repo().await;
        repo.create("Kari", "kari@example.com").await.unwrap();

        let err = repo.create("Kari Two", "kari@example.com").await.unwrap_err();
        assert!(matches!(
            err,
            CreateError::Db(DbError::UniqueViolation { ref field, .. }) if field == "email"
        ));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invalid_email_is_rejected() {
        let repo = repo().await;
        assert!(matches!(
            repo.create("Kari", "not-an-email").await,
            Err(CreateError::Invalid(_))
        ));
        assert!(repo.list().await.unwrap().is_empty());
    }
}
