//! User operations

use chrono::Utc;
use sqlx::Row;
use tracing::debug;

use crate::error::DbError;
use crate::models::{NewUser, User};
use crate::repository::Database;
use crate::utils::normalize_email;

impl Database {
    // ==================== User Operations ====================

    /// Insert a new user
    ///
    /// The email is normalized before the uniqueness check and the insert.
    pub async fn insert_user(&self, user: NewUser) -> Result<User, DbError> {
        let now = Utc::now();
        let email = normalize_email(&user.email);

        // Check if user already exists
        if self.get_user_by_email(&email).await?.is_some() {
            return Err(DbError::Duplicate(format!("User '{}' already exists", email)));
        }

        // The UNIQUE constraint still guards against a concurrent registration
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, avatar, password_hash, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&email)
        .bind(&user.avatar)
        .bind(&user.password_hash)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DbError::from_insert(e, format!("User '{}' already exists", email)))?;

        let id: i64 = result.get("id");

        Ok(User {
            id,
            name: user.name,
            email,
            avatar: user.avatar,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a user by email (case-insensitive)
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, avatar, password_hash, created_at, updated_at
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Get a user by ID
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, name, email, avatar, password_hash, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| User::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Update user password
    pub async fn update_user_password(&self, id: i64, password_hash: &str) -> Result<bool, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(password_hash)
        .bind(now.to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a user together with their profile and its entries
    ///
    /// Runs in a single transaction, so either the whole account is gone or
    /// nothing changed.
    pub async fn delete_user(&self, id: i64) -> Result<bool, DbError> {
        let mut tx = self.pool.begin().await?;

        for statement in [
            "DELETE FROM experiences WHERE profile_id IN (SELECT id FROM profiles WHERE user_id = ?)",
            "DELETE FROM educations WHERE profile_id IN (SELECT id FROM profiles WHERE user_id = ?)",
            "DELETE FROM profiles WHERE user_id = ?",
        ] {
            sqlx::query(statement).bind(id).execute(&mut *tx).await?;
        }

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!("Deleted user {} (found: {})", id, result.rows_affected() > 0);
        Ok(result.rows_affected() > 0)
    }

    /// Count registered users
    pub async fn count_users(&self) -> Result<i64, DbError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(result.get("count"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "A".to_string(),
            email: email.to_string(),
            avatar: "https://www.gravatar.com/avatar/x".to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup_user() {
        let db = Database::in_memory().await.unwrap();

        let user = db.insert_user(new_user("A@X.com")).await.unwrap();
        assert_eq!(user.email, "a@x.com");

        let by_email = db.get_user_by_email("a@X.COM").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        let by_id = db.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");
        assert_eq!(by_id.password_hash, user.password_hash);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_case_insensitively() {
        let db = Database::in_memory().await.unwrap();

        db.insert_user(new_user("a@x.com")).await.unwrap();
        let err = db.insert_user(new_user("A@x.COM")).await.unwrap_err();

        assert!(matches!(err, DbError::Duplicate(_)));
        assert_eq!(db.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_user_password() {
        let db = Database::in_memory().await.unwrap();
        let user = db.insert_user(new_user("a@x.com")).await.unwrap();

        assert!(db.update_user_password(user.id, "new-hash").await.unwrap());
        assert!(!db.update_user_password(user.id + 100, "new-hash").await.unwrap());

        let user = db.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(user.password_hash, "new-hash");
    }

    #[tokio::test]
    async fn test_corrupt_timestamp_is_a_decode_error() {
        let db = Database::in_memory().await.unwrap();
        let user = db.insert_user(new_user("a@x.com")).await.unwrap();

        sqlx::query("UPDATE users SET created_at = 'yesterday' WHERE id = ?")
            .bind(user.id)
            .execute(&db.pool)
            .await
            .unwrap();

        let err = db.get_user_by_id(user.id).await.unwrap_err();
        assert!(matches!(err, DbError::Connection(sqlx::Error::Decode(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let db = Database::in_memory().await.unwrap();
        assert!(!db.delete_user(42).await.unwrap());
    }
}
