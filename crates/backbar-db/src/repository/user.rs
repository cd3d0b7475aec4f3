//! # User Repository
//!
//! Logins and user → store assignments. Password hashing happens in the
//! server's auth module; this repository only stores the PHC string.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{new_id, now};
use backbar_core::{StoreAssignment, User, UserRole};

/// Repository for users and store assignments.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY user_name COLLATE NOCASE")
                .fetch_all(&self.pool)
                .await?,
        )
    }

    pub async fn get_by_name(&self, user_name: &str) -> DbResult<Option<User>> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE user_name = ?1")
                .bind(user_name)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    pub async fn insert(
        &self,
        user_name: &str,
        password_hash: &str,
        role: UserRole,
    ) -> DbResult<User> {
        debug!(user_name = %user_name, "Inserting user");
        let ts = now();
        sqlx::query(
            "INSERT INTO users (id, user_name, password_hash, role, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)",
        )
        .bind(new_id())
        .bind(user_name)
        .bind(password_hash)
        .bind(role)
        .bind(ts)
        .bind(ts)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::Duplicate { .. } => DbError::duplicate("User", user_name),
            other => other,
        })?;

        self.get_by_name(user_name)
            .await?
            .ok_or_else(|| DbError::not_found("User", user_name))
    }

    /// Replaces the stored password hash (reset-password flow).
    pub async fn set_password_hash(&self, user_name: &str, password_hash: &str) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE user_name = ?3",
        )
        .bind(password_hash)
        .bind(now())
        .bind(user_name)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", user_name));
        }
        Ok(())
    }

    pub async fn set_role(&self, user_name: &str, role: UserRole) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE users SET role = ?1, updated_at = ?2 WHERE user_name = ?3")
                .bind(role)
                .bind(now())
                .bind(user_name)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", user_name));
        }
        Ok(())
    }

    pub async fn set_status(&self, user_name: &str, status: bool) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE users SET status = ?1, updated_at = ?2 WHERE user_name = ?3")
                .bind(status)
                .bind(now())
                .bind(user_name)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", user_name));
        }
        Ok(())
    }

    // =========================================================================
    // Store assignments
    // =========================================================================

    pub async fn assignments_for(&self, user_name: &str) -> DbResult<Vec<StoreAssignment>> {
        Ok(sqlx::query_as::<_, StoreAssignment>(
            "SELECT * FROM store_assignments WHERE user_name = ?1 ORDER BY store_code",
        )
        .bind(user_name)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn assign_store(&self, user_name: &str, store_code: &str) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO store_assignments (id, user_name, store_code, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (user_name, store_code) DO NOTHING",
        )
        .bind(new_id())
        .bind(user_name)
        .bind(store_code)
        .bind(now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn unassign_store(&self, user_name: &str, store_code: &str) -> DbResult<()> {
        sqlx::query("DELETE FROM store_assignments WHERE user_name = ?1 AND store_code = ?2")
            .bind(user_name)
            .bind(store_code)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// The user's primary store code (first assignment), if any.
    pub async fn primary_store(&self, user_name: &str) -> DbResult<Option<String>> {
        Ok(sqlx::query_scalar(
            "SELECT store_code FROM store_assignments WHERE user_name = ?1
             ORDER BY created_at LIMIT 1",
        )
        .bind(user_name)
        .fetch_optional(&self.pool)
        .await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_user_crud_and_assignments() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        let user = repo
            .insert("counter1", "$argon2id$fake", UserRole::Store)
            .await
            .unwrap();
        assert_eq!(user.role, UserRole::Store);
        assert!(user.status);

        repo.assign_store("counter1", "S001").await.unwrap();
        repo.assign_store("counter1", "S002").await.unwrap();
        // duplicate assignment is a no-op
        repo.assign_store("counter1", "S001").await.unwrap();

        assert_eq!(repo.assignments_for("counter1").await.unwrap().len(), 2);
        assert_eq!(repo.primary_store("counter1").await.unwrap().as_deref(), Some("S001"));

        repo.unassign_store("counter1", "S001").await.unwrap();
        assert_eq!(repo.assignments_for("counter1").await.unwrap().len(), 1);

        repo.set_status("counter1", false).await.unwrap();
        assert!(!repo.get_by_name("counter1").await.unwrap().unwrap().status);
    }

    #[tokio::test]
    async fn test_duplicate_user_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.users();

        repo.insert("counter1", "h", UserRole::Store).await.unwrap();
        let err = repo.insert("counter1", "h", UserRole::Admin).await.unwrap_err();
        assert!(matches!(err, DbError::Duplicate { .. }));
    }
}
