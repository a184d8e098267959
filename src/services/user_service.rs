use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::auth::verify_password;
use crate::config;
use crate::database::manager::DatabaseError;
use crate::database::models::user::User;

/// Columns safe to hand back to callers; password_hash is never selected here.
const USER_COLUMNS: &str =
    "id, email, name, role, subscription_status, trial_end_date, stripe_customer_id, created_at, updated_at";

pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user with a trial window starting now. A duplicate email
    /// surfaces as `DatabaseError::UniqueViolation` from the insert itself,
    /// so concurrent signups cannot race a separate existence check.
    pub async fn create(
        &self,
        email: &str,
        password_hash: Option<&str>,
        name: &str,
    ) -> Result<User, DatabaseError> {
        let trial_end = Utc::now() + Duration::days(config::config().trial.duration_days);

        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, name, trial_end_date) VALUES (?, ?, ?, ?)",
        )
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(trial_end)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("User vanished after insert".to_string()))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn update_name(&self, id: i64, name: &str) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE users SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Check credentials and return the user on success.
    ///
    /// Unknown email, passwordless (social) account, and wrong password all
    /// return `Ok(None)` so callers cannot tell them apart.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let row: Option<(i64, Option<String>)> =
            sqlx::query_as("SELECT id, password_hash FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        let Some((id, hash)) = row else {
            return Ok(None);
        };
        let Some(hash) = hash else {
            return Ok(None);
        };

        if !verify_password(password, &hash) {
            return Ok(None);
        }

        self.get_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::testing;

    #[tokio::test]
    async fn create_assigns_trial_window() {
        let pool = testing::pool().await;
        let service = UserService::new(pool);

        let hash = hash_password("Password123!").expect("hash");
        let user = service
            .create("trial@example.com", Some(&hash), "Trial User")
            .await
            .expect("create");

        assert_eq!(user.role, "user");
        assert_eq!(user.subscription_status, "trial");
        let end = user.trial_end_date.expect("trial end");
        let days = (end - Utc::now()).num_days();
        assert!((13..=14).contains(&days), "unexpected trial length: {}", days);

        service.update_name(user.id, "Renamed User").await.expect("rename");
        let renamed = service.get_by_id(user.id).await.expect("get").expect("row");
        assert_eq!(renamed.name, "Renamed User");
    }

    #[tokio::test]
    async fn duplicate_email_is_a_typed_conflict() {
        let pool = testing::pool().await;
        let service = UserService::new(pool);

        service
            .create("dup@example.com", None, "First")
            .await
            .expect("first create");
        let err = service
            .create("dup@example.com", None, "Second")
            .await
            .expect_err("second create must fail");

        assert!(matches!(err, DatabaseError::UniqueViolation(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn authenticate_is_uniform_on_failure() {
        let pool = testing::pool().await;
        let service = UserService::new(pool);

        let hash = hash_password("Password123!").expect("hash");
        service
            .create("auth@example.com", Some(&hash), "Auth User")
            .await
            .expect("create");
        // Social-style account without a password
        service
            .create("social@example.com", None, "Social User")
            .await
            .expect("create");

        assert!(service
            .authenticate("auth@example.com", "Password123!")
            .await
            .expect("query")
            .is_some());
        assert!(service
            .authenticate("auth@example.com", "WrongPassword1")
            .await
            .expect("query")
            .is_none());
        assert!(service
            .authenticate("missing@example.com", "Password123!")
            .await
            .expect("query")
            .is_none());
        assert!(service
            .authenticate("social@example.com", "Password123!")
            .await
            .expect("query")
            .is_none());
    }
}
