use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::database::manager::DatabaseError;
use crate::database::models::subscription::Subscription;

pub struct SubscriptionService {
    pool: SqlitePool,
}

impl SubscriptionService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        user_id: i64,
        stripe_subscription_id: &str,
        plan_type: &str,
        current_period_end: Option<DateTime<Utc>>,
    ) -> Result<Subscription, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO subscriptions (user_id, stripe_subscription_id, plan_type, current_period_end) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(stripe_subscription_id)
        .bind(plan_type)
        .bind(current_period_end)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        let subscription =
            sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE id = ?")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(subscription)
    }

    /// The user's current active subscription, if any.
    pub async fn active_for_user(
        &self,
        user_id: i64,
    ) -> Result<Option<Subscription>, DatabaseError> {
        let subscription = sqlx::query_as::<_, Subscription>(
            "SELECT * FROM subscriptions WHERE user_id = ? AND status = 'active' ORDER BY id LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(subscription)
    }

    /// Status transitions arrive keyed by the billing provider's id.
    pub async fn update_status(
        &self,
        stripe_subscription_id: &str,
        status: &str,
    ) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE subscriptions SET status = ? WHERE stripe_subscription_id = ?")
            .bind(status)
            .bind(stripe_subscription_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn active_lookup_ignores_cancelled_rows() {
        let pool = testing::pool().await;
        let user_id = testing::insert_user(&pool, "sub@example.com", "Sub User").await;
        let service = SubscriptionService::new(pool);

        let created = service
            .create(user_id, "sub_123", "starter", None)
            .await
            .expect("create");
        assert_eq!(created.status, "active");
        assert!(!created.cancel_at_period_end);

        let active = service.active_for_user(user_id).await.expect("lookup");
        assert_eq!(active.map(|s| s.id), Some(created.id));

        service
            .update_status("sub_123", "cancelled")
            .await
            .expect("update");
        assert!(service
            .active_for_user(user_id)
            .await
            .expect("lookup")
            .is_none());
    }

    #[tokio::test]
    async fn duplicate_provider_id_is_rejected() {
        let pool = testing::pool().await;
        let user_id = testing::insert_user(&pool, "dup-sub@example.com", "Dup Sub").await;
        let service = SubscriptionService::new(pool);

        service
            .create(user_id, "sub_dup", "starter", None)
            .await
            .expect("first create");
        let err = service
            .create(user_id, "sub_dup", "professional", None)
            .await
            .expect_err("duplicate provider id");
        assert!(matches!(err, DatabaseError::UniqueViolation(_)));
    }
}
