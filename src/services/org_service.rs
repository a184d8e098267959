use sqlx::SqlitePool;

use crate::database::manager::DatabaseError;
use crate::database::models::organization::Organization;

pub struct OrgService {
    pool: SqlitePool,
}

impl OrgService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str, owner_id: i64) -> Result<i64, DatabaseError> {
        let result = sqlx::query("INSERT INTO organizations (name, owner_id) VALUES (?, ?)")
            .bind(name)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    /// Resolve the organization every review operation is scoped to.
    ///
    /// The conditional insert is a single statement, so concurrent first
    /// requests from a brand-new user cannot each create an organization;
    /// whichever insert runs first wins and the rest become no-ops. The
    /// earliest organization (insertion order) is always the one returned.
    pub async fn resolve_for_user(
        &self,
        user_id: i64,
        user_name: &str,
    ) -> Result<i64, DatabaseError> {
        sqlx::query(
            "INSERT INTO organizations (name, owner_id) \
             SELECT ?, ? WHERE NOT EXISTS (SELECT 1 FROM organizations WHERE owner_id = ?)",
        )
        .bind(format!("{}'s Organization", user_name))
        .bind(user_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        let (id,): (i64,) =
            sqlx::query_as("SELECT id FROM organizations WHERE owner_id = ? ORDER BY id LIMIT 1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(id)
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Organization>, DatabaseError> {
        let orgs = sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations WHERE owner_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orgs)
    }

    /// Organization ids owned by the user, for ownership checks.
    pub async fn ids_for_user(&self, user_id: i64) -> Result<Vec<i64>, DatabaseError> {
        let ids: Vec<(i64,)> =
            sqlx::query_as("SELECT id FROM organizations WHERE owner_id = ? ORDER BY id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[tokio::test]
    async fn resolve_creates_once_and_is_idempotent() {
        let pool = testing::pool().await;
        let user_id = testing::insert_user(&pool, "owner@example.com", "Pat Owner").await;
        let service = OrgService::new(pool);

        let first = service
            .resolve_for_user(user_id, "Pat Owner")
            .await
            .expect("resolve");
        let second = service
            .resolve_for_user(user_id, "Pat Owner")
            .await
            .expect("resolve again");

        assert_eq!(first, second);

        let orgs = service.list_for_user(user_id).await.expect("list");
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].name, "Pat Owner's Organization");
        assert_eq!(orgs[0].subscription_plan, "free");
    }

    #[tokio::test]
    async fn resolve_prefers_earliest_organization() {
        let pool = testing::pool().await;
        let user_id = testing::insert_user(&pool, "multi@example.com", "Multi Org").await;
        let service = OrgService::new(pool);

        let first = service.create("First Org", user_id).await.expect("create");
        service.create("Second Org", user_id).await.expect("create");

        let resolved = service
            .resolve_for_user(user_id, "Multi Org")
            .await
            .expect("resolve");
        assert_eq!(resolved, first);
        assert_eq!(service.ids_for_user(user_id).await.expect("ids").len(), 2);
    }
}
