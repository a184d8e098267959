use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::database::manager::DatabaseError;
use crate::database::models::review::Review;

/// Optional list filters; values are validated against the closed enums
/// before they reach this layer.
#[derive(Debug, Default, Clone)]
pub struct ReviewFilters {
    pub platform: Option<String>,
    pub status: Option<String>,
    pub sentiment: Option<String>,
}

impl ReviewFilters {
    fn where_clause(&self) -> String {
        // Simple predicate concatenation; every filter binds one parameter.
        let mut sql = String::from("WHERE organization_id = ?");
        if self.platform.is_some() {
            sql.push_str(" AND platform = ?");
        }
        if self.status.is_some() {
            sql.push_str(" AND status = ?");
        }
        if self.sentiment.is_some() {
            sql.push_str(" AND sentiment = ?");
        }
        sql
    }
}

/// A validated review ready for insertion, server defaults already applied.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub platform: String,
    pub review_id: String,
    pub rating: i64,
    pub text: String,
    pub author_name: String,
    pub sentiment: String,
    pub topics: String,
    pub review_date: DateTime<Utc>,
}

/// Aggregates for the dashboard, computed in one pass over the tenant's rows.
#[derive(Debug, sqlx::FromRow)]
pub struct ReviewStats {
    pub total_reviews: i64,
    pub average_rating: f64,
    pub pending_responses: i64,
    pub positive_count: i64,
    pub neutral_count: i64,
    pub negative_count: i64,
}

pub struct ReviewService {
    pool: SqlitePool,
}

impl ReviewService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Page through an organization's reviews, newest first, returning the
    /// rows and the total count under the same filters.
    pub async fn list(
        &self,
        organization_id: i64,
        filters: &ReviewFilters,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Review>, i64), DatabaseError> {
        let where_clause = filters.where_clause();

        let sql = format!(
            "SELECT * FROM reviews {} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
            where_clause
        );
        let mut query = sqlx::query_as::<_, Review>(&sql).bind(organization_id);
        if let Some(platform) = &filters.platform {
            query = query.bind(platform);
        }
        if let Some(status) = &filters.status {
            query = query.bind(status);
        }
        if let Some(sentiment) = &filters.sentiment {
            query = query.bind(sentiment);
        }
        let reviews = query
            .bind(limit)
            .bind((page - 1) * limit)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM reviews {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(organization_id);
        if let Some(platform) = &filters.platform {
            count_query = count_query.bind(platform);
        }
        if let Some(status) = &filters.status {
            count_query = count_query.bind(status);
        }
        if let Some(sentiment) = &filters.sentiment {
            count_query = count_query.bind(sentiment);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        Ok((reviews, total))
    }

    /// Insert a review. A duplicate (organization, platform, review_id)
    /// triple surfaces as `DatabaseError::UniqueViolation`.
    pub async fn create(
        &self,
        organization_id: i64,
        review: &NewReview,
    ) -> Result<Review, DatabaseError> {
        let result = sqlx::query(
            "INSERT INTO reviews (organization_id, platform, review_id, rating, text, author_name, sentiment, topics, review_date) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(organization_id)
        .bind(&review.platform)
        .bind(&review.review_id)
        .bind(review.rating)
        .bind(&review.text)
        .bind(&review.author_name)
        .bind(&review.sentiment)
        .bind(&review.topics)
        .bind(review.review_date)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get(id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Review vanished after insert".to_string()))
    }

    pub async fn get(&self, id: i64) -> Result<Option<Review>, DatabaseError> {
        let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(review)
    }

    /// Update the response draft and workflow status together.
    pub async fn update_response(
        &self,
        id: i64,
        response_draft: Option<&str>,
        status: &str,
    ) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE reviews SET response_draft = ?, status = ? WHERE id = ?")
            .bind(response_draft)
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Update the sentiment analysis fields together.
    pub async fn update_sentiment(
        &self,
        id: i64,
        sentiment: Option<&str>,
        sentiment_score: Option<f64>,
        topics: Option<&str>,
    ) -> Result<(), DatabaseError> {
        sqlx::query("UPDATE reviews SET sentiment = ?, sentiment_score = ?, topics = ? WHERE id = ?")
            .bind(sentiment)
            .bind(sentiment_score)
            .bind(topics)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Returns the number of rows removed (0 when the id does not exist).
    pub async fn delete(&self, id: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn stats(&self, organization_id: i64) -> Result<ReviewStats, DatabaseError> {
        let stats = sqlx::query_as::<_, ReviewStats>(
            "SELECT COUNT(*) AS total_reviews, \
                    COALESCE(AVG(rating), 0.0) AS average_rating, \
                    COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0) AS pending_responses, \
                    COALESCE(SUM(CASE WHEN sentiment = 'positive' THEN 1 ELSE 0 END), 0) AS positive_count, \
                    COALESCE(SUM(CASE WHEN sentiment = 'neutral' THEN 1 ELSE 0 END), 0) AS neutral_count, \
                    COALESCE(SUM(CASE WHEN sentiment = 'negative' THEN 1 ELSE 0 END), 0) AS negative_count \
             FROM reviews WHERE organization_id = ?",
        )
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    pub async fn recent(
        &self,
        organization_id: i64,
        limit: i64,
    ) -> Result<Vec<Review>, DatabaseError> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE organization_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(organization_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn sample(platform: &str, review_id: &str, rating: i64, sentiment: &str) -> NewReview {
        NewReview {
            platform: platform.to_string(),
            review_id: review_id.to_string(),
            rating,
            text: "Great food".to_string(),
            author_name: "Anonymous".to_string(),
            sentiment: sentiment.to_string(),
            topics: String::new(),
            review_date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_triple_is_rejected_not_overwritten() {
        let (pool, org_id) = testing::pool_with_org().await;
        let service = ReviewService::new(pool);

        service
            .create(org_id, &sample("google", "g-1", 5, "positive"))
            .await
            .expect("first create");
        let err = service
            .create(org_id, &sample("google", "g-1", 1, "negative"))
            .await
            .expect_err("duplicate must fail");
        assert!(matches!(err, DatabaseError::UniqueViolation(_)), "got {:?}", err);

        // Same external id on a different platform is fine
        service
            .create(org_id, &sample("yelp", "g-1", 4, "positive"))
            .await
            .expect("different platform");

        let (_, total) = service
            .list(org_id, &ReviewFilters::default(), 1, 20)
            .await
            .expect("list");
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn list_filters_and_counts_match() {
        let (pool, org_id) = testing::pool_with_org().await;
        let service = ReviewService::new(pool);

        service.create(org_id, &sample("google", "g-1", 5, "positive")).await.expect("create");
        service.create(org_id, &sample("google", "g-2", 2, "negative")).await.expect("create");
        service.create(org_id, &sample("yelp", "y-1", 4, "positive")).await.expect("create");

        let filters = ReviewFilters {
            platform: Some("google".to_string()),
            ..Default::default()
        };
        let (rows, total) = service.list(org_id, &filters, 1, 20).await.expect("list");
        assert_eq!(total, 2);
        assert!(rows.iter().all(|r| r.platform == "google"));

        let filters = ReviewFilters {
            platform: Some("google".to_string()),
            sentiment: Some("negative".to_string()),
            ..Default::default()
        };
        let (rows, total) = service.list(org_id, &filters, 1, 20).await.expect("list");
        assert_eq!(total, 1);
        assert_eq!(rows[0].review_id, "g-2");
    }

    #[tokio::test]
    async fn pagination_slices_without_erroring_past_the_end() {
        let (pool, org_id) = testing::pool_with_org().await;
        let service = ReviewService::new(pool);

        for i in 0..5 {
            service
                .create(org_id, &sample("google", &format!("g-{}", i), 4, "positive"))
                .await
                .expect("create");
        }

        let (page_one, total) = service
            .list(org_id, &ReviewFilters::default(), 1, 2)
            .await
            .expect("page 1");
        assert_eq!(total, 5);
        assert_eq!(page_one.len(), 2);

        let (page_three, _) = service
            .list(org_id, &ReviewFilters::default(), 3, 2)
            .await
            .expect("page 3");
        assert_eq!(page_three.len(), 1);

        let (beyond, _) = service
            .list(org_id, &ReviewFilters::default(), 4, 2)
            .await
            .expect("page 4");
        assert!(beyond.is_empty());
    }

    #[tokio::test]
    async fn partial_updates_leave_other_group_untouched() {
        let (pool, org_id) = testing::pool_with_org().await;
        let service = ReviewService::new(pool);

        let review = service
            .create(org_id, &sample("google", "g-1", 3, "neutral"))
            .await
            .expect("create");

        service
            .update_response(review.id, Some("Thanks for visiting!"), "responded")
            .await
            .expect("update response");
        let after = service.get(review.id).await.expect("get").expect("row");
        assert_eq!(after.response_draft.as_deref(), Some("Thanks for visiting!"));
        assert_eq!(after.status, "responded");
        assert_eq!(after.sentiment.as_deref(), Some("neutral"));

        service
            .update_sentiment(review.id, Some("negative"), Some(-0.6), Some("[\"wait time\"]"))
            .await
            .expect("update sentiment");
        let after = service.get(review.id).await.expect("get").expect("row");
        assert_eq!(after.sentiment.as_deref(), Some("negative"));
        assert_eq!(after.sentiment_score, Some(-0.6));
        assert_eq!(after.status, "responded");
    }

    #[tokio::test]
    async fn stats_aggregate_the_organization_only() {
        let (pool, org_id) = testing::pool_with_org().await;
        let service = ReviewService::new(pool.clone());

        service.create(org_id, &sample("google", "g-1", 5, "positive")).await.expect("create");
        service.create(org_id, &sample("google", "g-2", 1, "negative")).await.expect("create");
        service.create(org_id, &sample("yelp", "y-1", 3, "neutral")).await.expect("create");

        let stats = service.stats(org_id).await.expect("stats");
        assert_eq!(stats.total_reviews, 3);
        assert_eq!(stats.pending_responses, 3);
        assert_eq!(stats.positive_count, 1);
        assert_eq!(stats.neutral_count, 1);
        assert_eq!(stats.negative_count, 1);
        assert!((stats.average_rating - 3.0).abs() < f64::EPSILON);

        // A different organization sees nothing
        let other_org = testing::insert_org(&pool, "Other Org").await;
        let empty = service.stats(other_org).await.expect("stats");
        assert_eq!(empty.total_reviews, 0);
        assert_eq!(empty.average_rating, 0.0);
    }

    #[tokio::test]
    async fn delete_reports_missing_rows() {
        let (pool, org_id) = testing::pool_with_org().await;
        let service = ReviewService::new(pool);

        let review = service
            .create(org_id, &sample("google", "g-1", 4, "positive"))
            .await
            .expect("create");

        assert_eq!(service.delete(review.id).await.expect("delete"), 1);
        assert_eq!(service.delete(review.id).await.expect("delete again"), 0);
        assert!(service.get(review.id).await.expect("get").is_none());
    }
}
