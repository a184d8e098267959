//! Development fixture data: two accounts and a handful of reviews spanning
//! platforms and sentiment buckets. Seeding is idempotent — existing users
//! and duplicate reviews are skipped, never overwritten.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::auth::hash_password;
use crate::database::manager::DatabaseError;
use crate::services::org_service::OrgService;
use crate::services::review_service::{NewReview, ReviewService};
use crate::services::user_service::UserService;

pub const TEST_USER_EMAIL: &str = "john.smith@example.com";
pub const TEST_USER_PASSWORD: &str = "Password123!";
pub const TEST_ADMIN_EMAIL: &str = "admin@example.com";
pub const TEST_ADMIN_PASSWORD: &str = "AdminPass123!";

struct SampleUser {
    email: &'static str,
    password: &'static str,
    name: &'static str,
    role: &'static str,
}

const SAMPLE_USERS: [SampleUser; 2] = [
    SampleUser {
        email: TEST_USER_EMAIL,
        password: TEST_USER_PASSWORD,
        name: "John Smith",
        role: "user",
    },
    SampleUser {
        email: TEST_ADMIN_EMAIL,
        password: TEST_ADMIN_PASSWORD,
        name: "Admin User",
        role: "admin",
    },
];

struct SampleReview {
    platform: &'static str,
    review_id: &'static str,
    rating: i64,
    text: &'static str,
    author_name: &'static str,
    sentiment: &'static str,
    topics: &'static str,
    review_date: &'static str,
}

const SAMPLE_REVIEWS: [SampleReview; 4] = [
    SampleReview {
        platform: "google",
        review_id: "google_001",
        rating: 5,
        text: "Excellent service! The staff was very friendly and the food was amazing. Will definitely come back.",
        author_name: "Sarah Johnson",
        sentiment: "positive",
        topics: r#"["service","staff","food"]"#,
        review_date: "2024-01-15T00:00:00Z",
    },
    SampleReview {
        platform: "yelp",
        review_id: "yelp_001",
        rating: 2,
        text: "The wait time was too long and the food was cold when it arrived. Not impressed.",
        author_name: "Mike Davis",
        sentiment: "negative",
        topics: r#"["wait time","food temperature"]"#,
        review_date: "2024-01-10T00:00:00Z",
    },
    SampleReview {
        platform: "facebook",
        review_id: "fb_001",
        rating: 4,
        text: "Good experience overall. The atmosphere was nice and the service was decent.",
        author_name: "Emily Chen",
        sentiment: "positive",
        topics: r#"["atmosphere","service"]"#,
        review_date: "2024-01-12T00:00:00Z",
    },
    SampleReview {
        platform: "tripadvisor",
        review_id: "ta_001",
        rating: 3,
        text: "Average experience. Nothing special but not bad either.",
        author_name: "Robert Wilson",
        sentiment: "neutral",
        topics: r#"["experience"]"#,
        review_date: "2024-01-08T00:00:00Z",
    },
];

#[derive(Debug, Default)]
pub struct SeedSummary {
    pub users_created: usize,
    pub reviews_created: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),
}

pub async fn seed_database(pool: &SqlitePool) -> Result<SeedSummary, SeedError> {
    let users = UserService::new(pool.clone());
    let orgs = OrgService::new(pool.clone());
    let reviews = ReviewService::new(pool.clone());

    let mut summary = SeedSummary::default();

    for sample in &SAMPLE_USERS {
        if users.get_by_email(sample.email).await?.is_some() {
            info!("Fixture user {} already exists, skipping", sample.email);
            continue;
        }

        let hash = hash_password(sample.password)
            .map_err(|e| SeedError::PasswordHash(e.to_string()))?;
        let user = users.create(sample.email, Some(&hash), sample.name).await?;

        if sample.role != "user" {
            sqlx::query("UPDATE users SET role = ? WHERE id = ?")
                .bind(sample.role)
                .bind(user.id)
                .execute(pool)
                .await
                .map_err(DatabaseError::from)?;
        }

        let org_id = orgs
            .create(&format!("{}'s Organization", sample.name), user.id)
            .await?;
        summary.users_created += 1;
        info!("Created fixture user {} with organization {}", sample.email, org_id);

        // Sample reviews belong to the regular user's organization
        if sample.email == TEST_USER_EMAIL {
            for review in &SAMPLE_REVIEWS {
                let review_date = review
                    .review_date
                    .parse::<DateTime<Utc>>()
                    .unwrap_or_else(|_| Utc::now());
                let new_review = NewReview {
                    platform: review.platform.to_string(),
                    review_id: review.review_id.to_string(),
                    rating: review.rating,
                    text: review.text.to_string(),
                    author_name: review.author_name.to_string(),
                    sentiment: review.sentiment.to_string(),
                    topics: review.topics.to_string(),
                    review_date,
                };
                match reviews.create(org_id, &new_review).await {
                    Ok(_) => summary.reviews_created += 1,
                    Err(DatabaseError::UniqueViolation(_)) => {
                        info!("Fixture review {} already exists, skipping", review.review_id);
                    }
                    Err(e) => {
                        warn!("Failed to seed review {}: {}", review.review_id, e);
                        return Err(e.into());
                    }
                }
            }
        }
    }

    info!(
        "Seeding complete: {} users, {} reviews",
        summary.users_created, summary.reviews_created
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::review_service::ReviewFilters;
    use crate::testing;

    #[tokio::test]
    async fn seeding_twice_creates_nothing_new() {
        let pool = testing::pool().await;

        let first = seed_database(&pool).await.expect("seed");
        assert_eq!(first.users_created, 2);
        assert_eq!(first.reviews_created, 4);

        let second = seed_database(&pool).await.expect("seed again");
        assert_eq!(second.users_created, 0);
        assert_eq!(second.reviews_created, 0);
    }

    #[tokio::test]
    async fn fixture_credentials_authenticate() {
        let pool = testing::pool().await;
        seed_database(&pool).await.expect("seed");

        let users = UserService::new(pool.clone());
        let user = users
            .authenticate(TEST_USER_EMAIL, TEST_USER_PASSWORD)
            .await
            .expect("query")
            .expect("fixture user authenticates");
        assert_eq!(user.name, "John Smith");

        let admin = users
            .authenticate(TEST_ADMIN_EMAIL, TEST_ADMIN_PASSWORD)
            .await
            .expect("query")
            .expect("fixture admin authenticates");
        assert_eq!(admin.role, "admin");

        // Reviews landed in the regular user's organization
        let orgs = OrgService::new(pool.clone());
        let org_id = orgs
            .resolve_for_user(user.id, &user.name)
            .await
            .expect("resolve");
        let reviews = ReviewService::new(pool);
        let (_, total) = reviews
            .list(org_id, &ReviewFilters::default(), 1, 20)
            .await
            .expect("list");
        assert_eq!(total, 4);
    }
}
