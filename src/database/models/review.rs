use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single ingested review. review_date is when the customer wrote the
/// review on the source platform; created_at/updated_at are row timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: i64,
    pub organization_id: i64,
    pub platform: String,
    pub review_id: String,
    pub rating: i64,
    pub text: Option<String>,
    pub author_name: Option<String>,
    pub sentiment: Option<String>,
    pub sentiment_score: Option<f64>,
    pub topics: Option<String>,
    pub entities: Option<String>,
    pub response_draft: Option<String>,
    pub response_published: Option<String>,
    pub status: String,
    pub review_date: Option<DateTime<Utc>>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Closed set of supported review sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Google,
    Yelp,
    Facebook,
    Tripadvisor,
    Trustpilot,
    Zomato,
    Csv,
}

impl Platform {
    pub fn parse(s: &str) -> Option<Platform> {
        match s {
            "google" => Some(Platform::Google),
            "yelp" => Some(Platform::Yelp),
            "facebook" => Some(Platform::Facebook),
            "tripadvisor" => Some(Platform::Tripadvisor),
            "trustpilot" => Some(Platform::Trustpilot),
            "zomato" => Some(Platform::Zomato),
            "csv" => Some(Platform::Csv),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Google => "google",
            Platform::Yelp => "yelp",
            Platform::Facebook => "facebook",
            Platform::Tripadvisor => "tripadvisor",
            Platform::Trustpilot => "trustpilot",
            Platform::Zomato => "zomato",
            Platform::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn parse(s: &str) -> Option<Sentiment> {
        match s {
            "positive" => Some(Sentiment::Positive),
            "negative" => Some(Sentiment::Negative),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStatus {
    Pending,
    Responded,
    Ignored,
    Flagged,
}

impl ReviewStatus {
    pub fn parse(s: &str) -> Option<ReviewStatus> {
        match s {
            "pending" => Some(ReviewStatus::Pending),
            "responded" => Some(ReviewStatus::Responded),
            "ignored" => Some(ReviewStatus::Ignored),
            "flagged" => Some(ReviewStatus::Flagged),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Responded => "responded",
            ReviewStatus::Ignored => "ignored",
            ReviewStatus::Flagged => "flagged",
        }
    }
}
