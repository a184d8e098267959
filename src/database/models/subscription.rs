use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A paid subscription tracked against the external billing provider.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub stripe_subscription_id: Option<String>,
    pub stripe_customer_id: Option<String>,
    pub plan_type: String,
    pub status: String,
    pub current_period_start: Option<DateTime<Utc>>,
    pub current_period_end: Option<DateTime<Utc>>,
    pub cancel_at_period_end: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanType {
    Starter,
    Professional,
    Enterprise,
}

impl PlanType {
    pub fn parse(s: &str) -> Option<PlanType> {
        match s {
            "starter" => Some(PlanType::Starter),
            "professional" => Some(PlanType::Professional),
            "enterprise" => Some(PlanType::Enterprise),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Starter => "starter",
            PlanType::Professional => "professional",
            PlanType::Enterprise => "enterprise",
        }
    }
}
