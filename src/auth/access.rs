//! Role hierarchy, trial-period checks, and subscription feature gating.

use chrono::Utc;

use crate::config;
use crate::database::models::user::{Role, SubscriptionStatus, User};

/// A user satisfies a required role iff their level is at least as high.
pub fn has_role(user: &User, required: Role) -> bool {
    let user_level = Role::parse(&user.role).map(|r| r.level()).unwrap_or(0);
    user_level >= required.level()
}

pub fn is_admin(user: &User) -> bool {
    Role::parse(&user.role) == Some(Role::Admin)
}

pub fn is_trial_active(user: &User) -> bool {
    match user.trial_end_date {
        Some(end) => Utc::now() < end,
        None => false,
    }
}

pub fn trial_days_remaining(user: &User) -> i64 {
    let Some(end) = user.trial_end_date else {
        return 0;
    };

    let now = Utc::now();
    if now >= end {
        return 0;
    }

    // Round up: a trial ending later today still counts as one day.
    let seconds = (end - now).num_seconds();
    (seconds + 86_399) / 86_400
}

pub fn has_active_subscription(user: &User) -> bool {
    SubscriptionStatus::parse(&user.subscription_status) == Some(SubscriptionStatus::Active)
}

/// Everything is available during an active trial; afterwards an active
/// subscription is required, except for the enumerated free features.
pub fn can_access_feature(user: &User, feature: &str) -> bool {
    if is_trial_active(user) {
        return true;
    }

    if has_active_subscription(user) {
        return true;
    }

    config::config()
        .trial
        .free_features
        .iter()
        .any(|f| f == feature)
}

pub fn needs_upgrade(user: &User) -> bool {
    !is_trial_active(user) && !has_active_subscription(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user_with(role: &str, status: &str, trial_days: Option<i64>) -> User {
        let now = Utc::now();
        User {
            id: 1,
            email: "user@example.com".to_string(),
            name: "Test User".to_string(),
            role: role.to_string(),
            subscription_status: status.to_string(),
            trial_end_date: trial_days.map(|d| now + Duration::days(d)),
            stripe_customer_id: None,
            created_at: now.naive_utc(),
            updated_at: now.naive_utc(),
        }
    }

    #[test]
    fn role_hierarchy_is_inclusive() {
        let admin = user_with("admin", "trial", Some(14));
        assert!(has_role(&admin, Role::User));
        assert!(has_role(&admin, Role::Manager));
        assert!(has_role(&admin, Role::Admin));

        let manager = user_with("manager", "trial", Some(14));
        assert!(has_role(&manager, Role::User));
        assert!(!has_role(&manager, Role::Admin));

        let user = user_with("user", "trial", Some(14));
        assert!(!has_role(&user, Role::Manager));
    }

    #[test]
    fn unknown_role_falls_back_to_lowest() {
        let odd = user_with("wizard", "trial", Some(14));
        assert!(has_role(&odd, Role::User));
        assert!(!has_role(&odd, Role::Manager));
    }

    #[test]
    fn trial_window_gates_access() {
        let active = user_with("user", "trial", Some(3));
        assert!(is_trial_active(&active));
        assert_eq!(trial_days_remaining(&active), 3);
        assert!(can_access_feature(&active, "ai_response"));

        let lapsed = user_with("user", "trial", Some(-1));
        assert!(!is_trial_active(&lapsed));
        assert_eq!(trial_days_remaining(&lapsed), 0);
        assert!(!can_access_feature(&lapsed, "ai_response"));
        assert!(can_access_feature(&lapsed, "view_reviews"));
        assert!(needs_upgrade(&lapsed));
    }

    #[test]
    fn active_subscription_grants_everything() {
        let paid = user_with("user", "active", Some(-30));
        assert!(can_access_feature(&paid, "ai_response"));
        assert!(!needs_upgrade(&paid));
    }

    #[test]
    fn missing_trial_date_means_no_trial() {
        let user = user_with("user", "trial", None);
        assert!(!is_trial_active(&user));
        assert_eq!(trial_days_remaining(&user), 0);
    }
}
