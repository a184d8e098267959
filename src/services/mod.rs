pub mod fixtures;
pub mod org_service;
pub mod review_service;
pub mod subscription_service;
pub mod user_service;

pub use org_service::OrgService;
pub use review_service::{NewReview, ReviewFilters, ReviewService};
pub use subscription_service::SubscriptionService;
pub use user_service::UserService;
