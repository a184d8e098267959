pub mod auth;

pub use auth::{classify, route_guard, AuthUser, RouteClass};
