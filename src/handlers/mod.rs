pub mod protected;
pub mod public;

use crate::error::ApiError;

/// Shared 405 handler for methods a route does not support.
pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed("Method not allowed")
}
