pub mod admin_coupons;
pub mod coupons;
pub mod subscriptions;

use axum::http::StatusCode;
use tracing::warn;

use crate::{auth::AuthUser, axum_http::error_responses::AppError};

/// Gate for back-office and order-pipeline routes.
pub(crate) fn require_admin(auth: &AuthUser) -> Result<(), AppError> {
    if auth.is_admin() {
        return Ok(());
    }
    warn!(
        user_id = %auth.user_id,
        role = %auth.role,
        status = StatusCode::FORBIDDEN.as_u16(),
        "admin: non-admin attempted restricted access"
    );
    Err(AppError::Forbidden)
}
