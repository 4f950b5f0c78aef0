use tracing::warn;

use shared_models::auth::{Principal, Role, User};
use shared_models::error::AppError;

/// Policy gate: admits the user as a [`Principal`] only if its role is one of `allowed`.
pub fn authorize(user: &User, allowed: &[Role]) -> Result<Principal, AppError> {
    if allowed.contains(&user.role) {
        return Ok(Principal::from(user));
    }

    warn!("User {} with role {} denied; requires one of {:?}", user.id, user.role, allowed);
    Err(AppError::Forbidden(
        "You do not have permission to perform this action".to_string(),
    ))
}
