use crate::domain::models::{property::Property, user::{Role, User}};
use crate::error::AppError;
use tracing::warn;

/// Set-membership check over the closed role enumeration.
pub fn authorize_role(user: &User, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&user.role) {
        return Ok(());
    }
    warn!("Role check failed for identity {} (role {})", user.id, user.role);
    Err(AppError::Forbidden(format!(
        "User role {} is not authorized to access this route",
        user.role
    )))
}

/// Ownership check, run after the resource has been loaded.
pub fn ensure_owner(property: &Property, user: &User, action: &str) -> Result<(), AppError> {
    if property.owner_id == user.id {
        return Ok(());
    }
    warn!("Ownership check failed: identity {} tried to {} property {}", user.id, action, property.id);
    Err(AppError::Forbidden(format!("Not authorized to {} this property", action)))
}
