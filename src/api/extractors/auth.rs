use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::state::AppState;
use crate::domain::models::user::{Role, User};
use crate::domain::services::access::authorize_role;
use crate::error::AppError;
use std::sync::Arc;
use tracing::Span;

/// Any signed-in identity, re-read from storage on every request.
pub struct AuthUser(pub User);

/// Signed-in identity with the `owner` role.
pub struct OwnerUser(pub User);

/// Signed-in identity with the `user` (tenant) role.
pub struct TenantUser(pub User);

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts.headers.get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthenticated("Not authorized, no token".into()))?
        .to_str()
        .map_err(|_| AppError::Unauthenticated("Not authorized, token failed".into()))?;

    header.strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("Not authorized, no token".into()))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let user = app_state.auth_service.authenticate(token).await?;
        Span::current().record("user_id", user.id.as_str());

        Ok(AuthUser(user))
    }
}

impl<S> FromRequestParts<S> for OwnerUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        authorize_role(&user, &[Role::Owner])?;
        Ok(OwnerUser(user))
    }
}

impl<S> FromRequestParts<S> for TenantUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        authorize_role(&user, &[Role::User])?;
        Ok(TenantUser(user))
    }
}
