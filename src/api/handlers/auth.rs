use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::requests::{LoginRequest, SignupRequest};
use crate::api::extractors::{auth::AuthUser, validated::ValidatedJson};
use crate::domain::models::{auth::AuthResponse, user::{Role, UserProfile}};
use crate::domain::services::auth_service::NewIdentity;
use std::sync::Arc;
use tracing::info;

pub async fn signup(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = payload.role.as_deref().unwrap_or_default().parse::<Role>()
        .map_err(|_| AppError::Validation("Role must be either user or owner".into()))?;

    let (user, token) = state.auth_service.register(NewIdentity {
        name: payload.name.unwrap_or_default(),
        email: payload.email.unwrap_or_default(),
        password: payload.password.unwrap_or_default(),
        role,
        phone: payload.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
    }).await?;

    info!("Signup completed for {}", user.id);

    Ok((StatusCode::CREATED, Json(AuthResponse { user: user.into(), token })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user, token) = state.auth_service
        .login(&payload.email.unwrap_or_default(), &payload.password.unwrap_or_default())
        .await?;

    Ok(Json(AuthResponse { user: user.into(), token }))
}

pub async fn me(AuthUser(user): AuthUser) -> Json<UserProfile> {
    Json(user.into())
}
