use axum::{extract::{State, Path}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::dtos::requests::{CreateBookingRequest, UpdateStatusRequest};
use crate::api::extractors::{auth::{OwnerUser, TenantUser}, validated::ValidatedJson};
use crate::error::AppError;
use std::sync::Arc;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    TenantUser(tenant): TenantUser,
    ValidatedJson(payload): ValidatedJson<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.ledger.create(&tenant, payload.into_input()?).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn my_bookings(
    State(state): State<Arc<AppState>>,
    TenantUser(tenant): TenantUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.ledger.list_for_tenant(&tenant).await?))
}

pub async fn bookings_for_my_properties(
    State(state): State<Arc<AppState>>,
    OwnerUser(owner): OwnerUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.ledger.list_for_owner(&owner).await?))
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    OwnerUser(owner): OwnerUser,
    Path(booking_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let booking = state.ledger.update_status(&owner, &booking_id, payload.target()?).await?;
    Ok(Json(booking))
}
