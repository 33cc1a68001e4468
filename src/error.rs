use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Invalid input: {0}")]
    InvalidFields(#[from] ValidationErrors),
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Internal server error")]
    Internal,
    #[error("Internal server error: {0}")]
    InternalWithMsg(String),
}

#[derive(Debug, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::Unauthenticated(_) => "unauthenticated",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Forbidden(_) => "forbidden",
            AppError::Conflict(_) => "conflict",
            AppError::Validation(_) | AppError::InvalidFields(_) => "validation_error",
            AppError::Database(_) | AppError::Storage(_) | AppError::Internal | AppError::InternalWithMsg(_) => "internal_error",
        }
    }
}

/// Flattens validator output into one entry per violation, ordered by field.
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid ({})", field, e.code)),
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
    out
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, message, fields) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error()
                    && db_err.is_unique_violation() {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({ "kind": "conflict", "error": "Resource already exists (duplicate entry)" }))
                    ).into_response();
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), None)
            }
            AppError::Storage(e) => {
                error!("Storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string(), None)
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), None),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string(), None),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone(), None),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), None),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::InvalidFields(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(field_errors(errors)),
            ),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string(), None),
            AppError::InternalWithMsg(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string(), None)
            }
        };

        let body = match fields {
            Some(fields) => Json(json!({ "kind": kind, "error": message, "fields": fields })),
            None => Json(json!({ "kind": kind, "error": message })),
        };

        (status, body).into_response()
    }
}
