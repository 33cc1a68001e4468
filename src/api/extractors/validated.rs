use axum::{
    extract::{FromRequest, Request, rejection::JsonRejection},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;
use crate::error::AppError;

/// JSON body that has passed its `validator` rules. Malformed bodies are
/// reported as validation errors rather than axum's plain-text rejections.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| AppError::Validation(rejection.body_text()))?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
