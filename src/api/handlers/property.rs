use axum::{
    extract::{Multipart, Path, Query, State, multipart::MultipartRejection, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{Map, Value};
use validator::{ValidationError, ValidationErrors};
use crate::state::AppState;
use crate::api::dtos::{
    requests::{ListPropertiesQuery, QuoteQuery},
    responses::MessageResponse,
};
use crate::api::extractors::auth::OwnerUser;
use crate::domain::models::property::Property;
use crate::domain::services::{access::ensure_owner, catalog, pricing};
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "avif", "bmp"];

/// Maps an upload to a file extension, accepting only images. The declared
/// content type wins; the file name is consulted when the part has none.
fn image_extension(content_type: Option<&str>, file_name: Option<&str>) -> Option<String> {
    match content_type.map(|c| c.trim().to_ascii_lowercase()) {
        Some(ct) if ct.starts_with("image/") => {
            let subtype = ct["image/".len()..].split(['+', ';']).next().unwrap_or_default().trim().to_string();
            match subtype.as_str() {
                "jpeg" | "pjpeg" => Some("jpg".into()),
                "svg" => None,
                s if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()) => Some(s.to_string()),
                _ => None,
            }
        }
        Some(ct) if ct != "application/octet-stream" => None,
        _ => {
            let ext = file_name?.rsplit_once('.')?.1.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
        }
    }
}

struct Upload {
    data: Vec<u8>,
    extension: String,
}

fn invalid_upload(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("image");
    err.message = Some(message.into());
    err
}

pub async fn list_properties(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListPropertiesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let (query, range) = params.into_filters()?;
    let properties = state.property_repo.list(&query).await?;
    Ok(Json(catalog::filter_by_price(properties, range)))
}

pub async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let property = state.property_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Property not found".into()))?;
    Ok(Json(property))
}

pub async fn quote_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<QuoteQuery>,
) -> Result<impl IntoResponse, AppError> {
    let property = state.property_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Property not found".into()))?;
    let (sharing_type, duration, coupon) = params.parse()?;
    Ok(Json(pricing::quote(&property, sharing_type, duration, coupon.as_deref())?))
}

pub async fn create_property(
    State(state): State<Arc<AppState>>,
    OwnerUser(owner): OwnerUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut multipart = multipart.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let mut fields = Map::new();
    let mut uploads: Vec<Upload> = Vec::new();
    let mut upload_error: Option<ValidationError> = None;

    while let Some(field) = multipart.next_field().await
        .map_err(|e| AppError::Validation(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "images" {
            let extension = image_extension(field.content_type(), field.file_name());
            let data = field.bytes().await.map_err(|e| AppError::Validation(e.body_text()))?;
            match extension {
                Some(extension) if !data.is_empty() => uploads.push(Upload { data: data.to_vec(), extension }),
                Some(_) => upload_error = Some(invalid_upload("Uploaded image is empty")),
                None => upload_error = Some(invalid_upload("Only image uploads are allowed")),
            }
        } else {
            let text = field.text().await.map_err(|e| AppError::Validation(e.body_text()))?;
            fields.insert(name, Value::String(text));
        }
    }

    if uploads.is_empty() && upload_error.is_none() {
        upload_error = Some(invalid_upload("At least one image is required"));
    }

    let draft = match (catalog::draft_listing(&fields), upload_error) {
        (Ok(draft), None) => draft,
        (Ok(_), Some(err)) => {
            let mut errors = ValidationErrors::new();
            errors.add("images", err);
            return Err(errors.into());
        }
        (Err(mut errors), err) => {
            if let Some(err) = err {
                errors.add("images", err);
            }
            return Err(errors.into());
        }
    };

    let mut images = Vec::with_capacity(uploads.len());
    for upload in &uploads {
        images.push(state.media_store.save_image(&upload.data, &upload.extension).await?);
    }

    let property = Property::new(draft.into_params(owner.id.clone(), images));
    let created = state.property_repo.create(&property).await?;

    info!("Property created: {} by {}", created.id, owner.id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update_property(
    State(state): State<Arc<AppState>>,
    OwnerUser(owner): OwnerUser,
    Path(id): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let mut property = state.property_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Property not found".into()))?;
    ensure_owner(&property, &owner, "update")?;

    let Json(body) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    catalog::apply_update(&mut property, &body)?;
    let updated = state.property_repo.update(&property).await?;

    info!("Property updated: {}", updated.id);
    Ok(Json(updated))
}

pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    OwnerUser(owner): OwnerUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let property = state.property_repo.find_by_id(&id).await?
        .ok_or(AppError::NotFound("Property not found".into()))?;
    ensure_owner(&property, &owner, "delete")?;

    state.property_repo.delete(&property.id).await?;
    info!("Property deleted: {} by {}", property.id, owner.id);

    Ok(Json(MessageResponse { message: "Property removed".into() }))
}

pub async fn my_properties(
    State(state): State<Arc<AppState>>,
    OwnerUser(owner): OwnerUser,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.property_repo.list_by_owner(&owner.id).await?))
}

#[cfg(test)]
mod tests {
    use super::image_extension;

    #[test]
    fn test_image_extension_from_content_type() {
        assert_eq!(image_extension(Some("image/jpeg"), None).as_deref(), Some("jpg"));
        assert_eq!(image_extension(Some("image/png"), Some("x.gif")).as_deref(), Some("png"));
        assert_eq!(image_extension(Some("image/svg+xml"), None), None);
        assert_eq!(image_extension(Some("text/plain"), Some("a.png")), None);
    }

    #[test]
    fn test_image_extension_falls_back_to_file_name() {
        assert_eq!(image_extension(None, Some("Room.WEBP")).as_deref(), Some("webp"));
        assert_eq!(image_extension(Some("application/octet-stream"), Some("a.jpeg")).as_deref(), Some("jpeg"));
        assert_eq!(image_extension(None, Some("notes.txt")), None);
        assert_eq!(image_extension(None, None), None);
    }
}
