use crate::domain::{models::property::Property, ports::{PropertyQuery, PropertyRepository}};
use crate::error::AppError;
use crate::infra::repositories::contains_pattern;
use async_trait::async_trait;
use sqlx::{types::Json, SqlitePool};
use tracing::error;

const PROPERTY_COLUMNS: &str = "id, owner_id, name, city, locality, address, gender, description, images, sharing_types, amenities, rating, reviews, created_at, updated_at";

pub struct SqlitePropertyRepo {
    pool: SqlitePool,
}

impl SqlitePropertyRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyRepository for SqlitePropertyRepo {
    async fn create(&self, property: &Property) -> Result<Property, AppError> {
        sqlx::query_as::<_, Property>(&format!(
            "INSERT INTO properties ({PROPERTY_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING {PROPERTY_COLUMNS}"
        ))
            .bind(&property.id).bind(&property.owner_id).bind(&property.name).bind(&property.city)
            .bind(&property.locality).bind(&property.address).bind(property.gender).bind(&property.description)
            .bind(&property.images).bind(&property.sharing_types).bind(&property.amenities)
            .bind(property.rating).bind(property.reviews).bind(property.created_at).bind(property.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("SQLite property insert failed: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, AppError> {
        sqlx::query_as::<_, Property>(&format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_many(&self, ids: &[String]) -> Result<Vec<Property>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE id IN (SELECT value FROM json_each(?))"
        ))
            .bind(Json(ids))
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, query: &PropertyQuery) -> Result<Vec<Property>, AppError> {
        let text = contains_pattern(query.query.as_deref());
        let city = contains_pattern(query.city.as_deref());
        let locality = contains_pattern(query.locality.as_deref());

        sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties
             WHERE (? IS NULL OR LOWER(name) LIKE ? ESCAPE '\\' OR LOWER(city) LIKE ? ESCAPE '\\' OR LOWER(locality) LIKE ? ESCAPE '\\')
               AND (? IS NULL OR LOWER(city) LIKE ? ESCAPE '\\')
               AND (? IS NULL OR LOWER(locality) LIKE ? ESCAPE '\\')
               AND (? IS NULL OR gender = ?)
             ORDER BY created_at DESC"
        ))
            .bind(&text).bind(&text).bind(&text).bind(&text)
            .bind(&city).bind(&city)
            .bind(&locality).bind(&locality)
            .bind(query.gender).bind(query.gender)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Property>, AppError> {
        sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE owner_id = ? ORDER BY created_at DESC"
        ))
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, property: &Property) -> Result<Property, AppError> {
        sqlx::query_as::<_, Property>(&format!(
            "UPDATE properties SET name = ?, city = ?, locality = ?, address = ?, gender = ?, description = ?,
                 images = ?, sharing_types = ?, amenities = ?, updated_at = ?
             WHERE id = ?
             RETURNING {PROPERTY_COLUMNS}"
        ))
            .bind(&property.name).bind(&property.city).bind(&property.locality).bind(&property.address)
            .bind(property.gender).bind(&property.description)
            .bind(&property.images).bind(&property.sharing_types).bind(&property.amenities)
            .bind(property.updated_at)
            .bind(&property.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Property not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM properties WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("SQLite property deletion failed: {:?}", e);
                AppError::Database(e)
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Property not found".into()));
        }
        Ok(())
    }
}
