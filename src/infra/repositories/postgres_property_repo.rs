use crate::domain::{models::property::Property, ports::{PropertyQuery, PropertyRepository}};
use crate::error::AppError;
use crate::infra::repositories::contains_pattern;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

const PROPERTY_COLUMNS: &str = "id, owner_id, name, city, locality, address, gender, description, images, sharing_types, amenities, rating, reviews, created_at, updated_at";

pub struct PostgresPropertyRepo {
    pool: PgPool,
}

impl PostgresPropertyRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PropertyRepository for PostgresPropertyRepo {
    async fn create(&self, property: &Property) -> Result<Property, AppError> {
        sqlx::query_as::<_, Property>(&format!(
            "INSERT INTO properties ({PROPERTY_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
             RETURNING {PROPERTY_COLUMNS}"
        ))
            .bind(&property.id).bind(&property.owner_id).bind(&property.name).bind(&property.city)
            .bind(&property.locality).bind(&property.address).bind(property.gender).bind(&property.description)
            .bind(&property.images).bind(&property.sharing_types).bind(&property.amenities)
            .bind(property.rating).bind(property.reviews).bind(property.created_at).bind(property.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Postgres property insert failed: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, AppError> {
        sqlx::query_as::<_, Property>(&format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_many(&self, ids: &[String]) -> Result<Vec<Property>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Property>(&format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = ANY($1)"))
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, query: &PropertyQuery) -> Result<Vec<Property>, AppError> {
        sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties
             WHERE ($1::TEXT IS NULL OR LOWER(name) LIKE $1 OR LOWER(city) LIKE $1 OR LOWER(locality) LIKE $1)
               AND ($2::TEXT IS NULL OR LOWER(city) LIKE $2)
               AND ($3::TEXT IS NULL OR LOWER(locality) LIKE $3)
               AND ($4::pg_gender IS NULL OR gender = $4)
             ORDER BY created_at DESC"
        ))
            .bind(contains_pattern(query.query.as_deref()))
            .bind(contains_pattern(query.city.as_deref()))
            .bind(contains_pattern(query.locality.as_deref()))
            .bind(query.gender)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Property>, AppError> {
        sqlx::query_as::<_, Property>(&format!(
            "SELECT {PROPERTY_COLUMNS} FROM properties WHERE owner_id = $1 ORDER BY created_at DESC"
        ))
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update(&self, property: &Property) -> Result<Property, AppError> {
        sqlx::query_as::<_, Property>(&format!(
            "UPDATE properties SET name = $1, city = $2, locality = $3, address = $4, gender = $5, description = $6,
                 images = $7, sharing_types = $8, amenities = $9, updated_at = $10
             WHERE id = $11
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
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Postgres property deletion failed: {:?}", e);
                AppError::Database(e)
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Property not found".into()));
        }
        Ok(())
    }
}
