use crate::domain::models::{
    user::User, property::{Property, Gender}, booking::{Booking, BookingStatus},
};
use crate::error::AppError;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Text and gender filters pushed down to storage. Price bounds are applied
/// afterwards over each listing's minimum tier price.
#[derive(Debug, Default, Clone)]
pub struct PropertyQuery {
    pub query: Option<String>,
    pub city: Option<String>,
    pub locality: Option<String>,
    pub gender: Option<Gender>,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn find_many(&self, ids: &[String]) -> Result<Vec<User>, AppError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn create(&self, property: &Property) -> Result<Property, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Property>, AppError>;
    async fn find_many(&self, ids: &[String]) -> Result<Vec<Property>, AppError>;
    /// Newest first.
    async fn list(&self, query: &PropertyQuery) -> Result<Vec<Property>, AppError>;
    /// Newest first.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<Property>, AppError>;
    async fn update(&self, property: &Property) -> Result<Property, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    /// Newest first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError>;
    /// Newest first.
    async fn list_by_properties(&self, property_ids: &[String]) -> Result<Vec<Booking>, AppError>;
    /// Writes `next` only if the stored status is still `expected`.
    /// Returns `None` when another writer got there first.
    async fn update_status(&self, id: &str, expected: BookingStatus, next: BookingStatus) -> Result<Option<Booking>, AppError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Persists raw image bytes and returns the public reference stored on the listing.
    async fn save_image(&self, data: &[u8], extension: &str) -> Result<String, AppError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Round trip to the backing store.
    async fn ping(&self) -> Result<(), AppError>;
}
