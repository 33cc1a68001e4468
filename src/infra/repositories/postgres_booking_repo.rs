use crate::domain::{models::booking::{Booking, BookingStatus}, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::error;

const BOOKING_COLUMNS: &str = "id, user_id, property_id, sharing_type, move_in_date, duration, monthly_rent, security_deposit, discount, total_amount, user_name, user_email, user_phone, status, created_at, updated_at";

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn create(&self, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(&format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
             RETURNING {BOOKING_COLUMNS}"
        ))
            .bind(&booking.id).bind(&booking.user_id).bind(&booking.property_id).bind(booking.sharing_type)
            .bind(&booking.move_in_date).bind(booking.duration).bind(booking.monthly_rent).bind(booking.security_deposit)
            .bind(booking.discount).bind(booking.total_amount).bind(&booking.user_name).bind(&booking.user_email)
            .bind(&booking.user_phone).bind(booking.status).bind(booking.created_at).bind(booking.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Postgres booking insert failed: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC"
        ))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_properties(&self, property_ids: &[String]) -> Result<Vec<Booking>, AppError> {
        if property_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Booking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE property_id = ANY($1) ORDER BY created_at DESC"
        ))
            .bind(property_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_status(&self, id: &str, expected: BookingStatus, next: BookingStatus) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(&format!(
            "UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4 RETURNING {BOOKING_COLUMNS}"
        ))
            .bind(next)
            .bind(Utc::now())
            .bind(id)
            .bind(expected)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
