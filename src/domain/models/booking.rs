use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use super::property::{PropertySummary, SharingType};

pub const DEFAULT_SECURITY_DEPOSIT: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "booking_status", rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Active => "active",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// `active` is the only state with outgoing edges; there are no self-loops.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Active, BookingStatus::Completed)
                | (BookingStatus::Active, BookingStatus::Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(BookingStatus::Active),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(()),
        }
    }
}

/// A financial record. Rent, deposit, discount and total are captured at
/// creation and never re-derived from the live listing.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub property_id: String,
    pub sharing_type: SharingType,
    pub move_in_date: String,
    pub duration: i32,
    pub monthly_rent: i64,
    pub security_deposit: i64,
    pub discount: i64,
    pub total_amount: i64,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams {
    pub user_id: String,
    pub property_id: String,
    pub sharing_type: SharingType,
    pub move_in_date: String,
    pub duration: i32,
    pub monthly_rent: i64,
    pub security_deposit: i64,
    pub discount: i64,
    pub total_amount: i64,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: params.user_id,
            property_id: params.property_id,
            sharing_type: params.sharing_type,
            move_in_date: params.move_in_date,
            duration: params.duration,
            monthly_rent: params.monthly_rent,
            security_deposit: params.security_deposit,
            discount: params.discount,
            total_amount: params.total_amount,
            user_name: params.user_name.trim().to_string(),
            user_email: params.user_email.trim().to_lowercase(),
            user_phone: params.user_phone,
            status: BookingStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Tenant-facing booking row: the booking snapshot plus the listing's
/// current display fields. Missing listings degrade to blank fields.
#[derive(Debug, Serialize)]
pub struct TenantBookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub property: PropertySummary,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct TenantContact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Owner-facing booking row: adds the tenant's current contact details.
#[derive(Debug, Serialize)]
pub struct OwnerBookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub property: PropertySummary,
    pub tenant: TenantContact,
}
