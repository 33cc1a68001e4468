use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, types::Json};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_RATING: f64 = 4.5;
pub const NAME_MAX_LEN: u64 = 100;
pub const DESCRIPTION_MAX_LEN: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "pg_gender", rename_all = "lowercase")]
pub enum Gender {
    Boys,
    Girls,
}

impl FromStr for Gender {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boys" => Ok(Gender::Boys),
            "girls" => Ok(Gender::Girls),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "sharing_type")]
pub enum SharingType {
    Single,
    Double,
    Triple,
    Quad,
}

impl SharingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SharingType::Single => "Single",
            SharingType::Double => "Double",
            SharingType::Triple => "Triple",
            SharingType::Quad => "Quad",
        }
    }
}

impl fmt::Display for SharingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SharingType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Single" => Ok(SharingType::Single),
            "Double" => Ok(SharingType::Double),
            "Triple" => Ok(SharingType::Triple),
            "Quad" => Ok(SharingType::Quad),
            _ => Err(()),
        }
    }
}

/// A priced occupancy option on a listing. `available` is informational;
/// booking never reads or flips it unless total verification is enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharingTier {
    #[serde(rename = "type")]
    pub sharing_type: SharingType,
    pub price: i64,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Property {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub city: String,
    pub locality: String,
    pub address: String,
    pub gender: Gender,
    pub description: String,
    pub images: Json<Vec<String>>,
    pub sharing_types: Json<Vec<SharingTier>>,
    pub amenities: Json<Vec<String>>,
    pub rating: f64,
    pub reviews: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewPropertyParams {
    pub owner_id: String,
    pub name: String,
    pub city: String,
    pub locality: String,
    pub address: String,
    pub gender: Gender,
    pub description: String,
    pub images: Vec<String>,
    pub sharing_types: Vec<SharingTier>,
    pub amenities: Vec<String>,
}

impl Property {
    pub fn new(params: NewPropertyParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id: params.owner_id,
            name: params.name,
            city: params.city,
            locality: params.locality,
            address: params.address,
            gender: params.gender,
            description: params.description,
            images: Json(params.images),
            sharing_types: Json(params.sharing_types),
            amenities: Json(params.amenities),
            rating: DEFAULT_RATING,
            reviews: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Lowest monthly price across all tiers; `None` when the listing has no tiers.
    pub fn min_tier_price(&self) -> Option<i64> {
        self.sharing_types.iter().map(|t| t.price).min()
    }

    pub fn tier(&self, sharing_type: SharingType) -> Option<&SharingTier> {
        self.sharing_types.iter().find(|t| t.sharing_type == sharing_type)
    }

    pub fn first_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Display fields of a listing joined onto booking reads.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct PropertySummary {
    pub name: String,
    pub locality: String,
    pub city: String,
    pub image: String,
}

impl From<&Property> for PropertySummary {
    fn from(p: &Property) -> Self {
        Self {
            name: p.name.clone(),
            locality: p.locality.clone(),
            city: p.city.clone(),
            image: p.first_image().unwrap_or_default().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(tiers: Vec<(SharingType, i64)>) -> Property {
        Property::new(NewPropertyParams {
            owner_id: "o1".into(),
            name: "Sunrise PG".into(),
            city: "Bengaluru".into(),
            locality: "Koramangala".into(),
            address: "1st Block".into(),
            gender: Gender::Boys,
            description: "Near metro".into(),
            images: vec!["/uploads/a.jpg".into(), "/uploads/b.jpg".into()],
            sharing_types: tiers
                .into_iter()
                .map(|(sharing_type, price)| SharingTier { sharing_type, price, available: true })
                .collect(),
            amenities: vec!["WiFi".into()],
        })
    }

    #[test]
    fn test_min_tier_price() {
        let p = listing(vec![(SharingType::Single, 12000), (SharingType::Double, 8000)]);
        assert_eq!(p.min_tier_price(), Some(8000));
        assert_eq!(listing(vec![]).min_tier_price(), None);
    }

    #[test]
    fn test_defaults_on_creation() {
        let p = listing(vec![]);
        assert_eq!(p.rating, DEFAULT_RATING);
        assert_eq!(p.reviews, 0);
        assert_eq!(p.created_at, p.updated_at);
    }

    #[test]
    fn test_tier_wire_format() {
        let tier: SharingTier = serde_json::from_str(r#"{"type":"Triple","price":6000}"#).unwrap();
        assert_eq!(tier.sharing_type, SharingType::Triple);
        assert!(tier.available);
        assert!(serde_json::from_str::<SharingTier>(r#"{"type":"Penta","price":1}"#).is_err());
    }

    #[test]
    fn test_summary_uses_first_image() {
        let p = listing(vec![]);
        let summary = PropertySummary::from(&p);
        assert_eq!(summary.image, "/uploads/a.jpg");
        assert_eq!(summary.name, "Sunrise PG");
    }
}
