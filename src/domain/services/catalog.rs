use std::collections::HashSet;
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::types::Json;
use tracing::debug;
use validator::{ValidationError, ValidationErrors};
use crate::domain::models::property::{
    Gender, NewPropertyParams, Property, SharingTier, DESCRIPTION_MAX_LEN, NAME_MAX_LEN,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct PriceRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl PriceRange {
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Compares against the listing's cheapest tier. Listings without tiers
    /// have no price and never satisfy a bound.
    pub fn matches(&self, property: &Property) -> bool {
        if self.is_unbounded() {
            return true;
        }
        let Some(price) = property.min_tier_price() else {
            return false;
        };
        self.min.is_none_or(|min| price >= min) && self.max.is_none_or(|max| price <= max)
    }
}

pub fn filter_by_price(properties: Vec<Property>, range: PriceRange) -> Vec<Property> {
    if range.is_unbounded() {
        return properties;
    }
    properties.into_iter().filter(|p| range.matches(p)).collect()
}

/// Structured fields arrive either as JSON arrays or as JSON-encoded strings
/// (the multipart convention).
fn decode_structured(raw: &Value) -> Result<Value, String> {
    match raw {
        Value::String(s) => serde_json::from_str(s).map_err(|e| format!("invalid JSON: {e}")),
        other => Ok(other.clone()),
    }
}

pub fn parse_sharing_tiers(raw: &Value) -> Result<Vec<SharingTier>, String> {
    let tiers: Vec<SharingTier> = serde_json::from_value(decode_structured(raw)?)
        .map_err(|e| format!("invalid sharing tiers: {e}"))?;
    if tiers.is_empty() {
        return Err("at least one sharing type is required".into());
    }

    let mut seen = HashSet::new();
    for tier in &tiers {
        if tier.price < 0 {
            return Err(format!("price for {} must not be negative", tier.sharing_type));
        }
        if !seen.insert(tier.sharing_type) {
            return Err(format!("sharing type {} listed more than once", tier.sharing_type));
        }
    }
    Ok(tiers)
}

pub fn parse_amenities(raw: &Value) -> Result<Vec<String>, String> {
    let amenities: Vec<String> = serde_json::from_value(decode_structured(raw)?)
        .map_err(|e| format!("invalid amenities: {e}"))?;

    Ok(amenities
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect())
}

fn invalid(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn required_text(value: &Value, field: &'static str, max_len: Option<u64>) -> Result<String, ValidationError> {
    let text = value
        .as_str()
        .map(str::trim)
        .ok_or_else(|| invalid("type", format!("{field} must be a string")))?;
    if text.is_empty() {
        return Err(invalid("required", format!("{field} must not be empty")));
    }
    if let Some(max) = max_len
        && text.chars().count() as u64 > max {
        return Err(invalid("length", format!("{field} cannot be more than {max} characters")));
    }
    Ok(text.to_string())
}

/// Validated listing fields from a create request, before images are stored.
#[derive(Debug)]
pub struct ListingDraft {
    pub name: String,
    pub city: String,
    pub locality: String,
    pub address: String,
    pub gender: Gender,
    pub description: String,
    pub sharing_types: Vec<SharingTier>,
    pub amenities: Vec<String>,
}

impl ListingDraft {
    pub fn into_params(self, owner_id: String, images: Vec<String>) -> NewPropertyParams {
        NewPropertyParams {
            owner_id,
            name: self.name,
            city: self.city,
            locality: self.locality,
            address: self.address,
            gender: self.gender,
            description: self.description,
            images,
            sharing_types: self.sharing_types,
            amenities: self.amenities,
        }
    }
}

/// Strict counterpart of [`apply_update`]: every scalar is required and
/// malformed tiers or amenities are rejected instead of skipped.
pub fn draft_listing(fields: &Map<String, Value>) -> Result<ListingDraft, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let missing = Value::String(String::new());

    let mut text = |field: &'static str, max_len: Option<u64>| {
        match required_text(fields.get(field).unwrap_or(&missing), field, max_len) {
            Ok(t) => t,
            Err(e) => {
                errors.add(field, e);
                String::new()
            }
        }
    };
    let name = text("name", Some(NAME_MAX_LEN));
    let city = text("city", None);
    let locality = text("locality", None);
    let address = text("address", None);
    let description = text("description", Some(DESCRIPTION_MAX_LEN));

    let gender = fields
        .get("gender")
        .and_then(Value::as_str)
        .and_then(|g| g.trim().parse::<Gender>().ok());
    if gender.is_none() {
        errors.add("gender", invalid("invalid_choice", "gender must be either boys or girls".into()));
    }

    let sharing_types = match fields.get("sharing_types") {
        Some(raw) => parse_sharing_tiers(raw).unwrap_or_else(|reason| {
            errors.add("sharing_types", invalid("invalid", reason));
            Vec::new()
        }),
        None => {
            errors.add("sharing_types", invalid("required", "at least one sharing type is required".into()));
            Vec::new()
        }
    };

    let amenities = match fields.get("amenities") {
        Some(raw) => parse_amenities(raw).unwrap_or_else(|reason| {
            errors.add("amenities", invalid("invalid", reason));
            Vec::new()
        }),
        None => Vec::new(),
    };

    match gender {
        Some(gender) if errors.is_empty() => Ok(ListingDraft {
            name,
            city,
            locality,
            address,
            gender,
            description,
            sharing_types,
            amenities,
        }),
        _ => Err(errors),
    }
}

/// Applies a partial update over the allow-listed listing fields. Unknown
/// keys are ignored and malformed tier/amenity payloads are skipped, while
/// invalid scalar values reject the whole update.
pub fn apply_update(property: &mut Property, body: &Map<String, Value>) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let text_fields: [(&'static str, Option<u64>); 5] = [
        ("name", Some(NAME_MAX_LEN)),
        ("city", None),
        ("locality", None),
        ("address", None),
        ("description", Some(DESCRIPTION_MAX_LEN)),
    ];

    for (field, max_len) in text_fields {
        let Some(value) = body.get(field) else { continue };
        match required_text(value, field, max_len) {
            Ok(text) => match field {
                "name" => property.name = text,
                "city" => property.city = text,
                "locality" => property.locality = text,
                "address" => property.address = text,
                _ => property.description = text,
            },
            Err(e) => errors.add(field, e),
        }
    }

    if let Some(value) = body.get("gender") {
        match value.as_str().and_then(|g| g.parse::<Gender>().ok()) {
            Some(gender) => property.gender = gender,
            None => errors.add("gender", invalid("invalid_choice", "gender must be either boys or girls".into())),
        }
    }

    if let Some(value) = body.get("sharing_types") {
        match parse_sharing_tiers(value) {
            Ok(tiers) => property.sharing_types = Json(tiers),
            Err(reason) => debug!("Skipping sharing_types in update of {}: {}", property.id, reason),
        }
    }

    if let Some(value) = body.get("amenities") {
        match parse_amenities(value) {
            Ok(amenities) => property.amenities = Json(amenities),
            Err(reason) => debug!("Skipping amenities in update of {}: {}", property.id, reason),
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    property.updated_at = Utc::now();
    Ok(())
}
