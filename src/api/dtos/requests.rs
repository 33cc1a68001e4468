use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use validator::{Validate, ValidationError};
use crate::domain::models::{
    booking::{BookingStatus, DEFAULT_SECURITY_DEPOSIT},
    property::{Gender, SharingType},
    user::Role,
};
use crate::domain::ports::PropertyQuery;
use crate::domain::services::{catalog::PriceRange, ledger::BookingInput, password::MIN_PASSWORD_LEN};
use crate::error::AppError;

fn rejected(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rejected("required", "must not be empty"));
    }
    Ok(())
}

fn valid_role(value: &str) -> Result<(), ValidationError> {
    value.parse::<Role>().map(|_| ()).map_err(|_| rejected("invalid_choice", "Role must be either user or owner"))
}

fn valid_sharing_type(value: &str) -> Result<(), ValidationError> {
    value.parse::<SharingType>().map(|_| ())
        .map_err(|_| rejected("invalid_choice", "Sharing type must be one of Single, Double, Triple, Quad"))
}

fn valid_status(value: &str) -> Result<(), ValidationError> {
    value.parse::<BookingStatus>().map(|_| ())
        .map_err(|_| rejected("invalid_choice", "Status must be one of active, completed, cancelled"))
}

fn valid_date(value: &str) -> Result<(), ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| rejected("date", "Move-in date must be a calendar date (YYYY-MM-DD)"))
}

/// Validation has already guaranteed presence; this only unwraps the Option.
fn present<T>(value: Option<T>, field: &str) -> Result<T, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("{field} is required")))
}

/// Text fields accept any JSON scalar so a stray number (a phone, say) is
/// read as text. Arrays and objects become empty text and fail the field's
/// own rules, keeping every violation in one response.
fn scalar_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(_) => Some(String::new()),
    })
}

/// Integer field given as a JSON number or a numeric string. Anything else is
/// kept as-is and reported by the field's validator.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct WholeNumber(Value);

impl WholeNumber {
    pub fn get(&self) -> Option<i64> {
        match &self.0 {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

fn months(value: &WholeNumber) -> Result<(), ValidationError> {
    match value.get().map(i32::try_from) {
        None => Err(rejected("type", "Duration must be a whole number of months")),
        Some(Ok(n)) if n >= 1 => Ok(()),
        Some(_) => Err(rejected("range", "Duration must be at least 1 month")),
    }
}

fn rupees(value: &WholeNumber) -> Result<(), ValidationError> {
    match value.get() {
        None => Err(rejected("type", "must be a whole number of rupees")),
        Some(n) if n >= 0 => Ok(()),
        Some(_) => Err(rejected("range", "must not be negative")),
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(required(message = "Name is required"), custom(function = "not_blank"))]
    #[serde(default, deserialize_with = "scalar_text")]
    pub name: Option<String>,
    #[validate(required(message = "Please include a valid email"), email(message = "Please include a valid email"))]
    #[serde(default, deserialize_with = "scalar_text")]
    pub email: Option<String>,
    #[validate(
        required(message = "Please enter a password with 6 or more characters"),
        length(min = MIN_PASSWORD_LEN, message = "Please enter a password with 6 or more characters")
    )]
    #[serde(default, deserialize_with = "scalar_text")]
    pub password: Option<String>,
    #[validate(required(message = "Role must be either user or owner"), custom(function = "valid_role"))]
    #[serde(default, deserialize_with = "scalar_text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "scalar_text")]
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(required(message = "Please include a valid email"), email(message = "Please include a valid email"))]
    #[serde(default, deserialize_with = "scalar_text")]
    pub email: Option<String>,
    #[validate(required(message = "Password is required"), length(min = 1, message = "Password is required"))]
    #[serde(default, deserialize_with = "scalar_text")]
    pub password: Option<String>,
}

/// Unknown keys, including any client-supplied `status`, are ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(required(message = "Property is required"), custom(function = "not_blank"))]
    #[serde(default, deserialize_with = "scalar_text")]
    pub property_id: Option<String>,
    #[validate(required(message = "Sharing type is required"), custom(function = "valid_sharing_type"))]
    #[serde(default, deserialize_with = "scalar_text")]
    pub sharing_type: Option<String>,
    #[validate(required(message = "Move-in date is required"), custom(function = "valid_date"))]
    #[serde(default, deserialize_with = "scalar_text")]
    pub move_in_date: Option<String>,
    #[validate(required(message = "Duration is required"), custom(function = "months"))]
    pub duration: Option<WholeNumber>,
    #[validate(required(message = "Monthly rent is required"), custom(function = "rupees"))]
    pub monthly_rent: Option<WholeNumber>,
    #[validate(custom(function = "rupees"))]
    pub security_deposit: Option<WholeNumber>,
    #[validate(custom(function = "rupees"))]
    pub discount: Option<WholeNumber>,
    #[validate(required(message = "Total amount is required"), custom(function = "rupees"))]
    pub total_amount: Option<WholeNumber>,
    #[validate(required(message = "Name is required"), custom(function = "not_blank"))]
    #[serde(default, deserialize_with = "scalar_text")]
    pub user_name: Option<String>,
    #[validate(required(message = "Please include a valid email"), email(message = "Please include a valid email"))]
    #[serde(default, deserialize_with = "scalar_text")]
    pub user_email: Option<String>,
    #[validate(required(message = "Phone number is required"), custom(function = "not_blank"))]
    #[serde(default, deserialize_with = "scalar_text")]
    pub user_phone: Option<String>,
}

impl CreateBookingRequest {
    pub fn into_input(self) -> Result<BookingInput, AppError> {
        let sharing_type = present(self.sharing_type, "sharing_type")?
            .parse::<SharingType>()
            .map_err(|_| AppError::Validation("Invalid sharing type".into()))?;

        Ok(BookingInput {
            property_id: present(self.property_id, "property_id")?.trim().to_string(),
            sharing_type,
            move_in_date: present(self.move_in_date, "move_in_date")?.trim().to_string(),
            duration: present(self.duration.and_then(|d| d.get()).and_then(|d| i32::try_from(d).ok()), "duration")?,
            monthly_rent: present(self.monthly_rent.and_then(|v| v.get()), "monthly_rent")?,
            security_deposit: self.security_deposit.and_then(|v| v.get()).unwrap_or(DEFAULT_SECURITY_DEPOSIT),
            discount: self.discount.and_then(|v| v.get()).unwrap_or(0),
            total_amount: present(self.total_amount.and_then(|v| v.get()), "total_amount")?,
            user_name: present(self.user_name, "user_name")?,
            user_email: present(self.user_email, "user_email")?,
            user_phone: present(self.user_phone, "user_phone")?.trim().to_string(),
        })
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    #[validate(required(message = "Status is required"), custom(function = "valid_status"))]
    #[serde(default, deserialize_with = "scalar_text")]
    pub status: Option<String>,
}

impl UpdateStatusRequest {
    pub fn target(self) -> Result<BookingStatus, AppError> {
        present(self.status, "status")?
            .parse()
            .map_err(|_| AppError::Validation("Invalid status".into()))
    }
}

/// Query-string filters arrive as raw text so that empty values from a
/// search form (`min_price=`) mean "no bound" rather than a parse failure.
#[derive(Debug, Default, Deserialize)]
pub struct ListPropertiesQuery {
    pub query: Option<String>,
    pub city: Option<String>,
    pub locality: Option<String>,
    pub gender: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn price_bound(value: Option<&str>, field: &'static str, errors: &mut validator::ValidationErrors) -> Option<i64> {
    let raw = value?;
    match raw.parse::<i64>() {
        Ok(price) if price >= 0 => Some(price),
        _ => {
            errors.add(field, rejected("range", "must be a non-negative whole number"));
            None
        }
    }
}

impl ListPropertiesQuery {
    pub fn into_filters(self) -> Result<(PropertyQuery, PriceRange), AppError> {
        let mut errors = validator::ValidationErrors::new();

        let gender = match non_empty(self.gender) {
            Some(g) => match g.to_lowercase().parse::<Gender>() {
                Ok(gender) => Some(gender),
                Err(_) => {
                    errors.add("gender", rejected("invalid_choice", "gender must be either boys or girls"));
                    None
                }
            },
            None => None,
        };
        let min_price = non_empty(self.min_price);
        let max_price = non_empty(self.max_price);
        let range = PriceRange {
            min: price_bound(min_price.as_deref(), "min_price", &mut errors),
            max: price_bound(max_price.as_deref(), "max_price", &mut errors),
        };

        if !errors.is_empty() {
            return Err(AppError::InvalidFields(errors));
        }

        Ok((
            PropertyQuery {
                query: non_empty(self.query),
                city: non_empty(self.city),
                locality: non_empty(self.locality),
                gender,
            },
            range,
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    pub sharing_type: Option<String>,
    pub duration: Option<String>,
    pub coupon: Option<String>,
}

impl QuoteQuery {
    pub fn parse(self) -> Result<(SharingType, i32, Option<String>), AppError> {
        let sharing_type = non_empty(self.sharing_type)
            .ok_or_else(|| AppError::Validation("sharing_type is required".into()))?
            .parse::<SharingType>()
            .map_err(|_| AppError::Validation("Sharing type must be one of Single, Double, Triple, Quad".into()))?;
        let duration = match non_empty(self.duration) {
            Some(d) => d.parse::<i32>().map_err(|_| AppError::Validation("duration must be a whole number of months".into()))?,
            None => 1,
        };
        Ok((sharing_type, duration, non_empty(self.coupon)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_signup_reports_every_violation() {
        let req: SignupRequest = serde_json::from_value(json!({
            "name": "  ", "email": "not-an-email", "password": "123", "role": "admin"
        })).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["name", "email", "password", "role"] {
            assert!(fields.contains_key(field), "missing violation for {field}");
        }
    }

    #[test]
    fn test_booking_defaults_and_ignored_status() {
        let req: CreateBookingRequest = serde_json::from_value(json!({
            "property_id": "p1", "sharing_type": "Double", "move_in_date": "2026-11-01",
            "duration": 3, "monthly_rent": 8000, "total_amount": 34000,
            "user_name": "Tara", "user_email": "tara@x.com", "user_phone": "900",
            "status": "completed"
        })).unwrap();
        req.validate().unwrap();
        let input = req.into_input().unwrap();
        assert_eq!(input.security_deposit, 10_000);
        assert_eq!(input.discount, 0);
        assert_eq!(input.sharing_type, SharingType::Double);
    }

    #[test]
    fn test_booking_rejects_bad_bounds_and_dates() {
        let req: CreateBookingRequest = serde_json::from_value(json!({
            "property_id": "p1", "sharing_type": "Penthouse", "move_in_date": "01/11/2026",
            "duration": 0, "monthly_rent": -1, "total_amount": 0,
            "user_name": "Tara", "user_email": "tara@x.com", "user_phone": "900"
        })).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["sharing_type", "move_in_date", "duration", "monthly_rent"] {
            assert!(fields.contains_key(field), "missing violation for {field}");
        }
    }

    #[test]
    fn test_booking_reports_type_errors_with_rule_violations() {
        let req: CreateBookingRequest = serde_json::from_value(json!({
            "property_id": "p1", "sharing_type": "Double", "move_in_date": "soon",
            "duration": "three", "monthly_rent": 8000.5, "total_amount": {"amount": 1},
            "user_name": ["Tara"], "user_email": "nope", "user_phone": 9000000001u64
        })).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["move_in_date", "duration", "monthly_rent", "total_amount", "user_name", "user_email"] {
            assert!(fields.contains_key(field), "missing violation for {field}");
        }
        assert!(!fields.contains_key("user_phone"));
    }

    #[test]
    fn test_booking_accepts_numeric_strings() {
        let req: CreateBookingRequest = serde_json::from_value(json!({
            "property_id": "p1", "sharing_type": "Double", "move_in_date": "2026-11-01",
            "duration": "3", "monthly_rent": " 8000 ", "total_amount": 34000, "discount": "0",
            "user_name": "Tara", "user_email": "tara@x.com", "user_phone": 9000000001u64
        })).unwrap();
        req.validate().unwrap();
        let input = req.into_input().unwrap();
        assert_eq!(input.duration, 3);
        assert_eq!(input.monthly_rent, 8000);
        assert_eq!(input.discount, 0);
        assert_eq!(input.user_phone, "9000000001");
    }

    #[test]
    fn test_list_filters_treat_empty_values_as_absent() {
        let q = ListPropertiesQuery {
            min_price: Some("".into()),
            max_price: Some("8000".into()),
            gender: Some("Girls".into()),
            ..Default::default()
        };
        let (query, range) = q.into_filters().unwrap();
        assert_eq!(query.gender, Some(Gender::Girls));
        assert_eq!(range.min, None);
        assert_eq!(range.max, Some(8000));
    }

    #[test]
    fn test_list_filters_reject_garbage_prices() {
        let q = ListPropertiesQuery { min_price: Some("cheap".into()), ..Default::default() };
        assert!(matches!(q.into_filters(), Err(AppError::InvalidFields(_))));
    }
}
