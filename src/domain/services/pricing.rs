use serde::Serialize;
use crate::domain::models::{booking::DEFAULT_SECURITY_DEPOSIT, property::{Property, SharingType}};
use crate::error::AppError;

const COUPONS: &[(&str, i64)] = &[("PGCH500", 500)];

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub monthly_rent: i64,
    pub security_deposit: i64,
    pub discount: i64,
    pub total_amount: i64,
}

/// rent × months + deposit − discount, never below zero.
pub fn total_amount(monthly_rent: i64, duration: i32, security_deposit: i64, discount: i64) -> i64 {
    let gross = monthly_rent
        .saturating_mul(i64::from(duration))
        .saturating_add(security_deposit);
    gross.saturating_sub(discount).max(0)
}

pub fn coupon_discount(code: &str) -> Option<i64> {
    let code = code.trim();
    COUPONS
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(code))
        .map(|&(_, amount)| amount)
}

pub fn quote(property: &Property, sharing_type: SharingType, duration: i32, coupon: Option<&str>) -> Result<Quote, AppError> {
    if duration < 1 {
        return Err(AppError::Validation("Duration must be at least 1 month".into()));
    }

    let tier = property.tier(sharing_type).ok_or_else(|| {
        AppError::Validation(format!("{} sharing is not offered by this property", sharing_type))
    })?;

    let discount = match coupon.filter(|c| !c.trim().is_empty()) {
        Some(code) => coupon_discount(code)
            .ok_or_else(|| AppError::Validation("The coupon code is not valid".into()))?,
        None => 0,
    };

    Ok(Quote {
        monthly_rent: tier.price,
        security_deposit: DEFAULT_SECURITY_DEPOSIT,
        discount,
        total_amount: total_amount(tier.price, duration, DEFAULT_SECURITY_DEPOSIT, discount),
    })
}
