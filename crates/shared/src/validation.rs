//! Field validators shared by the request DTOs.
//!
//! Each function has the signature `validator` expects for
//! `#[validate(custom(function = ...))]`.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

/// Two-letter codes of the fifty US states.
pub const US_STATES: [&str; 50] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY",
];

/// Categories a business can be listed under.
pub const BUSINESS_CATEGORIES: [&str; 30] = [
    "Automotive",
    "Beauty & Spas",
    "Computers & Electronics",
    "Construction & Contractors",
    "Education",
    "Entertainment",
    "Financial Services",
    "Fitness",
    "Food & Dining",
    "Health & Medicine",
    "Home & Garden",
    "Hotels & Travel",
    "Insurance",
    "Legal & Financial",
    "Manufacturing",
    "Media & Communications",
    "Personal Care & Services",
    "Professional Services",
    "Real Estate",
    "Shopping & Retail",
    "Sports & Recreation",
    "Transportation",
    "Utilities",
    "Wellness",
    "Arts & Crafts",
    "Clothing & Accessories",
    "Consulting",
    "IT Services",
    "Marketing & Advertising",
    "Pet Services",
];

/// Time zones a business may declare, as UTC offsets.
pub const TIME_ZONES: [&str; 12] = [
    "UTC-12:00",
    "UTC-11:00",
    "UTC-10:00",
    "UTC-09:00",
    "UTC-08:00",
    "UTC-05:00",
    "UTC+01:00",
    "UTC+05:30",
    "UTC+08:00",
    "UTC+09:00",
    "UTC+10:00",
    "UTC+12:00",
];

lazy_static! {
    static ref ZIP_REGEX: Regex = Regex::new(r"^[0-9]{5}$").unwrap();
    static ref PHONE_REGEX: Regex = Regex::new(r"^\+?[0-9]{10,15}$").unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates a two-letter US state code (case-sensitive).
pub fn validate_us_state(state: &str) -> Result<(), ValidationError> {
    if US_STATES.contains(&state) {
        Ok(())
    } else {
        Err(error("us_state", "State must be a two-letter US state code"))
    }
}

/// Validates a five-digit ZIP code.
pub fn validate_zip(zip: &str) -> Result<(), ValidationError> {
    if ZIP_REGEX.is_match(zip) {
        Ok(())
    } else {
        Err(error("zip", "ZIP code must be exactly 5 digits"))
    }
}

/// Validates a phone number: 10 to 15 digits with an optional leading `+`.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if PHONE_REGEX.is_match(phone) {
        Ok(())
    } else {
        Err(error("phone", "Phone number must contain 10 to 15 digits"))
    }
}

pub fn validate_business_category(category: &str) -> Result<(), ValidationError> {
    if BUSINESS_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(error("business_category", "Unknown business category"))
    }
}

pub fn validate_time_zone(time_zone: &str) -> Result<(), ValidationError> {
    if TIME_ZONES.contains(&time_zone) {
        Ok(())
    } else {
        Err(error("time_zone", "Unknown time zone"))
    }
}

/// Rejects strings that are empty after trimming whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("not_blank", "Value must not be blank"))
    } else {
        Ok(())
    }
}
