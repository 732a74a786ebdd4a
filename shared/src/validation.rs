use rustrict::CensorStr;

use crate::models::{HeatPointRequest, SubscribeRequest, VoteRequest};

pub const MIN_CITY_LENGTH: usize = 2;
pub const MAX_CITY_LENGTH: usize = 80;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MAX_LONGITUDE: f64 = 180.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("City name must be at least {MIN_CITY_LENGTH} characters")]
    CityTooShort,
    #[error("City name exceeds maximum length of {MAX_CITY_LENGTH}")]
    CityTooLong,
    #[error("City name must contain at least one letter")]
    CityWithoutLetter,
    #[error("Possible profanity detected in city name: {0}")]
    InappropriateCity(String),
    #[error("Please enter a valid email")]
    InvalidEmail,
    #[error("Email exceeds maximum length of {MAX_EMAIL_LENGTH}")]
    EmailTooLong,
    #[error("Coordinates out of range: lat {lat}, lng {lng}")]
    CoordinatesOutOfRange { lat: f64, lng: f64 },
    #[error("Provide lat/lng or a non-empty location string")]
    MissingLocation,
}

/// Canonical city key: trimmed, internal whitespace collapsed to single
/// spaces, every word title-cased.
pub fn normalize_city_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

// Word boundaries restart after any non-alphanumeric character, so
// "winston-salem" becomes "Winston-Salem".
fn capitalize_word(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    let mut at_boundary = true;
    for ch in word.chars() {
        if at_boundary {
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
        at_boundary = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn validate_city(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < MIN_CITY_LENGTH { return Err(ValidationError::CityTooShort); }
    if len > MAX_CITY_LENGTH { return Err(ValidationError::CityTooLong); }
    if !trimmed.chars().any(char::is_alphabetic) { return Err(ValidationError::CityWithoutLetter); }
    let city = normalize_city_name(trimmed);
    if city.is_inappropriate() {
        return Err(ValidationError::InappropriateCity(city));
    }
    Ok(city)
}

/// Accepts `local@domain.tld` with no whitespace and a single `@`.
pub fn validate_email(raw: &str) -> Result<String, ValidationError> {
    let email = normalize_email(raw);
    if email.len() > MAX_EMAIL_LENGTH { return Err(ValidationError::EmailTooLong); }

    let (local, domain) = email.split_once('@').ok_or(ValidationError::InvalidEmail)?;
    let well_formed = !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .rsplit_once('.')
            .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty());

    if well_formed { Ok(email) } else { Err(ValidationError::InvalidEmail) }
}

/// Validated, normalized `(city_key, voter_key)`.
pub fn validate_vote_request(request: &VoteRequest) -> Result<(String, String), ValidationError> {
    let city = validate_city(&request.city)?;
    let email = validate_email(&request.email)?;
    Ok((city, email))
}

pub fn validate_subscribe_request(request: &SubscribeRequest) -> Result<String, ValidationError> {
    validate_email(&request.email)
}

pub fn validate_coordinates(lat: f64, lng: f64) -> Result<(), ValidationError> {
    if lat.is_finite() && lng.is_finite() && lat.abs() <= MAX_LATITUDE && lng.abs() <= MAX_LONGITUDE {
        Ok(())
    } else {
        Err(ValidationError::CoordinatesOutOfRange { lat, lng })
    }
}

pub enum HeatPointSource {
    Coordinates { lat: f64, lng: f64, intensity: Option<f64> },
    Location(String),
}

/// Explicit coordinates win over a location string when both are present.
pub fn validate_heat_point_request(request: &HeatPointRequest) -> Result<HeatPointSource, ValidationError> {
    if let (Some(lat), Some(lng)) = (request.lat, request.lng) {
        validate_coordinates(lat, lng)?;
        return Ok(HeatPointSource::Coordinates { lat, lng, intensity: request.intensity });
    }

    match request.location_string.as_deref().map(str::trim) {
        Some(location) if !location.is_empty() => Ok(HeatPointSource::Location(location.to_string())),
        _ => Err(ValidationError::MissingLocation),
    }
}
