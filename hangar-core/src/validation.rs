//! Field validation for create and update payloads.

use crate::domain::{NewShip, ShipChanges, ShipPayload};
use crate::error::{HangarError, Result};
use crate::rating::{CURRENT_YEAR, first_day_of_year, rating, round2, year_of_millis};

/// Maximum length of `name` and `planet`, in characters.
pub const MAX_TEXT_LEN: usize = 50;
/// Earliest accepted production year.
pub const MIN_PROD_YEAR: i32 = 2800;
/// Latest accepted production year.
pub const MAX_PROD_YEAR: i32 = CURRENT_YEAR;
/// Lowest accepted speed after rounding.
pub const MIN_SPEED: f64 = 0.01;
/// Highest accepted speed after rounding.
pub const MAX_SPEED: f64 = 0.99;
/// Smallest accepted crew.
pub const MIN_CREW_SIZE: i32 = 1;
/// Largest accepted crew.
pub const MAX_CREW_SIZE: i32 = 9999;

/// Validate a create payload into a ship ready to be stored.
///
/// All fields except `isUsed` are required; `isUsed` defaults to `false`.
pub fn validate_draft(payload: &ShipPayload) -> Result<NewShip> {
    let missing = payload.missing_required();
    if missing.len() == ShipPayload::REQUIRED_FIELDS.len() {
        return Err(HangarError::Empty);
    }
    if !missing.is_empty() {
        return Err(HangarError::Incomplete(missing));
    }
    let ShipChanges {
        name: Some(name),
        planet: Some(planet),
        ship_type: Some(ship_type),
        prod_date: Some(prod_date),
        is_used,
        speed: Some(speed),
        crew_size: Some(crew_size),
    } = validate_fields(payload)?
    else {
        return Err(HangarError::Incomplete(payload.missing_required()));
    };
    let is_used = is_used.unwrap_or(false);
    let year = year_of_millis(prod_date).unwrap_or(MIN_PROD_YEAR);
    Ok(NewShip {
        name,
        planet,
        ship_type,
        prod_date,
        is_used,
        speed,
        crew_size,
        rating: rating(speed, year, is_used),
    })
}

/// Validate an update payload.
///
/// Returns `Ok(None)` when no field is present: an empty update leaves the
/// ship untouched.
pub fn validate_patch(payload: &ShipPayload) -> Result<Option<ShipChanges>> {
    if payload.is_empty() {
        return Ok(None);
    }
    validate_fields(payload).map(Some)
}

/// Check every present field and normalize `prodDate` and `speed`.
pub fn validate_fields(payload: &ShipPayload) -> Result<ShipChanges> {
    let name = payload
        .name
        .as_deref()
        .map(|value| check_text("name", value))
        .transpose()?;
    let planet = payload
        .planet
        .as_deref()
        .map(|value| check_text("planet", value))
        .transpose()?;
    let prod_date = payload.prod_date.map(check_prod_date).transpose()?;
    let speed = payload.speed.map(check_speed).transpose()?;
    let crew_size = payload.crew_size.map(check_crew_size).transpose()?;

    Ok(ShipChanges {
        name,
        planet,
        ship_type: payload.ship_type,
        prod_date,
        is_used: payload.is_used,
        speed,
        crew_size,
    })
}

fn check_text(field: &'static str, value: &str) -> Result<String> {
    let length = value.chars().count();
    if length == 0 {
        return Err(HangarError::invalid_field(field, "must not be empty"));
    }
    if length > MAX_TEXT_LEN {
        return Err(HangarError::invalid_field(
            field,
            format!("{length} characters exceeds {MAX_TEXT_LEN}"),
        ));
    }
    Ok(value.to_string())
}

fn check_prod_date(millis: i64) -> Result<i64> {
    if millis < 0 {
        return Err(HangarError::invalid_field("prodDate", "less than 0"));
    }
    let year = year_of_millis(millis).ok_or_else(|| unrepresentable(millis))?;
    if !(MIN_PROD_YEAR..=MAX_PROD_YEAR).contains(&year) {
        return Err(HangarError::invalid_field(
            "prodDate",
            format!("year {year} is outside [{MIN_PROD_YEAR}, {MAX_PROD_YEAR}]"),
        ));
    }
    first_day_of_year(millis).ok_or_else(|| unrepresentable(millis))
}

fn unrepresentable(millis: i64) -> HangarError {
    HangarError::invalid_field("prodDate", format!("{millis} is not a valid timestamp"))
}

fn check_speed(speed: f64) -> Result<f64> {
    let rounded = round2(speed);
    if !(MIN_SPEED..=MAX_SPEED).contains(&rounded) {
        return Err(HangarError::invalid_field(
            "speed",
            format!("{rounded} is outside [{MIN_SPEED}, {MAX_SPEED}]"),
        ));
    }
    Ok(rounded)
}

fn check_crew_size(crew_size: i32) -> Result<i32> {
    if !(MIN_CREW_SIZE..=MAX_CREW_SIZE).contains(&crew_size) {
        return Err(HangarError::invalid_field(
            "crewSize",
            format!("{crew_size} is outside [{MIN_CREW_SIZE}, {MAX_CREW_SIZE}]"),
        ));
    }
    Ok(crew_size)
}
