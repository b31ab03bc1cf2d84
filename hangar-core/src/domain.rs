//! Domain entities for Hangar.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::rating::{rating, year_of_millis};

/// Class of a ship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipType {
    /// Cargo and passenger transport.
    Transport,
    /// Armed vessel.
    Military,
    /// Trading vessel.
    Merchant,
}

impl ShipType {
    /// All ship classes, in declaration order.
    pub const ALL: [ShipType; 3] = [Self::Transport, Self::Military, Self::Merchant];

    /// Wire and column representation of the class.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "TRANSPORT",
            Self::Military => "MILITARY",
            Self::Merchant => "MERCHANT",
        }
    }
}

impl fmt::Display for ShipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShipType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| format!("unknown ship type: {value}"))
    }
}

/// A persisted ship record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ship {
    /// Store-assigned identifier.
    pub id: i64,
    /// Ship name.
    pub name: String,
    /// Home planet.
    pub planet: String,
    /// Ship class.
    pub ship_type: ShipType,
    /// Production date as epoch milliseconds, normalized to January 1st.
    pub prod_date: i64,
    /// Whether the ship has been used.
    pub is_used: bool,
    /// Speed, rounded to two decimals.
    pub speed: f64,
    /// Crew size.
    pub crew_size: i32,
    /// Derived rating.
    pub rating: f64,
}

impl Ship {
    /// Merge validated changes into the ship and recompute its rating.
    pub fn apply(&mut self, changes: ShipChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(planet) = changes.planet {
            self.planet = planet;
        }
        if let Some(ship_type) = changes.ship_type {
            self.ship_type = ship_type;
        }
        if let Some(prod_date) = changes.prod_date {
            self.prod_date = prod_date;
        }
        if let Some(is_used) = changes.is_used {
            self.is_used = is_used;
        }
        if let Some(speed) = changes.speed {
            self.speed = speed;
        }
        if let Some(crew_size) = changes.crew_size {
            self.crew_size = crew_size;
        }
        self.rating = rating(self.speed, production_year(self.prod_date), self.is_used);
    }
}

/// A validated ship that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShip {
    /// Ship name.
    pub name: String,
    /// Home planet.
    pub planet: String,
    /// Ship class.
    pub ship_type: ShipType,
    /// Production date as epoch milliseconds, normalized to January 1st.
    pub prod_date: i64,
    /// Whether the ship has been used.
    pub is_used: bool,
    /// Speed, rounded to two decimals.
    pub speed: f64,
    /// Crew size.
    pub crew_size: i32,
    /// Derived rating.
    pub rating: f64,
}

impl NewShip {
    /// Attach a store-assigned identifier.
    pub fn with_id(self, id: i64) -> Ship {
        Ship {
            id,
            name: self.name,
            planet: self.planet,
            ship_type: self.ship_type,
            prod_date: self.prod_date,
            is_used: self.is_used,
            speed: self.speed,
            crew_size: self.crew_size,
            rating: self.rating,
        }
    }
}

/// Request body for create and update operations.
///
/// Every field is optional on the wire; create requires all but `isUsed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipPayload {
    /// Ship name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Home planet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planet: Option<String>,
    /// Ship class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_type: Option<ShipType>,
    /// Production date as epoch milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prod_date: Option<i64>,
    /// Whether the ship has been used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_used: Option<bool>,
    /// Speed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    /// Crew size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crew_size: Option<i32>,
}

impl ShipPayload {
    /// Whether no field is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.planet.is_none()
            && self.ship_type.is_none()
            && self.prod_date.is_none()
            && self.is_used.is_none()
            && self.speed.is_none()
            && self.crew_size.is_none()
    }

    /// Wire names of the fields a create payload must carry.
    pub const REQUIRED_FIELDS: [&'static str; 6] =
        ["name", "planet", "shipType", "prodDate", "speed", "crewSize"];

    fn required_present(&self) -> [bool; 6] {
        [
            self.name.is_some(),
            self.planet.is_some(),
            self.ship_type.is_some(),
            self.prod_date.is_some(),
            self.speed.is_some(),
            self.crew_size.is_some(),
        ]
    }

    /// Wire names of the fields a create payload must carry but does not.
    pub fn missing_required(&self) -> Vec<&'static str> {
        Self::REQUIRED_FIELDS
            .into_iter()
            .zip(self.required_present())
            .filter_map(|(field, present)| (!present).then_some(field))
            .collect()
    }
}

/// Validated and normalized field values from a [`ShipPayload`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipChanges {
    /// Ship name.
    pub name: Option<String>,
    /// Home planet.
    pub planet: Option<String>,
    /// Ship class.
    pub ship_type: Option<ShipType>,
    /// Production date normalized to January 1st.
    pub prod_date: Option<i64>,
    /// Whether the ship has been used.
    pub is_used: Option<bool>,
    /// Speed rounded to two decimals.
    pub speed: Option<f64>,
    /// Crew size.
    pub crew_size: Option<i32>,
}

/// Production year of a normalized timestamp.
///
/// Stored timestamps are always resolvable; the fallback only guards the
/// formula against a corrupted row.
pub(crate) fn production_year(prod_date: i64) -> i32 {
    year_of_millis(prod_date).unwrap_or(crate::rating::CURRENT_YEAR)
}
