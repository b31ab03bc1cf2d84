//! Database models for Hangar server.

use chrono::{DateTime, NaiveDateTime};
use diesel::prelude::*;
use hangar_core::{HangarError, NewShip, Ship};

use crate::schema::ships;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = ships)]
/// Ship database record.
pub struct ShipRecord {
    /// Ship identifier.
    pub id: i64,
    /// Ship name.
    pub name: String,
    /// Home planet.
    pub planet: String,
    /// Ship class name.
    pub ship_type: String,
    /// Production date, January 1st of the production year.
    pub prod_date: NaiveDateTime,
    /// Whether the ship has been used.
    pub is_used: bool,
    /// Speed.
    pub speed: f64,
    /// Crew size.
    pub crew_size: i32,
    /// Derived rating.
    pub rating: f64,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = ships)]
/// Insertable ship record, also used as the full-row changeset on update.
pub struct NewShipRecord {
    /// Ship name.
    pub name: String,
    /// Home planet.
    pub planet: String,
    /// Ship class name.
    pub ship_type: String,
    /// Production date.
    pub prod_date: NaiveDateTime,
    /// Whether the ship has been used.
    pub is_used: bool,
    /// Speed.
    pub speed: f64,
    /// Crew size.
    pub crew_size: i32,
    /// Derived rating.
    pub rating: f64,
}

/// Convert epoch milliseconds to a UTC timestamp column value.
pub fn timestamp_from_millis(millis: i64) -> Result<NaiveDateTime, HangarError> {
    DateTime::from_timestamp_millis(millis)
        .map(|at| at.naive_utc())
        .ok_or_else(|| HangarError::Store(format!("timestamp out of range: {millis}")))
}

impl TryFrom<ShipRecord> for Ship {
    type Error = HangarError;

    fn try_from(record: ShipRecord) -> Result<Self, Self::Error> {
        Ok(Ship {
            id: record.id,
            name: record.name,
            planet: record.planet,
            ship_type: record.ship_type.parse().map_err(HangarError::Store)?,
            prod_date: record.prod_date.and_utc().timestamp_millis(),
            is_used: record.is_used,
            speed: record.speed,
            crew_size: record.crew_size,
            rating: record.rating,
        })
    }
}

impl TryFrom<NewShip> for NewShipRecord {
    type Error = HangarError;

    fn try_from(ship: NewShip) -> Result<Self, Self::Error> {
        Ok(NewShipRecord {
            name: ship.name,
            planet: ship.planet,
            ship_type: ship.ship_type.as_str().to_string(),
            prod_date: timestamp_from_millis(ship.prod_date)?,
            is_used: ship.is_used,
            speed: ship.speed,
            crew_size: ship.crew_size,
            rating: ship.rating,
        })
    }
}

impl TryFrom<&Ship> for NewShipRecord {
    type Error = HangarError;

    fn try_from(ship: &Ship) -> Result<Self, Self::Error> {
        Ok(NewShipRecord {
            name: ship.name.clone(),
            planet: ship.planet.clone(),
            ship_type: ship.ship_type.as_str().to_string(),
            prod_date: timestamp_from_millis(ship.prod_date)?,
            is_used: ship.is_used,
            speed: ship.speed,
            crew_size: ship.crew_size,
            rating: ship.rating,
        })
    }
}
