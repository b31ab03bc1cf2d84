//! Ship registry operations on top of a [`ShipStore`].

use std::sync::Arc;

use crate::domain::{Ship, ShipPayload};
use crate::error::{HangarError, Result};
use crate::query::{ShipFilter, ShipQuery, build_predicates};
use crate::store::ShipStore;
use crate::validation::{validate_draft, validate_patch};

/// Parse a path identifier; it must be a positive integer.
pub fn parse_id(raw: &str) -> Result<i64> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(HangarError::InvalidId(raw.to_string())),
    }
}

/// Result of an update request.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// Fields were applied and the ship was saved.
    Updated(Ship),
    /// The request carried no fields; the stored ship is returned as is.
    Unchanged(Ship),
}

impl UpdateOutcome {
    /// The ship to report back to the client.
    pub fn into_ship(self) -> Ship {
        match self {
            Self::Updated(ship) | Self::Unchanged(ship) => ship,
        }
    }
}

/// Orchestrates validation, rating, and storage.
#[derive(Clone)]
pub struct ShipService {
    store: Arc<dyn ShipStore>,
}

impl ShipService {
    /// Build a service over a store.
    pub fn new(store: Arc<dyn ShipStore>) -> Self {
        Self { store }
    }

    /// Fetch a ship.
    pub fn get(&self, id: i64) -> Result<Ship> {
        if id <= 0 {
            return Err(HangarError::InvalidId(id.to_string()));
        }
        self.store.find_by_id(id)?.ok_or(HangarError::NotFound(id))
    }

    /// Fetch one page of ships.
    pub fn list(&self, query: &ShipQuery) -> Result<Vec<Ship>> {
        self.store.query(query)
    }

    /// Count ships matching the filters.
    pub fn count(&self, filter: &ShipFilter) -> Result<i64> {
        self.store.count(&build_predicates(filter))
    }

    /// Validate and store a new ship.
    pub fn create(&self, payload: &ShipPayload) -> Result<Ship> {
        let ship = validate_draft(payload)?;
        self.store.insert(ship)
    }

    /// Apply a partial update.
    ///
    /// A missing payload and a payload with no fields are the same empty
    /// update: the current ship is returned without touching the store.
    pub fn update(&self, id: i64, payload: Option<&ShipPayload>) -> Result<UpdateOutcome> {
        let mut ship = self.get(id)?;
        let changes = match payload {
            Some(payload) => validate_patch(payload)?,
            None => None,
        };
        match changes {
            Some(changes) => {
                ship.apply(changes);
                self.store.update(ship).map(UpdateOutcome::Updated)
            }
            None => Ok(UpdateOutcome::Unchanged(ship)),
        }
    }

    /// Remove a ship, returning the deleted record.
    pub fn delete(&self, id: i64) -> Result<Ship> {
        let ship = self.get(id)?;
        self.store.delete(&ship)?;
        Ok(ship)
    }
}
