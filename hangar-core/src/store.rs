//! Ship persistence abstraction.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::domain::{NewShip, Ship};
use crate::error::{HangarError, Result};
use crate::query::{Predicate, ShipQuery, SortKey, matches_all};

/// Storage backend for ship records.
#[cfg_attr(test, mockall::automock)]
pub trait ShipStore: Send + Sync {
    /// Fetch a ship by identifier.
    fn find_by_id(&self, id: i64) -> Result<Option<Ship>>;
    /// Store a new ship and return it with its assigned identifier.
    fn insert(&self, ship: NewShip) -> Result<Ship>;
    /// Overwrite an existing ship.
    fn update(&self, ship: Ship) -> Result<Ship>;
    /// Remove a ship.
    fn delete(&self, ship: &Ship) -> Result<()>;
    /// Run a filtered, ordered, paged query.
    fn query(&self, query: &ShipQuery) -> Result<Vec<Ship>>;
    /// Count ships matching every predicate.
    fn count(&self, predicates: &[Predicate]) -> Result<i64>;
}

#[derive(Debug, Default)]
struct MemoryState {
    ships: BTreeMap<i64, Ship>,
    last_id: i64,
}

/// In-memory ship store.
#[derive(Debug, Default, Clone)]
pub struct MemoryShipStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryShipStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn unavailable() -> HangarError {
    HangarError::Store("ship store unavailable".to_string())
}

fn compare(sort: SortKey, left: &Ship, right: &Ship) -> Ordering {
    let primary = match sort {
        SortKey::Id => Ordering::Equal,
        SortKey::Speed => left.speed.total_cmp(&right.speed),
        SortKey::ProdDate => left.prod_date.cmp(&right.prod_date),
        SortKey::Rating => left.rating.total_cmp(&right.rating),
    };
    primary.then(left.id.cmp(&right.id))
}

impl ShipStore for MemoryShipStore {
    fn find_by_id(&self, id: i64) -> Result<Option<Ship>> {
        let state = self.state.read().map_err(|_| unavailable())?;
        Ok(state.ships.get(&id).cloned())
    }

    fn insert(&self, ship: NewShip) -> Result<Ship> {
        let mut state = self.state.write().map_err(|_| unavailable())?;
        state.last_id += 1;
        let ship = ship.with_id(state.last_id);
        state.ships.insert(ship.id, ship.clone());
        Ok(ship)
    }

    fn update(&self, ship: Ship) -> Result<Ship> {
        let mut state = self.state.write().map_err(|_| unavailable())?;
        let entry = state
            .ships
            .get_mut(&ship.id)
            .ok_or(HangarError::NotFound(ship.id))?;
        *entry = ship.clone();
        Ok(ship)
    }

    fn delete(&self, ship: &Ship) -> Result<()> {
        let mut state = self.state.write().map_err(|_| unavailable())?;
        state
            .ships
            .remove(&ship.id)
            .map(|_| ())
            .ok_or(HangarError::NotFound(ship.id))
    }

    fn query(&self, query: &ShipQuery) -> Result<Vec<Ship>> {
        let state = self.state.read().map_err(|_| unavailable())?;
        let mut ships: Vec<Ship> = state
            .ships
            .values()
            .filter(|ship| matches_all(&query.predicates, ship))
            .cloned()
            .collect();
        ships.sort_by(|left, right| compare(query.sort, left, right));
        let offset = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.page.limit()).unwrap_or(0);
        Ok(ships.into_iter().skip(offset).take(limit).collect())
    }

    fn count(&self, predicates: &[Predicate]) -> Result<i64> {
        let state = self.state.read().map_err(|_| unavailable())?;
        let count = state
            .ships
            .values()
            .filter(|ship| matches_all(predicates, ship))
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }
}
