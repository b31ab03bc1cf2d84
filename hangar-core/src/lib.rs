#![deny(missing_docs)]
//! Hangar core library.
//!
//! This crate contains the ship domain types, validation and rating rules,
//! list query construction, and the storage abstraction shared by the Hangar
//! server and CLI.

pub mod domain;
pub mod error;
pub mod query;
pub mod rating;
pub mod report;
pub mod service;
pub mod store;
pub mod validation;

pub use domain::{NewShip, Ship, ShipChanges, ShipPayload, ShipType};
pub use error::{HangarError, Result};
pub use query::{
    DEFAULT_PAGE_SIZE, Edge, Equality, Limit, PageParams, PageRequest, Predicate, ShipFilter,
    ShipQuery, SortKey, TextColumn, build_predicates,
};
pub use rating::{first_day_of_year, rating, round2, start_of_year_millis, year_of_millis};
pub use report::{render_json, render_ship_text, render_ships_markdown, render_ships_text};
pub use service::{ShipService, UpdateOutcome, parse_id};
pub use store::{MemoryShipStore, ShipStore};
pub use validation::{validate_draft, validate_patch};
