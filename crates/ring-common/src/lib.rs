//! Common types and utilities shared across the medicane closed-ring crates.

pub mod catalog;
pub mod error;
pub mod event;
pub mod geo;
pub mod grid;
pub mod label;

pub use catalog::Catalog;
pub use error::{RingError, RingResult};
pub use event::{EventRecord, EventTable};
pub use geo::{haversine_km, GeoBox, GeoPoint, EARTH_RADIUS_KM};
pub use grid::WindGrid;
pub use label::Label;
