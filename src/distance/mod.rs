//! Distance resolution
//!
//! Best-effort road distances between Moroccan cities, used to price
//! transport requests. Prefers precise address-to-address routing and
//! falls back to city-to-city routing memoized in an in-process TTL
//! cache, since the upstream distance-matrix API is metered.

pub mod cache;
pub mod matrix;
pub mod resolver;

pub use cache::{CityPairCache, Clock, SystemClock};
pub use matrix::{DistanceMatrixClient, RouteSource};
pub use resolver::DistanceResolver;
