//! Error types for the CamionBack backend.

pub mod types;

pub use types::{AppError, DistanceError};

/// Convenience alias used across the service and database layers.
pub type AppResult<T> = Result<T, AppError>;
