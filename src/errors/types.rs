//! Error type definitions for the CamionBack backend
//!
//! Two families live here. `AppError` covers the marketplace API surface
//! (validation, missing records, illegal state transitions, database
//! faults). `DistanceError` is the taxonomy of the distance-resolution
//! helper; every variant is caught at the resolver boundary and collapsed
//! into a null-distance result, so it never crosses into HTTP error
//! handling.

use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Illegal state transitions (e.g. accepting a non-pending offer)
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Permission denied errors
    #[error("Permission denied: {action} on {resource}")]
    PermissionDenied { action: String, resource: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Data serialization failures
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a not found error for a specific resource
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a conflict error for an illegal state transition
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied<A: Into<String>, R: Into<String>>(action: A, resource: R) -> Self {
        Self::PermissionDenied {
            action: action.into(),
            resource: resource.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Distance-resolution failure taxonomy.
///
/// All variants degrade to `{ distance_km: None, error: <reason> }` at the
/// resolver boundary; callers treat a missing distance as "unknown", never
/// as fatal.
#[derive(Error, Debug)]
pub enum DistanceError {
    /// Routing API credential missing; detected before any network call
    #[error("routing API key is not configured")]
    Configuration,

    /// A required city field is missing or blank
    #[error("missing required field: {field}")]
    Input { field: String },

    /// Non-2xx HTTP response from the routing API
    #[error("routing API transport failure: HTTP {status}")]
    UpstreamTransport { status: u16 },

    /// 2xx response carrying a non-OK API status (quota, invalid request)
    #[error("routing API returned status {status}")]
    UpstreamApi { status: String },

    /// The API answered but could not route between the given points
    #[error("no route found between '{origin}' and '{destination}'")]
    NoRoute { origin: String, destination: String },

    /// Network failure, malformed JSON, or anything else unanticipated
    #[error("unexpected routing failure: {message}")]
    Unexpected { message: String },
}

impl DistanceError {
    /// Create an input error for a missing field
    pub fn input<S: Into<String>>(field: S) -> Self {
        Self::Input {
            field: field.into(),
        }
    }

    /// Create an unexpected error from any displayable cause
    pub fn unexpected<S: ToString>(cause: S) -> Self {
        Self::Unexpected {
            message: cause.to_string(),
        }
    }
}
