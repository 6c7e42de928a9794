use axum::{extract::State, response::Json};

use crate::models::{DistanceQuery, DistanceResolution};
use crate::web::AppState;

/// Resolve a road distance. Always answers 200: a failed resolution is a
/// `distance_km: null` payload with a reason, not an HTTP error.
pub async fn resolve_distance(
    State(state): State<AppState>,
    Json(query): Json<DistanceQuery>,
) -> Json<DistanceResolution> {
    Json(state.resolver.resolve(&query).await)
}
