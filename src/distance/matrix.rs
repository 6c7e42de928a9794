//! Distance-matrix HTTP client
//!
//! Thin wrapper around the upstream routing API. One request per call, no
//! retries; callers inherit the client's timeout. The [`RouteSource`]
//! trait is the seam the resolver is tested through.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::RoutingConfig;
use crate::errors::DistanceError;

/// Road-routing distance lookup between two place strings.
#[async_trait]
pub trait RouteSource: Send + Sync {
    /// Driving distance in meters from `origin` to `destination`.
    async fn route_distance_meters(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<u64, DistanceError>;
}

/// Client for the distance-matrix API (origin, destination, driving mode,
/// region and language hints).
pub struct DistanceMatrixClient {
    client: Client,
    endpoint: String,
    api_key: String,
    region: String,
    language: String,
}

impl DistanceMatrixClient {
    /// Build a client from config. Refuses construction when the API key
    /// is absent so the missing credential is caught before any network
    /// call is ever attempted.
    pub fn new(config: &RoutingConfig) -> Result<Self, DistanceError> {
        if config.api_key.trim().is_empty() {
            return Err(DistanceError::Configuration);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("CamionBack/1.0")
            .build()
            .unwrap_or_else(|_| Client::new());

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            region: config.region.clone(),
            language: config.language.clone(),
        })
    }
}

#[async_trait]
impl RouteSource for DistanceMatrixClient {
    async fn route_distance_meters(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<u64, DistanceError> {
        debug!("Querying distance matrix: '{}' -> '{}'", origin, destination);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("origins", origin),
                ("destinations", destination),
                ("mode", "driving"),
                ("region", &self.region),
                ("language", &self.language),
                ("key", &self.api_key),
            ])
            .send()
            .await
            .map_err(DistanceError::unexpected)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DistanceError::UpstreamTransport {
                status: status.as_u16(),
            });
        }

        let body: MatrixResponse = response
            .json()
            .await
            .map_err(DistanceError::unexpected)?;

        if body.status != "OK" {
            return Err(DistanceError::UpstreamApi { status: body.status });
        }

        let element = body
            .rows
            .first()
            .and_then(|row| row.elements.first())
            .ok_or_else(|| DistanceError::unexpected("response carried no route element"))?;

        if element.status != "OK" {
            return Err(DistanceError::NoRoute {
                origin: origin.to_string(),
                destination: destination.to_string(),
            });
        }

        element
            .distance
            .as_ref()
            .map(|d| d.value)
            .ok_or_else(|| DistanceError::unexpected("route element carried no distance"))
    }
}

#[derive(Debug, Deserialize)]
struct MatrixResponse {
    status: String,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    distance: Option<MatrixDistance>,
}

#[derive(Debug, Deserialize)]
struct MatrixDistance {
    /// Meters.
    value: u64,
}
