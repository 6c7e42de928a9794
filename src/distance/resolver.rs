//! Distance resolution algorithm
//!
//! Given a transport request's cities and optional street addresses,
//! produce a best-effort road distance in kilometers:
//!
//! 1. both addresses present → one address-level routing attempt using
//!    `"{address}, {city}"` on each side; success short-circuits,
//! 2. otherwise (or on address failure) → city-pair cache lookup,
//! 3. cache miss/expired → one city-level routing attempt, write-through,
//! 4. everything failed → null distance plus a reason string.
//!
//! Failures never propagate; callers treat a missing distance as
//! "unknown". Each decision point emits a structured log line carrying
//! the caller's reference id.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::distance::cache::CityPairCache;
use crate::distance::matrix::RouteSource;
use crate::errors::DistanceError;
use crate::models::{DistanceQuery, DistanceResolution, DistanceSource};
use crate::utils::{format_place, is_blank};

pub struct DistanceResolver {
    /// `None` when the routing credential is not configured; every
    /// resolution then degrades immediately without a network call.
    route_source: Option<Arc<dyn RouteSource>>,
    cache: CityPairCache,
}

impl DistanceResolver {
    pub fn new(route_source: Option<Arc<dyn RouteSource>>, cache: CityPairCache) -> Self {
        Self {
            route_source,
            cache,
        }
    }

    /// Resolve a road distance for the given query. Always returns a
    /// result shape; never panics or errors out.
    pub async fn resolve(&self, query: &DistanceQuery) -> DistanceResolution {
        let reference = query.reference_id.as_deref().unwrap_or("-");

        if query.from_city.trim().is_empty() {
            return DistanceResolution::failure(DistanceError::input("from_city"));
        }
        if query.to_city.trim().is_empty() {
            return DistanceResolution::failure(DistanceError::input("to_city"));
        }

        let Some(route_source) = &self.route_source else {
            warn!(
                reference,
                "Distance resolution skipped: routing API key is not configured"
            );
            return DistanceResolution::failure(DistanceError::Configuration);
        };

        // Level 1: precise address-to-address routing.
        if !is_blank(query.departure_address.as_deref())
            && !is_blank(query.arrival_address.as_deref())
        {
            let origin = format_place(
                query.departure_address.as_deref().unwrap_or_default(),
                &query.from_city,
            );
            let destination = format_place(
                query.arrival_address.as_deref().unwrap_or_default(),
                &query.to_city,
            );

            match route_source.route_distance_meters(&origin, &destination).await {
                Ok(meters) => {
                    let distance_km = round_km(meters);
                    info!(
                        reference,
                        distance_km, "Resolved distance at address level"
                    );
                    return DistanceResolution {
                        distance_km: Some(distance_km),
                        source: Some(DistanceSource::Address),
                        was_cached: None,
                        error: None,
                    };
                }
                Err(e) => {
                    warn!(
                        reference,
                        error = %e,
                        "Address-level routing failed, falling back to city pair"
                    );
                }
            }
        }

        // Level 2: city-to-city with memoization, cache consulted first.
        let key = CityPairCache::key(&query.from_city, &query.to_city);

        if let Some(distance_km) = self.cache.get(&key) {
            info!(reference, key = %key, distance_km, "City distance cache hit");
            return DistanceResolution {
                distance_km: Some(distance_km),
                source: Some(DistanceSource::City),
                was_cached: Some(true),
                error: None,
            };
        }
        debug!(reference, key = %key, "City distance cache miss");

        match route_source
            .route_distance_meters(query.from_city.trim(), query.to_city.trim())
            .await
        {
            Ok(meters) => {
                let distance_km = round_km(meters);
                self.cache.insert(key, distance_km);
                info!(
                    reference,
                    distance_km, "Resolved distance at city level"
                );
                DistanceResolution {
                    distance_km: Some(distance_km),
                    source: Some(DistanceSource::City),
                    was_cached: Some(false),
                    error: None,
                }
            }
            Err(e) => {
                warn!(reference, error = %e, "Distance resolution failed at every level");
                DistanceResolution::failure(e)
            }
        }
    }
}

/// Meters → nearest integer kilometer.
fn round_km(meters: u64) -> u32 {
    ((meters as f64) / 1000.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// RouteSource fake that replays scripted outcomes and records every
    /// (origin, destination) it was asked for.
    struct ScriptedRoutes {
        outcomes: Mutex<VecDeque<Result<u64, DistanceError>>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedRoutes {
        fn new(outcomes: Vec<Result<u64, DistanceError>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RouteSource for ScriptedRoutes {
        async fn route_distance_meters(
            &self,
            origin: &str,
            destination: &str,
        ) -> Result<u64, DistanceError> {
            self.calls
                .lock()
                .unwrap()
                .push((origin.to_string(), destination.to_string()));
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(DistanceError::unexpected("script exhausted")))
        }
    }

    fn resolver_with(routes: Arc<ScriptedRoutes>) -> DistanceResolver {
        DistanceResolver::new(Some(routes), CityPairCache::new(30))
    }

    fn city_query(from: &str, to: &str) -> DistanceQuery {
        DistanceQuery {
            from_city: from.to_string(),
            to_city: to.to_string(),
            departure_address: None,
            arrival_address: None,
            reference_id: None,
        }
    }

    #[tokio::test]
    async fn city_level_success_is_rounded_and_uncached_on_first_hit() {
        let routes = Arc::new(ScriptedRoutes::new(vec![Ok(87_000)]));
        let resolver = resolver_with(routes.clone());

        let result = resolver.resolve(&city_query("Casablanca", "Rabat")).await;

        assert_eq!(result.distance_km, Some(87));
        assert_eq!(result.source, Some(DistanceSource::City));
        assert_eq!(result.was_cached, Some(false));
        assert!(result.error.is_none());
        assert_eq!(routes.calls(), vec![("Casablanca".to_string(), "Rabat".to_string())]);
    }

    #[tokio::test]
    async fn second_resolution_of_same_pair_hits_the_cache() {
        let routes = Arc::new(ScriptedRoutes::new(vec![Ok(87_400)]));
        let resolver = resolver_with(routes.clone());

        let first = resolver.resolve(&city_query("Casablanca", "Rabat")).await;
        assert_eq!(first.was_cached, Some(false));

        // Diacritics/case/whitespace variants share the entry.
        let second = resolver.resolve(&city_query(" CASABLANCA ", "rabat")).await;
        assert_eq!(second.distance_km, Some(87));
        assert_eq!(second.was_cached, Some(true));
        assert_eq!(routes.calls().len(), 1, "no second upstream call");
    }

    #[tokio::test]
    async fn address_success_never_consults_city_path_or_cache() {
        let routes = Arc::new(ScriptedRoutes::new(vec![Ok(93_500)]));
        let resolver = resolver_with(routes.clone());

        let query = DistanceQuery {
            from_city: "Casablanca".to_string(),
            to_city: "Rabat".to_string(),
            departure_address: Some("12 Rue Ibn Sina".to_string()),
            arrival_address: Some("Avenue Mohammed V".to_string()),
            reference_id: Some("req-1".to_string()),
        };
        let result = resolver.resolve(&query).await;

        assert_eq!(result.distance_km, Some(94));
        assert_eq!(result.source, Some(DistanceSource::Address));
        assert_eq!(result.was_cached, None);
        assert_eq!(
            routes.calls(),
            vec![(
                "12 Rue Ibn Sina, Casablanca".to_string(),
                "Avenue Mohammed V, Rabat".to_string()
            )]
        );
        assert!(resolver.cache.is_empty(), "address path leaves cache untouched");
    }

    #[tokio::test]
    async fn address_failure_falls_back_to_exactly_one_city_attempt() {
        let routes = Arc::new(ScriptedRoutes::new(vec![
            Err(DistanceError::NoRoute {
                origin: "x".to_string(),
                destination: "y".to_string(),
            }),
            Ok(91_000),
        ]));
        let resolver = resolver_with(routes.clone());

        let query = DistanceQuery {
            from_city: "Casablanca".to_string(),
            to_city: "Rabat".to_string(),
            departure_address: Some("Quartier inconnu".to_string()),
            arrival_address: Some("Adresse invalide".to_string()),
            reference_id: None,
        };
        let result = resolver.resolve(&query).await;

        assert_eq!(result.distance_km, Some(91));
        assert_eq!(result.source, Some(DistanceSource::City));
        assert_eq!(result.was_cached, Some(false));
        assert_eq!(routes.calls().len(), 2, "one address attempt, one city attempt");
    }

    #[tokio::test]
    async fn fallback_consults_cache_before_the_network() {
        let routes = Arc::new(ScriptedRoutes::new(vec![
            Err(DistanceError::UpstreamApi {
                status: "OVER_QUERY_LIMIT".to_string(),
            }),
        ]));
        let resolver = resolver_with(routes.clone());
        resolver
            .cache
            .insert(CityPairCache::key("Casablanca", "Rabat"), 87);

        let query = DistanceQuery {
            from_city: "Casablanca".to_string(),
            to_city: "Rabat".to_string(),
            departure_address: Some("12 Rue Ibn Sina".to_string()),
            arrival_address: Some("Avenue Mohammed V".to_string()),
            reference_id: None,
        };
        let result = resolver.resolve(&query).await;

        assert_eq!(result.distance_km, Some(87));
        assert_eq!(result.was_cached, Some(true));
        assert_eq!(routes.calls().len(), 1, "address attempt only; city served from cache");
    }

    #[tokio::test]
    async fn all_failures_collapse_to_null_distance_with_reason() {
        let routes = Arc::new(ScriptedRoutes::new(vec![Err(
            DistanceError::UpstreamTransport { status: 503 },
        )]));
        let resolver = resolver_with(routes);

        let result = resolver.resolve(&city_query("Casablanca", "Dakhla")).await;

        assert_eq!(result.distance_km, None);
        assert_eq!(result.source, None);
        assert!(result.error.unwrap().contains("503"));
    }

    #[tokio::test]
    async fn blank_city_is_rejected_before_any_call() {
        let routes = Arc::new(ScriptedRoutes::new(vec![Ok(1_000)]));
        let resolver = resolver_with(routes.clone());

        let result = resolver.resolve(&city_query("  ", "Rabat")).await;

        assert_eq!(result.distance_km, None);
        assert!(result.error.unwrap().contains("from_city"));
        assert!(routes.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_credential_degrades_without_network() {
        let resolver = DistanceResolver::new(None, CityPairCache::new(30));

        let result = resolver.resolve(&city_query("Casablanca", "Rabat")).await;

        assert_eq!(result.distance_km, None);
        assert!(result.error.unwrap().contains("not configured"));
    }

    #[test]
    fn meters_round_to_nearest_kilometer() {
        assert_eq!(round_km(87_000), 87);
        assert_eq!(round_km(87_499), 87);
        assert_eq!(round_km(87_500), 88);
        assert_eq!(round_km(400), 0);
    }
}
