use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use camionback::config::Config;
use camionback::database::Database;
use camionback::distance::{CityPairCache, DistanceResolver, RouteSource};
use camionback::errors::DistanceError;
use camionback::web::{AppState, WebServer};

/// RouteSource stub answering every query with a fixed distance.
struct FixedRoute(u64);

#[async_trait::async_trait]
impl RouteSource for FixedRoute {
    async fn route_distance_meters(
        &self,
        _origin: &str,
        _destination: &str,
    ) -> Result<u64, DistanceError> {
        Ok(self.0)
    }
}

/// Build the real router against a fresh in-memory database.
async fn build_app(route_source: Option<Arc<dyn RouteSource>>) -> Router {
    let mut config = Config::default();
    config.database.url = "sqlite::memory:".to_string();
    config.database.max_connections = Some(1);

    let database = Database::new(&config.database).await.unwrap();
    database.migrate().await.unwrap();

    let cache = CityPairCache::new(config.routing.cache_ttl_days);
    let resolver = Arc::new(DistanceResolver::new(route_source, cache));
    let state = AppState::new(config, database, resolver);

    WebServer::create_router(state)
}

// Helper function to send requests to the app
async fn send_request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request_builder = Request::builder().method(method).uri(uri);

    let request = if let Some(body) = body {
        request_builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    } else {
        request_builder.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(json!({}))
    };

    (status, json)
}

async fn create_user(app: &Router, name: &str, phone: &str, role: &str) -> Uuid {
    let (status, body) = send_request(
        app,
        Method::POST,
        "/api/v1/users",
        Some(json!({ "name": name, "phone": phone, "role": role, "city": "Casablanca" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "user creation failed: {body}");
    Uuid::parse_str(body["id"].as_str().unwrap()).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let app = build_app(None).await;

    let (status, body) = send_request(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body.get("timestamp").is_some());
}

#[tokio::test]
async fn user_roles_accept_legacy_vocabulary_and_answer_canonical() {
    let app = build_app(None).await;

    // Legacy spelling in, canonical spelling out.
    let (status, body) = send_request(
        &app,
        Method::POST,
        "/api/v1/users",
        Some(json!({ "name": "Youssef", "phone": "+212600000001", "role": "transporter" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "transporteur");
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send_request(&app, Method::GET, &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "transporteur");

    // Read-side legacy coordinator spelling works too.
    let (status, body) = send_request(
        &app,
        Method::POST,
        "/api/v1/users",
        Some(json!({ "name": "Nadia", "phone": "+212600000002", "role": "coordinateur" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "coordinator");

    // Unknown roles are rejected at the boundary.
    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/users",
        Some(json!({ "name": "X", "phone": "+212600000003", "role": "driver" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_update_and_delete_round_trip() {
    let app = build_app(None).await;
    let id = create_user(&app, "Khalid", "+212611111111", "client").await;

    let (status, body) = send_request(
        &app,
        Method::PUT,
        &format!("/api/v1/users/{id}"),
        Some(json!({ "name": "Khalid B.", "is_active": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Khalid B.");
    assert_eq!(body["is_active"], false);

    let (status, _) = send_request(&app, Method::DELETE, &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send_request(&app, Method::GET, &format!("/api/v1/users/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn distance_endpoint_degrades_to_null_when_unconfigured() {
    let app = build_app(None).await;

    let (status, body) = send_request(
        &app,
        Method::POST,
        "/api/v1/distance/resolve",
        Some(json!({ "from_city": "Casablanca", "to_city": "Rabat" })),
    )
    .await;

    // Degraded resolution is data, not an HTTP error.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["distance_km"], Value::Null);
    assert!(body["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn distance_endpoint_resolves_city_pairs() {
    let app = build_app(Some(Arc::new(FixedRoute(87_000)))).await;

    let (status, body) = send_request(
        &app,
        Method::POST,
        "/api/v1/distance/resolve",
        Some(json!({ "from_city": "Casablanca", "to_city": "Rabat" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["distance_km"], 87);
    assert_eq!(body["source"], "city");
    assert_eq!(body["was_cached"], false);

    // Same pair again is served from the memoization cache.
    let (_, body) = send_request(
        &app,
        Method::POST,
        "/api/v1/distance/resolve",
        Some(json!({ "from_city": "casablanca ", "to_city": "RABAT" })),
    )
    .await;
    assert_eq!(body["distance_km"], 87);
    assert_eq!(body["was_cached"], true);
}

#[tokio::test]
async fn request_creation_attaches_distance_and_notifies_coordinators() {
    let app = build_app(Some(Arc::new(FixedRoute(87_000)))).await;
    let client_id = create_user(&app, "Amina", "+212622222222", "client").await;
    let coordinator_id = create_user(&app, "Nadia", "+212622222223", "coordinator").await;

    let (status, body) = send_request(
        &app,
        Method::POST,
        "/api/v1/requests",
        Some(json!({
            "client_id": client_id,
            "from_city": "Casablanca",
            "to_city": "Rabat",
            "goods_description": "Palettes de carrelage",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "request creation failed: {body}");
    assert_eq!(body["status"], "open");
    assert_eq!(body["distance_km"], 87);
    assert_eq!(body["distance_source"], "city");

    let (status, body) = send_request(
        &app,
        Method::GET,
        &format!("/api/v1/users/{coordinator_id}/notifications"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let notifications = body.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["kind"], "new_request");
    assert_eq!(notifications[0]["is_read"], false);

    let notification_id = notifications[0]["id"].as_str().unwrap().to_string();
    let (status, _) = send_request(
        &app,
        Method::POST,
        &format!("/api/v1/notifications/{notification_id}/read"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send_request(
        &app,
        Method::GET,
        &format!("/api/v1/users/{coordinator_id}/notifications"),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap()[0]["is_read"], true);
}

#[tokio::test]
async fn offer_lifecycle_accept_rejects_siblings_and_assigns_request() {
    let app = build_app(None).await;
    let client_id = create_user(&app, "Amina", "+212633333331", "client").await;
    let t1 = create_user(&app, "Youssef", "+212633333332", "transporteur").await;
    let t2 = create_user(&app, "Rachid", "+212633333333", "transporter").await;

    let (_, body) = send_request(
        &app,
        Method::POST,
        "/api/v1/requests",
        Some(json!({
            "client_id": client_id,
            "from_city": "Tanger",
            "to_city": "Agadir",
            "goods_description": "Matériel agricole",
        })),
    )
    .await;
    let request_id = body["id"].as_str().unwrap().to_string();

    // Non-transporteur offers are forbidden.
    let (status, _) = send_request(
        &app,
        Method::POST,
        &format!("/api/v1/requests/{request_id}/offers"),
        Some(json!({ "transporteur_id": client_id, "price_mad": 4000 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send_request(
        &app,
        Method::POST,
        &format!("/api/v1/requests/{request_id}/offers"),
        Some(json!({ "transporteur_id": t1, "price_mad": 4500, "message": "Camion 10T" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let winning_offer = body["id"].as_str().unwrap().to_string();

    let (status, _) = send_request(
        &app,
        Method::POST,
        &format!("/api/v1/requests/{request_id}/offers"),
        Some(json!({ "transporteur_id": t2, "price_mad": 5200 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // Only the request owner may accept.
    let (status, _) = send_request(
        &app,
        Method::POST,
        &format!("/api/v1/offers/{winning_offer}/accept"),
        Some(json!({ "user_id": t2 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send_request(
        &app,
        Method::POST,
        &format!("/api/v1/offers/{winning_offer}/accept"),
        Some(json!({ "user_id": client_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "accepted");

    // Sibling offer was rejected, request moved to assigned.
    let (_, body) = send_request(
        &app,
        Method::GET,
        &format!("/api/v1/requests/{request_id}/offers"),
        None,
    )
    .await;
    let offers = body.as_array().unwrap();
    assert_eq!(offers.len(), 2);
    let statuses: Vec<&str> = offers.iter().map(|o| o["status"].as_str().unwrap()).collect();
    assert!(statuses.contains(&"accepted"));
    assert!(statuses.contains(&"rejected"));

    let (_, body) = send_request(&app, Method::GET, &format!("/api/v1/requests/{request_id}"), None).await;
    assert_eq!(body["status"], "assigned");

    // Accepting twice is an illegal transition.
    let (status, _) = send_request(
        &app,
        Method::POST,
        &format!("/api/v1/offers/{winning_offer}/accept"),
        Some(json!({ "user_id": client_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Both transporteurs were notified of the outcome.
    let (_, body) = send_request(&app, Method::GET, &format!("/api/v1/users/{t1}/notifications"), None).await;
    assert_eq!(body.as_array().unwrap()[0]["kind"], "offer_accepted");
    let (_, body) = send_request(&app, Method::GET, &format!("/api/v1/users/{t2}/notifications"), None).await;
    assert_eq!(body.as_array().unwrap()[0]["kind"], "offer_rejected");
}

#[tokio::test]
async fn offer_withdrawal_is_owner_only_and_pending_only() {
    let app = build_app(None).await;
    let client_id = create_user(&app, "Amina", "+212666666661", "client").await;
    let t1 = create_user(&app, "Youssef", "+212666666662", "transporteur").await;
    let t2 = create_user(&app, "Rachid", "+212666666663", "transporteur").await;

    let (_, body) = send_request(
        &app,
        Method::POST,
        "/api/v1/requests",
        Some(json!({
            "client_id": client_id,
            "from_city": "Meknès",
            "to_city": "Nador",
            "goods_description": "Pièces détachées",
        })),
    )
    .await;
    let request_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send_request(
        &app,
        Method::POST,
        &format!("/api/v1/requests/{request_id}/offers"),
        Some(json!({ "transporteur_id": t1, "price_mad": 3200 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let offer_id = body["id"].as_str().unwrap().to_string();

    // Only the offer's own transporteur may withdraw it.
    let (status, _) = send_request(
        &app,
        Method::POST,
        &format!("/api/v1/offers/{offer_id}/withdraw"),
        Some(json!({ "user_id": t2 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send_request(
        &app,
        Method::POST,
        &format!("/api/v1/offers/{offer_id}/withdraw"),
        Some(json!({ "user_id": t1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "withdrawn");

    // The withdrawal is persisted, not just echoed.
    let (_, body) = send_request(
        &app,
        Method::GET,
        &format!("/api/v1/requests/{request_id}/offers"),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap()[0]["status"], "withdrawn");

    // Withdrawn offers are out of the state machine: neither a second
    // withdrawal nor an acceptance is legal.
    let (status, _) = send_request(
        &app,
        Method::POST,
        &format!("/api/v1/offers/{offer_id}/withdraw"),
        Some(json!({ "user_id": t1 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send_request(
        &app,
        Method::POST,
        &format!("/api/v1/offers/{offer_id}/accept"),
        Some(json!({ "user_id": client_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn ratings_enforce_bounds_and_aggregate() {
    let app = build_app(None).await;
    let client_id = create_user(&app, "Amina", "+212644444441", "client").await;
    let transporteur_id = create_user(&app, "Youssef", "+212644444442", "transporteur").await;

    let (_, body) = send_request(
        &app,
        Method::POST,
        "/api/v1/requests",
        Some(json!({
            "client_id": client_id,
            "from_city": "Fès",
            "to_city": "Oujda",
            "goods_description": "Mobilier",
        })),
    )
    .await;
    let request_id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/ratings",
        Some(json!({
            "request_id": request_id, "rater_id": client_id,
            "rated_id": transporteur_id, "stars": 6,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/ratings",
        Some(json!({
            "request_id": request_id, "rater_id": client_id,
            "rated_id": transporteur_id, "stars": 4, "comment": "Ponctuel",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // One rating per (request, rater).
    let (status, _) = send_request(
        &app,
        Method::POST,
        "/api/v1/ratings",
        Some(json!({
            "request_id": request_id, "rater_id": client_id,
            "rated_id": transporteur_id, "stars": 5,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send_request(
        &app,
        Method::GET,
        &format!("/api/v1/users/{transporteur_id}/ratings"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating_count"], 1);
    assert_eq!(body["average_stars"], 4.0);
}

#[tokio::test]
async fn request_list_filters_by_status() {
    let app = build_app(None).await;
    let client_id = create_user(&app, "Sara", "+212655555551", "client").await;

    for (from, to) in [("Casablanca", "Rabat"), ("Marrakech", "Essaouira")] {
        let (status, _) = send_request(
            &app,
            Method::POST,
            "/api/v1/requests",
            Some(json!({
                "client_id": client_id,
                "from_city": from,
                "to_city": to,
                "goods_description": "Colis divers",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send_request(&app, Method::GET, "/api/v1/requests?status=open", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) =
        send_request(&app, Method::GET, "/api/v1/requests?status=assigned", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = send_request(&app, Method::GET, "/api/v1/requests?status=bogus", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
