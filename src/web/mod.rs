//! Web layer
//!
//! HTTP interface for the CamionBack backend: thin axum handlers that
//! delegate to the service layer and map `AppError` variants onto status
//! codes. Distance resolution is the one deliberate exception to the
//! error mapping — it always answers 200 with a result shape, a failed
//! resolution being data ("distance unknown") rather than an error.

use anyhow::Result;
use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::{
    config::Config, database::Database, distance::DistanceResolver, errors::AppError,
    services::{NotificationService, OfferService, RequestService},
};

pub mod handlers;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub database: Database,
    pub config: Config,
    pub resolver: Arc<DistanceResolver>,
    pub request_service: RequestService,
    pub offer_service: OfferService,
    pub notification_service: NotificationService,
}

impl AppState {
    pub fn new(config: Config, database: Database, resolver: Arc<DistanceResolver>) -> Self {
        let notification_service = NotificationService::new(database.clone());
        let request_service = RequestService::new(
            database.clone(),
            resolver.clone(),
            notification_service.clone(),
        );
        let offer_service = OfferService::new(database.clone(), notification_service.clone());

        Self {
            database,
            config,
            resolver,
            request_service,
            offer_service,
            notification_service,
        }
    }
}

/// Map an application error onto the HTTP status it answers with.
pub(crate) fn error_status(error: &AppError) -> StatusCode {
    match error {
        AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Conflict { .. } => StatusCode::CONFLICT,
        AppError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(state: AppState) -> Result<Self> {
        let addr: SocketAddr =
            format!("{}:{}", state.config.web.host, state.config.web.port).parse()?;
        let app = Self::create_router(state);

        Ok(Self { app, addr })
    }

    /// Build the full router; public so integration tests can drive it
    /// with `tower::ServiceExt::oneshot`.
    pub fn create_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(handlers::health::health_check))
            .nest("/api/v1", Self::api_v1_routes())
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    fn api_v1_routes() -> Router<AppState> {
        Router::new()
            // Distance resolution
            .route("/distance/resolve", post(handlers::distance::resolve_distance))
            // Users
            .route("/users", get(handlers::users::list_users)
                .post(handlers::users::create_user))
            .route("/users/:id", get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user))
            .route("/users/:id/ratings", get(handlers::ratings::get_user_ratings))
            .route("/users/:id/notifications", get(handlers::notifications::list_notifications))
            // Transport requests
            .route("/requests", get(handlers::requests::list_requests)
                .post(handlers::requests::create_request))
            .route("/requests/:id", get(handlers::requests::get_request)
                .put(handlers::requests::update_request)
                .delete(handlers::requests::delete_request))
            .route("/requests/:id/offers", get(handlers::offers::list_offers)
                .post(handlers::offers::create_offer))
            // Offers
            .route("/offers/:id/accept", post(handlers::offers::accept_offer))
            .route("/offers/:id/withdraw", post(handlers::offers::withdraw_offer))
            // Ratings
            .route("/ratings", post(handlers::ratings::create_rating))
            // Notifications
            .route("/notifications/:id/read", post(handlers::notifications::mark_read))
    }

    /// Start the web server
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr).await?;
        axum::serve(listener, self.app).await?;
        Ok(())
    }

    /// Get the host address
    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    /// Get the port number
    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}
