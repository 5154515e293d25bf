use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Create the main application router with all routes and middleware
#[tracing::instrument(skip(state))]
pub fn create_router(state: AppState) -> Router {
    // Climate dataset routes; static segments win over `:start`
    let api_routes = Router::new()
        .route("/", get(handlers::index::index))
        .route(
            "/api/v1.0/precipitation",
            get(handlers::climate::precipitation),
        )
        .route("/api/v1.0/stations", get(handlers::climate::stations))
        .route("/api/v1.0/tobs", get(handlers::climate::tobs))
        .route(
            "/api/v1.0/:start",
            get(handlers::climate::temperature_from),
        )
        .route(
            "/api/v1.0/:start/:end",
            get(handlers::climate::temperature_between),
        )
        .route_layer(axum::middleware::from_fn(track_requests));

    // Operational endpoints
    let ops_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::metrics_handler));

    Router::new()
        .merge(api_routes)
        .merge(ops_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Count every matched API request by route template and status code
async fn track_requests(request: Request, next: Next) -> Response {
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| request.uri().path().to_owned());

    let response = next.run(request).await;
    common::telemetry::record_request(&route, response.status().as_u16());
    response
}
