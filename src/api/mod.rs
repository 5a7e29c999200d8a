pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::Settings, payments::PayHereGateway, service::ServiceContext};
use state::AppState;

pub fn create_app(
    service_context: Arc<ServiceContext>,
    gateway: Option<Arc<PayHereGateway>>,
    settings: Arc<Settings>,
) -> Router {
    let app_state = AppState::new(service_context, gateway, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        // API routes
        .nest("/api", api_routes(app_state.clone()))
        // Add state to the router
        .with_state(app_state)
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/grounds", ground_routes())
        .nest("/bookings", booking_routes(state))
        .nest("/payments", payment_routes())
}

fn ground_routes() -> Router<AppState> {
    Router::new().route("/:id/slots", get(handlers::grounds::list_slots))
}

fn booking_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Creation is public so guests can book; a bearer token, when
        // present, supplies the user identity channel instead.
        .merge(
            Router::new()
                .route("/", post(handlers::bookings::create))
                .route_layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    middleware::auth::optional_auth,
                )),
        )
        // Reads and cancellation require a verified caller.
        .merge(
            Router::new()
                .route("/:id", get(handlers::bookings::get))
                .route("/group/:group_id", get(handlers::bookings::get_group))
                .route(
                    "/group/:group_id/cancellation",
                    get(handlers::cancellations::check),
                )
                .route(
                    "/group/:group_id/cancel",
                    post(handlers::cancellations::cancel),
                )
                .route_layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    middleware::auth::require_auth,
                )),
        )
        // Operator override
        .merge(
            Router::new()
                .route("/:id/status", patch(handlers::bookings::update_status))
                .route_layer(axum::middleware::from_fn_with_state(
                    state,
                    middleware::auth::require_admin,
                )),
        )
}

fn payment_routes() -> Router<AppState> {
    Router::new()
        // Public webhook endpoint (no auth; signature-verified)
        .route("/notify", post(handlers::payments::payhere_notify))
}
