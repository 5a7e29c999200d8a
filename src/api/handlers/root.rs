use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Turfbook API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Slot reservation and payment reconciliation for sports grounds",
        "status": "operational",
        "endpoints": {
            "health": "/health",
            "slots": "/api/grounds/:id/slots",
            "bookings": "/api/bookings",
            "payments": "/api/payments/notify"
        }
    }))
}

pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}
