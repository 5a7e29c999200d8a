use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    api::{handlers::bookings::BookingDto, middleware::auth::CurrentUser, state::AppState},
    error::Result,
    notifications::BookingNotification,
};

#[derive(Debug, Serialize)]
pub struct CancellationCheckResponse {
    pub payment_group_id: Uuid,
    pub earliest_start: String,
    pub is_eligible: bool,
    pub reason: Option<String>,
    pub bookings: Vec<BookingDto>,
}

/// Read-only eligibility preview. The cancel endpoint re-checks on its
/// own; this response is advisory by the time the user acts on it.
pub async fn check(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<CancellationCheckResponse>> {
    let eligibility = state
        .service_context
        .cancellation_service
        .check_eligibility(group_id)
        .await?;

    Ok(Json(CancellationCheckResponse {
        payment_group_id: group_id,
        earliest_start: eligibility.earliest_start.format("%Y-%m-%d %H:%M").to_string(),
        is_eligible: eligibility.is_eligible,
        reason: eligibility.reason,
        bookings: eligibility.bookings.into_iter().map(Into::into).collect(),
    }))
}

pub async fn cancel(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<BookingDto>>> {
    let bookings = state
        .service_context
        .cancellation_service
        .cancel(group_id)
        .await?;

    state
        .service_context
        .notifications
        .dispatch(BookingNotification::GroupCancelled(bookings.clone()))
        .await;

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}
