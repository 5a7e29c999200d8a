use axum::{extract::State, http::StatusCode, Form};

use crate::{
    api::state::AppState,
    error::{AppError, Result},
    notifications::BookingNotification,
    payments::PaymentNotification,
};

/// Gateway server-to-server callback. Authenticated solely by its
/// signature; the response is acknowledgement-only since nobody is
/// waiting interactively on the other end.
pub async fn payhere_notify(
    State(state): State<AppState>,
    Form(notification): Form<PaymentNotification>,
) -> Result<StatusCode> {
    let gateway = state.gateway.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("Payment processing is not configured".to_string())
    })?;

    let confirmed = gateway.handle_notification(notification).await?;

    if !confirmed.is_empty() {
        state
            .service_context
            .notifications
            .dispatch(BookingNotification::GroupConfirmed(confirmed))
            .await;
    }

    Ok(StatusCode::OK)
}
