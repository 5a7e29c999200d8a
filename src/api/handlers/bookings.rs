use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{
        Booking, BookingStatus, CreateBookingRequest, GuestDetails, PaymentStatus, StatusChange,
    },
    error::{AppError, Result},
    notifications::BookingNotification,
};

#[derive(Debug, Serialize)]
pub struct BookingDto {
    pub id: Uuid,
    pub ground_id: Uuid,
    pub sport_name: String,
    pub date: String,
    pub time_slots: Vec<String>,
    pub total_amount_cents: i64,
    pub payment_status: PaymentStatus,
    pub status: BookingStatus,
    pub payment_group_id: Uuid,
    pub created_at: String,
}

impl From<Booking> for BookingDto {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            ground_id: booking.ground_id,
            sport_name: booking.sport_name,
            date: booking.date,
            time_slots: booking.time_slots,
            total_amount_cents: booking.total_amount_cents,
            payment_status: booking.payment_status,
            status: booking.status,
            payment_group_id: booking.payment_group_id,
            created_at: booking.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct GuestDto {
    #[validate(length(min = 1, message = "Guest name is required"))]
    pub name: String,
    #[validate(length(min = 7, message = "A contact phone number is required"))]
    pub phone: String,
    #[validate(email)]
    pub email: Option<String>,
    pub national_id: Option<String>,
}

impl From<GuestDto> for GuestDetails {
    fn from(dto: GuestDto) -> Self {
        Self {
            name: dto.name,
            phone: dto.phone,
            email: dto.email,
            national_id: dto.national_id,
        }
    }
}

/// Unknown fields, including any client-computed total, are dropped at
/// deserialization and never reach the domain.
#[derive(Debug, Deserialize)]
pub struct CreateBookingDto {
    pub ground_id: Uuid,
    pub sport_name: String,
    pub date: String,
    pub time_slots: Vec<String>,
    #[serde(default)]
    pub guest: Option<GuestDto>,
    /// "advance" (default) or "full".
    #[serde(default)]
    pub payment: Option<String>,
    #[serde(default)]
    pub payment_group_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BookingCreatedResponse {
    pub booking_id: Uuid,
    pub payment_group_id: Uuid,
    pub total_amount_cents: i64,
    pub currency: String,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    /// Present when the payment gateway is configured; clients post
    /// these fields as-is to start checkout.
    pub checkout: Option<crate::payments::CheckoutFields>,
}

pub async fn create(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    Json(dto): Json<CreateBookingDto>,
) -> Result<(StatusCode, Json<BookingCreatedResponse>)> {
    if let Some(ref guest) = dto.guest {
        guest
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
    }

    let intended_payment_status = match dto.payment.as_deref() {
        None | Some("advance") => Some(PaymentStatus::AdvancedPaid),
        Some("full") => Some(PaymentStatus::FullPaid),
        Some(other) => {
            return Err(AppError::BadRequest(format!(
                "Unknown payment option: {}",
                other
            )))
        }
    };

    let request = CreateBookingRequest {
        ground_id: dto.ground_id,
        sport_name: dto.sport_name,
        date: dto.date,
        time_slots: dto.time_slots,
        user_id: user.as_ref().map(|u| u.0.id),
        guest: dto.guest.map(Into::into),
        intended_payment_status,
        payment_group_id: dto.payment_group_id,
    };

    let booking = state
        .service_context
        .reservation_service
        .create_booking(request)
        .await?;

    // Best-effort; a notification failure never unwinds the booking.
    state
        .service_context
        .notifications
        .dispatch(BookingNotification::BookingReserved(booking.clone()))
        .await;

    let checkout = state.gateway.as_ref().map(|gateway| {
        gateway.checkout_fields(
            booking.payment_group_id,
            booking.total_amount_cents,
            &format!("{} on {}", booking.sport_name, booking.date),
        )
    });

    let response = BookingCreatedResponse {
        booking_id: booking.id,
        payment_group_id: booking.payment_group_id,
        total_amount_cents: booking.total_amount_cents,
        currency: state.settings.payhere.currency.clone(),
        status: booking.status,
        payment_status: booking.payment_status,
        checkout,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingDto>> {
    let booking = state
        .service_context
        .booking_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    Ok(Json(booking.into()))
}

pub async fn get_group(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(group_id): Path<Uuid>,
) -> Result<Json<Vec<BookingDto>>> {
    let bookings = state
        .service_context
        .booking_repo
        .find_by_payment_group(group_id)
        .await?;

    if bookings.is_empty() {
        return Err(AppError::NotFound("Booking group not found".to_string()));
    }

    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusDto {
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

/// Operator override: edits state directly, skipping the cancellation
/// time-window policy, but still subject to the ledger's transition
/// validation.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateBookingStatusDto>,
) -> Result<Json<BookingDto>> {
    let status = dto
        .status
        .as_deref()
        .map(|s| {
            BookingStatus::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown status: {}", s)))
        })
        .transpose()?;
    let payment_status = dto
        .payment_status
        .as_deref()
        .map(|s| {
            PaymentStatus::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("Unknown payment status: {}", s)))
        })
        .transpose()?;

    if status.is_none() && payment_status.is_none() {
        return Err(AppError::BadRequest("Nothing to update".to_string()));
    }

    let booking = state
        .service_context
        .booking_repo
        .update_status(
            id,
            StatusChange {
                status,
                payment_status,
            },
        )
        .await?;

    Ok(Json(booking.into()))
}
