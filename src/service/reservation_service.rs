use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    domain::{
        annotate, generate_slots, Booking, BookingDraft, CreateBookingRequest, PaymentStatus,
        SlotView,
    },
    error::{AppError, Result},
    repository::{BookingRepository, GroundRepository},
    service::pricing,
};

pub struct ReservationService {
    grounds: Arc<dyn GroundRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl ReservationService {
    pub fn new(grounds: Arc<dyn GroundRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { grounds, bookings }
    }

    /// The day's canonical slot list for a ground, each slot marked
    /// available or booked.
    pub async fn list_slots(&self, ground_id: Uuid, date: &str) -> Result<Vec<SlotView>> {
        validate_date(date)?;

        let ground = self
            .grounds
            .find_by_id(ground_id)
            .await?
            .ok_or(AppError::GroundNotFound)?;

        let slots = generate_slots(&ground.open_from, &ground.open_to)?;
        let booked = self.bookings.list_booked_start_times(ground_id, date).await?;

        Ok(annotate(slots, &booked))
    }

    /// Create one booking under a payment group. Validation happens
    /// before any write; the slot-conflict check itself is delegated to
    /// the ledger's atomic insert so racing requests cannot both win.
    pub async fn create_booking(&self, request: CreateBookingRequest) -> Result<Booking> {
        let ground = self
            .grounds
            .find_by_id(request.ground_id)
            .await?
            .ok_or(AppError::GroundNotFound)?;

        if ground.sport(&request.sport_name).is_none() {
            return Err(AppError::SportNotFound(request.sport_name.clone()));
        }

        validate_date(&request.date)?;

        if request.time_slots.is_empty() {
            return Err(AppError::EmptySelection);
        }

        // Normalize the selection: ordered, no duplicates, so a
        // repeated start time cannot be charged twice.
        let mut time_slots = request.time_slots.clone();
        time_slots.sort();
        time_slots.dedup();

        let valid_slots = generate_slots(&ground.open_from, &ground.open_to)?;
        for start in &time_slots {
            if !valid_slots.contains(start) {
                return Err(AppError::InvalidSlot(start.clone()));
            }
        }

        match (&request.user_id, &request.guest) {
            (None, None) => {
                return Err(AppError::Validation(
                    "Either a user identity or guest details are required".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(AppError::Validation(
                    "A booking cannot carry both a user identity and guest details".to_string(),
                ))
            }
            _ => {}
        }

        // Early conflict check for a friendly error. The ledger's
        // unique index remains the authority: a race that slips past
        // this read still fails the insert.
        let conflicts = self
            .bookings
            .find_conflicts(request.ground_id, &request.date, &time_slots)
            .await?;
        if !conflicts.is_empty() {
            return Err(AppError::SlotConflict(conflicts.join(", ")));
        }

        // The only trusted amount. Anything the caller computed is
        // ignored.
        let total_amount_cents = pricing::quote(&ground, &request.sport_name, time_slots.len())?;

        let draft = BookingDraft {
            ground_id: request.ground_id,
            sport_name: request.sport_name,
            user_id: request.user_id,
            guest: request.guest,
            date: request.date,
            time_slots,
            total_amount_cents,
            payment_status: request
                .intended_payment_status
                .unwrap_or(PaymentStatus::AdvancedPaid),
            payment_group_id: request.payment_group_id.unwrap_or_else(Uuid::new_v4),
        };

        self.bookings.create(draft).await
    }
}

fn validate_date(date: &str) -> Result<()> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| AppError::Validation(format!("Invalid date: {}", date)))
}
