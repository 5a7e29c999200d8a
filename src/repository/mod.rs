use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;

pub mod booking_repository;
pub mod ground_repository;

pub use booking_repository::SqliteBookingRepository;
pub use ground_repository::SqliteGroundRepository;

/// Read-only view of the ground directory. Ground management owns the
/// writes; `create` exists for seeding and tests.
#[async_trait]
pub trait GroundRepository: Send + Sync {
    async fn create(&self, ground: Ground) -> Result<Ground>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Ground>>;
    async fn list(&self) -> Result<Vec<Ground>>;
}

/// Owns every read and write of bookings. All components funnel writes
/// through here so the slot-uniqueness invariant has a single
/// enforcement point.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Which of the candidate start times are already claimed by a
    /// non-cancelled booking on this ground and date. Advisory only:
    /// `create` re-checks atomically via the slot unique index.
    async fn find_conflicts(
        &self,
        ground_id: Uuid,
        date: &str,
        candidate_starts: &[String],
    ) -> Result<Vec<String>>;

    /// Insert the booking and claim its slots in one transaction.
    /// Fails with `SlotConflict` when any slot is already held, even if
    /// an earlier conflict check passed.
    async fn create(&self, draft: BookingDraft) -> Result<Booking>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>>;
    async fn find_by_payment_group(&self, group_id: Uuid) -> Result<Vec<Booking>>;
    async fn list_booked_start_times(&self, ground_id: Uuid, date: &str)
        -> Result<HashSet<String>>;

    /// Apply a status/payment-status edit after validating it against
    /// the booking state machine.
    async fn update_status(&self, id: Uuid, change: StatusChange) -> Result<Booking>;
    async fn update_group_status(
        &self,
        group_id: Uuid,
        change: StatusChange,
    ) -> Result<Vec<Booking>>;

    /// Record gateway correlation fields for a payment group. Audit
    /// data only; never authoritative pricing.
    async fn record_gateway_payment(
        &self,
        group_id: Uuid,
        payment_id: Option<&str>,
        paid_amount_cents: Option<i64>,
    ) -> Result<()>;

    /// Cancel every booking in a group and free its slots, atomically.
    async fn cancel_group(&self, group_id: Uuid) -> Result<Vec<Booking>>;
}
