use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reservation of one or more half-hour slots on a single ground and
/// date. Several bookings created as one purchase share a
/// payment_group_id; payment reconciliation and cancellation operate on
/// the whole group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub ground_id: Uuid,
    pub sport_name: String,
    pub user_id: Option<Uuid>,
    pub guest: Option<GuestDetails>,
    pub date: String,
    pub time_slots: Vec<String>,
    pub total_amount_cents: i64,
    pub payment_status: PaymentStatus,
    pub status: BookingStatus,
    pub payment_group_id: Uuid,
    pub gateway_payment_id: Option<String>,
    pub paid_amount_cents: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Exactly one identity channel must be present.
    pub fn has_valid_identity(&self) -> bool {
        self.user_id.is_some() != self.guest.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuestDetails {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub national_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Reserved,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Reserved => "reserved",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reserved" => Some(BookingStatus::Reserved),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Reserved → Confirmed → terminal; any non-terminal state →
    /// Cancelled. Re-applying the current state is a permitted no-op so
    /// redelivered gateway callbacks and retried cancellations succeed.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Reserved, Reserved)
                | (Reserved, Confirmed)
                | (Reserved, Cancelled)
                | (Confirmed, Confirmed)
                | (Confirmed, Cancelled)
                | (Cancelled, Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    AdvancedPaid,
    FullPaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::AdvancedPaid => "advanced_paid",
            PaymentStatus::FullPaid => "full_paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "advanced_paid" => Some(PaymentStatus::AdvancedPaid),
            "full_paid" => Some(PaymentStatus::FullPaid),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            PaymentStatus::Pending => 0,
            PaymentStatus::AdvancedPaid => 1,
            PaymentStatus::FullPaid => 2,
        }
    }

    /// Payment status only ever advances; re-applying the current tier
    /// is a no-op.
    pub fn can_advance_to(&self, next: PaymentStatus) -> bool {
        next.rank() >= self.rank()
    }
}

/// Everything the ledger needs to persist a new booking. Amounts here
/// are already server-computed; drafts never carry client-sent totals.
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub ground_id: Uuid,
    pub sport_name: String,
    pub user_id: Option<Uuid>,
    pub guest: Option<GuestDetails>,
    pub date: String,
    pub time_slots: Vec<String>,
    pub total_amount_cents: i64,
    pub payment_status: PaymentStatus,
    pub payment_group_id: Uuid,
}

/// Partial status edit validated against the state machine by the
/// ledger before it is applied.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct StatusChange {
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Clone)]
pub struct CreateBookingRequest {
    pub ground_id: Uuid,
    pub sport_name: String,
    pub date: String,
    pub time_slots: Vec<String>,
    pub user_id: Option<Uuid>,
    pub guest: Option<GuestDetails>,
    pub intended_payment_status: Option<PaymentStatus>,
    pub payment_group_id: Option<Uuid>,
}
