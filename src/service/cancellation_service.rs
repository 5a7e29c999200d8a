use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::{Booking, BookingStatus},
    error::{AppError, Result},
    repository::BookingRepository,
};

/// Hours of notice required before the earliest booked slot of a
/// payment group.
pub const CANCELLATION_NOTICE_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize)]
pub struct CancellationEligibility {
    pub bookings: Vec<Booking>,
    pub earliest_start: NaiveDateTime,
    pub is_eligible: bool,
    pub reason: Option<String>,
}

pub struct CancellationService {
    bookings: Arc<dyn BookingRepository>,
}

impl CancellationService {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn check_eligibility(&self, group_id: Uuid) -> Result<CancellationEligibility> {
        let bookings = self.bookings.find_by_payment_group(group_id).await?;
        if bookings.is_empty() {
            return Err(AppError::NotFound("Booking group not found".to_string()));
        }

        eligibility_at(bookings, Utc::now().naive_utc())
    }

    /// Cancel the whole group. Eligibility is re-verified here rather
    /// than trusted from an earlier check: time has passed since the
    /// caller asked.
    pub async fn cancel(&self, group_id: Uuid) -> Result<Vec<Booking>> {
        let bookings = self.bookings.find_by_payment_group(group_id).await?;
        if bookings.is_empty() {
            return Err(AppError::NotFound("Booking group not found".to_string()));
        }

        // The group is cancelled or left intact together, so one
        // cancelled booking means the whole group already went through
        // this path. Retrying is a success, not an error.
        if bookings.iter().any(|b| b.status == BookingStatus::Cancelled) {
            return Ok(bookings);
        }

        let eligibility = eligibility_at(bookings, Utc::now().naive_utc())?;
        if !eligibility.is_eligible {
            return Err(AppError::CancellationWindowPassed(
                eligibility
                    .reason
                    .unwrap_or_else(|| "Cancellation window has passed".to_string()),
            ));
        }

        self.bookings.cancel_group(group_id).await
    }
}

/// Eligibility is governed by the earliest slot start across the whole
/// group: the group represents one purchase, so the clock runs against
/// its first upcoming commitment, not each slot individually.
fn eligibility_at(bookings: Vec<Booking>, now: NaiveDateTime) -> Result<CancellationEligibility> {
    let mut earliest: Option<NaiveDateTime> = None;
    for booking in &bookings {
        for start_time in &booking.time_slots {
            let start = slot_start(&booking.date, start_time)?;
            if earliest.map_or(true, |e| start < e) {
                earliest = Some(start);
            }
        }
    }

    let earliest_start = earliest
        .ok_or_else(|| AppError::Internal("Booking group has no time slots".to_string()))?;

    let is_eligible = earliest_start - now >= Duration::hours(CANCELLATION_NOTICE_HOURS);
    let reason = if is_eligible {
        None
    } else {
        Some(format!(
            "Bookings can only be cancelled at least {} hours before the first slot (starts {})",
            CANCELLATION_NOTICE_HOURS, earliest_start
        ))
    };

    Ok(CancellationEligibility {
        bookings,
        earliest_start,
        is_eligible,
        reason,
    })
}

fn slot_start(date: &str, start_time: &str) -> Result<NaiveDateTime> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::Internal(format!("Invalid booking date: {}", date)))?;
    let time = NaiveTime::parse_from_str(start_time, "%H:%M")
        .map_err(|_| AppError::Internal(format!("Invalid slot start: {}", start_time)))?;
    Ok(date.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PaymentStatus;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    fn booking(date: &str, slots: &[&str]) -> Booking {
        let now: DateTime<Utc> = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            ground_id: Uuid::new_v4(),
            sport_name: "Futsal".to_string(),
            user_id: Some(Uuid::new_v4()),
            guest: None,
            date: date.to_string(),
            time_slots: slots.iter().map(|s| s.to_string()).collect(),
            total_amount_cents: 50_000,
            payment_status: PaymentStatus::AdvancedPaid,
            status: BookingStatus::Reserved,
            payment_group_id: Uuid::new_v4(),
            gateway_payment_id: None,
            paid_amount_cents: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn eligible_with_more_than_a_day_of_notice() {
        let result =
            eligibility_at(vec![booking("2026-03-10", &["09:00", "09:30"])], dt("2026-03-09 08:00"))
                .unwrap();
        assert!(result.is_eligible);
        assert!(result.reason.is_none());
        assert_eq!(result.earliest_start, dt("2026-03-10 09:00"));
    }

    #[test]
    fn ineligible_inside_the_notice_window() {
        // 23 hours of notice.
        let result =
            eligibility_at(vec![booking("2026-03-10", &["09:00"])], dt("2026-03-09 10:00"))
                .unwrap();
        assert!(!result.is_eligible);
        assert!(result.reason.is_some());
    }

    #[test]
    fn exactly_24_hours_is_still_eligible() {
        let result =
            eligibility_at(vec![booking("2026-03-10", &["09:00"])], dt("2026-03-09 09:00"))
                .unwrap();
        assert!(result.is_eligible);
    }

    #[test]
    fn earliest_slot_across_the_group_governs() {
        // The late booking alone would be cancellable, but the group's
        // first commitment is tomorrow morning.
        let group = vec![
            booking("2026-03-20", &["18:00"]),
            booking("2026-03-10", &["07:30", "08:00"]),
        ];
        let result = eligibility_at(group, dt("2026-03-09 12:00")).unwrap();
        assert_eq!(result.earliest_start, dt("2026-03-10 07:30"));
        assert!(!result.is_eligible);
    }
}
