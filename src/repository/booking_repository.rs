use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Booking, BookingDraft, BookingStatus, GuestDetails, PaymentStatus, StatusChange},
    error::{AppError, Result},
    repository::BookingRepository,
};

#[derive(FromRow)]
struct BookingRow {
    id: String,
    ground_id: String,
    sport_name: String,
    user_id: Option<String>,
    guest_name: Option<String>,
    guest_phone: Option<String>,
    guest_email: Option<String>,
    guest_national_id: Option<String>,
    date: String,
    total_amount_cents: i64,
    payment_status: String,
    status: String,
    payment_group_id: String,
    gateway_payment_id: Option<String>,
    paid_amount_cents: Option<i64>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const BOOKING_COLUMNS: &str = r#"
    id, ground_id, sport_name, user_id,
    guest_name, guest_phone, guest_email, guest_national_id,
    date, total_amount_cents, payment_status, status,
    payment_group_id, gateway_payment_id, paid_amount_cents,
    created_at, updated_at
"#;

pub struct SqliteBookingRepository {
    pool: SqlitePool,
}

impl SqliteBookingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_booking(row: BookingRow, time_slots: Vec<String>) -> Result<Booking> {
        let parse_uuid =
            |s: &str| Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()));

        let guest = match (row.guest_name, row.guest_phone) {
            (Some(name), Some(phone)) => Some(GuestDetails {
                name,
                phone,
                email: row.guest_email,
                national_id: row.guest_national_id,
            }),
            _ => None,
        };

        Ok(Booking {
            id: parse_uuid(&row.id)?,
            ground_id: parse_uuid(&row.ground_id)?,
            sport_name: row.sport_name,
            user_id: row.user_id.as_deref().map(parse_uuid).transpose()?,
            guest,
            date: row.date,
            time_slots,
            total_amount_cents: row.total_amount_cents,
            payment_status: PaymentStatus::parse(&row.payment_status).ok_or_else(|| {
                AppError::Database(format!("Invalid payment status: {}", row.payment_status))
            })?,
            status: BookingStatus::parse(&row.status)
                .ok_or_else(|| AppError::Database(format!("Invalid status: {}", row.status)))?,
            payment_group_id: parse_uuid(&row.payment_group_id)?,
            gateway_payment_id: row.gateway_payment_id,
            paid_amount_cents: row.paid_amount_cents,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    async fn load_slots(&self, booking_id: &str) -> Result<Vec<String>> {
        let slots = sqlx::query_scalar::<_, String>(
            r#"
            SELECT start_time
            FROM booking_slots
            WHERE booking_id = ?
            ORDER BY start_time
            "#,
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(slots)
    }

    async fn fetch_booking(&self, row: BookingRow) -> Result<Booking> {
        let slots = self.load_slots(&row.id).await?;
        Self::row_to_booking(row, slots)
    }

    /// Target states for an edit, validated against the current row.
    fn resolve_change(booking: &Booking, change: &StatusChange) -> Result<(BookingStatus, PaymentStatus)> {
        let next_status = change.status.unwrap_or(booking.status);
        let next_payment = change.payment_status.unwrap_or(booking.payment_status);

        if !booking.status.can_transition_to(next_status) {
            return Err(AppError::InvalidTransition(format!(
                "Cannot move booking {} from {} to {}",
                booking.id,
                booking.status.as_str(),
                next_status.as_str()
            )));
        }
        if !booking.payment_status.can_advance_to(next_payment) {
            return Err(AppError::InvalidTransition(format!(
                "Cannot move booking {} payment from {} to {}",
                booking.id,
                booking.payment_status.as_str(),
                next_payment.as_str()
            )));
        }

        Ok((next_status, next_payment))
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepository {
    async fn find_conflicts(
        &self,
        ground_id: Uuid,
        date: &str,
        candidate_starts: &[String],
    ) -> Result<Vec<String>> {
        let booked = self.list_booked_start_times(ground_id, date).await?;
        Ok(candidate_starts
            .iter()
            .filter(|s| booked.contains(*s))
            .cloned()
            .collect())
    }

    async fn create(&self, draft: BookingDraft) -> Result<Booking> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let ground_id_str = draft.ground_id.to_string();
        let now = Utc::now().naive_utc();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query(&format!(
            r#"
            INSERT INTO bookings ({})
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            BOOKING_COLUMNS
        ))
        .bind(&id_str)
        .bind(&ground_id_str)
        .bind(&draft.sport_name)
        .bind(draft.user_id.map(|u| u.to_string()))
        .bind(draft.guest.as_ref().map(|g| g.name.clone()))
        .bind(draft.guest.as_ref().map(|g| g.phone.clone()))
        .bind(draft.guest.as_ref().and_then(|g| g.email.clone()))
        .bind(draft.guest.as_ref().and_then(|g| g.national_id.clone()))
        .bind(&draft.date)
        .bind(draft.total_amount_cents)
        .bind(draft.payment_status.as_str())
        .bind(BookingStatus::Reserved.as_str())
        .bind(draft.payment_group_id.to_string())
        .bind(Option::<String>::None)
        .bind(Option::<i64>::None)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        // Claiming the slots inside the same transaction is what makes
        // conflict detection and insertion indivisible: a concurrent
        // create racing for the same slot hits the partial unique index
        // and exactly one of the two commits.
        for start_time in &draft.time_slots {
            sqlx::query(
                r#"
                INSERT INTO booking_slots (booking_id, ground_id, date, start_time, active)
                VALUES (?, ?, ?, ?, 1)
                "#,
            )
            .bind(&id_str)
            .bind(&ground_id_str)
            .bind(&draft.date)
            .bind(start_time)
            .execute(&mut *tx)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.message().contains("UNIQUE") => {
                    AppError::SlotConflict(start_time.clone())
                }
                _ => AppError::Database(e.to_string()),
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve created booking".to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE id = ?",
            BOOKING_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(self.fetch_booking(r).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_payment_group(&self, group_id: Uuid) -> Result<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {} FROM bookings WHERE payment_group_id = ? ORDER BY date, created_at",
            BOOKING_COLUMNS
        ))
        .bind(group_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        let mut bookings = Vec::with_capacity(rows.len());
        for row in rows {
            bookings.push(self.fetch_booking(row).await?);
        }
        Ok(bookings)
    }

    async fn list_booked_start_times(
        &self,
        ground_id: Uuid,
        date: &str,
    ) -> Result<HashSet<String>> {
        let starts = sqlx::query_scalar::<_, String>(
            r#"
            SELECT start_time
            FROM booking_slots
            WHERE ground_id = ? AND date = ? AND active = 1
            "#,
        )
        .bind(ground_id.to_string())
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(starts.into_iter().collect())
    }

    async fn update_status(&self, id: Uuid, change: StatusChange) -> Result<Booking> {
        let booking = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

        let (next_status, next_payment) = Self::resolve_change(&booking, &change)?;
        let id_str = id.to_string();
        let now = Utc::now().naive_utc();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            UPDATE bookings
            SET status = ?, payment_status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(next_status.as_str())
        .bind(next_payment.as_str())
        .bind(now)
        .bind(&id_str)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        // A cancellation, however it is reached, must free the slots.
        if next_status == BookingStatus::Cancelled {
            sqlx::query("UPDATE booking_slots SET active = 0 WHERE booking_id = ?")
                .bind(&id_str)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database("Failed to retrieve updated booking".to_string()))
    }

    async fn update_group_status(
        &self,
        group_id: Uuid,
        change: StatusChange,
    ) -> Result<Vec<Booking>> {
        let bookings = self.find_by_payment_group(group_id).await?;
        if bookings.is_empty() {
            return Err(AppError::NotFound("Booking group not found".to_string()));
        }

        // Validate every transition before touching any row so the
        // group moves all-or-nothing.
        for booking in &bookings {
            Self::resolve_change(booking, &change)?;
        }

        let group_str = group_id.to_string();
        let now = Utc::now().naive_utc();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        sqlx::query(
            r#"
            UPDATE bookings
            SET status = COALESCE(?, status),
                payment_status = COALESCE(?, payment_status),
                updated_at = ?
            WHERE payment_group_id = ?
            "#,
        )
        .bind(change.status.map(|s| s.as_str()))
        .bind(change.payment_status.map(|s| s.as_str()))
        .bind(now)
        .bind(&group_str)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        if change.status == Some(BookingStatus::Cancelled) {
            sqlx::query(
                r#"
                UPDATE booking_slots
                SET active = 0
                WHERE booking_id IN (SELECT id FROM bookings WHERE payment_group_id = ?)
                "#,
            )
            .bind(&group_str)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_payment_group(group_id).await
    }

    async fn record_gateway_payment(
        &self,
        group_id: Uuid,
        payment_id: Option<&str>,
        paid_amount_cents: Option<i64>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE bookings
            SET gateway_payment_id = ?, paid_amount_cents = ?, updated_at = ?
            WHERE payment_group_id = ?
            "#,
        )
        .bind(payment_id)
        .bind(paid_amount_cents)
        .bind(Utc::now().naive_utc())
        .bind(group_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    async fn cancel_group(&self, group_id: Uuid) -> Result<Vec<Booking>> {
        self.update_group_status(
            group_id,
            StatusChange {
                status: Some(BookingStatus::Cancelled),
                payment_status: None,
            },
        )
        .await
    }
}
