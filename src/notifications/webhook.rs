use async_trait::async_trait;
use serde_json::json;

use crate::{
    config::NotificationConfig,
    domain::Booking,
    error::{AppError, Result},
    notifications::{BookingNotification, NotificationChannel},
};

/// Posts booking events as JSON to a configured endpoint, typically a
/// messaging bridge that turns them into SMS/email for the customer and
/// ground owner.
pub struct WebhookChannel {
    url: String,
    client: reqwest::Client,
    enabled: bool,
}

impl WebhookChannel {
    pub fn new(config: Option<NotificationConfig>) -> Option<Self> {
        config.and_then(|cfg| {
            cfg.webhook_url.filter(|_| cfg.enabled).map(|url| Self {
                url,
                client: reqwest::Client::new(),
                enabled: true,
            })
        })
    }

    fn booking_summary(booking: &Booking) -> serde_json::Value {
        json!({
            "booking_id": booking.id,
            "ground_id": booking.ground_id,
            "sport": booking.sport_name,
            "date": booking.date,
            "time_slots": booking.time_slots,
            "status": booking.status,
            "payment_status": booking.payment_status,
            "payment_group_id": booking.payment_group_id,
        })
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    fn name(&self) -> &str {
        "webhook"
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(AppError::External(
                "Notification webhook URL not configured".to_string(),
            ));
        }
        Ok(())
    }

    async fn notify(&self, notification: &BookingNotification) -> Result<()> {
        let bookings = match notification {
            BookingNotification::BookingReserved(booking) => vec![Self::booking_summary(booking)],
            BookingNotification::GroupConfirmed(bookings)
            | BookingNotification::GroupCancelled(bookings) => {
                bookings.iter().map(Self::booking_summary).collect()
            }
        };

        let payload = json!({
            "event": notification.name(),
            "bookings": bookings,
        });

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::External(format!("Notification webhook error: {}", e)))?
            .error_for_status()
            .map_err(|e| AppError::External(format!("Notification webhook error: {}", e)))?;

        Ok(())
    }
}
