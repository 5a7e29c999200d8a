use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::Booking;
use crate::error::Result;

pub mod webhook;

/// Booking lifecycle events fanned out to notification channels.
/// Dispatch is fire-and-forget: a channel failure is logged and never
/// blocks or rolls back the booking write that produced the event.
#[derive(Debug, Clone)]
pub enum BookingNotification {
    BookingReserved(Booking),
    GroupConfirmed(Vec<Booking>),
    GroupCancelled(Vec<Booking>),
}

impl BookingNotification {
    pub fn name(&self) -> &'static str {
        match self {
            BookingNotification::BookingReserved(_) => "booking_reserved",
            BookingNotification::GroupConfirmed(_) => "group_confirmed",
            BookingNotification::GroupCancelled(_) => "group_cancelled",
        }
    }
}

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    fn name(&self) -> &str;
    fn is_enabled(&self) -> bool;
    async fn health_check(&self) -> Result<()>;
    async fn notify(&self, notification: &BookingNotification) -> Result<()>;
}

pub struct NotificationManager {
    channels: RwLock<Vec<Arc<dyn NotificationChannel>>>,
}

impl NotificationManager {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(Vec::new()),
        }
    }

    pub async fn register(&self, channel: Arc<dyn NotificationChannel>) {
        if channel.is_enabled() {
            let mut channels = self.channels.write().await;
            channels.push(channel);
            tracing::info!(
                "Registered notification channel: {}",
                channels.last().unwrap().name()
            );
        }
    }

    pub async fn dispatch(&self, notification: BookingNotification) {
        let channels = self.channels.read().await;

        for channel in channels.iter() {
            if !channel.is_enabled() {
                continue;
            }

            match channel.notify(&notification).await {
                Ok(_) => {
                    tracing::debug!(
                        "Notification channel {} delivered {}",
                        channel.name(),
                        notification.name()
                    );
                }
                Err(e) => {
                    tracing::error!(
                        "Notification channel {} failed to deliver {}: {:?}",
                        channel.name(),
                        notification.name(),
                        e
                    );
                    // Keep going; delivery is best-effort.
                }
            }
        }
    }

    pub async fn health_check_all(&self) -> Vec<(String, Result<()>)> {
        let channels = self.channels.read().await;
        let mut results = Vec::new();

        for channel in channels.iter() {
            let name = channel.name().to_string();
            let result = channel.health_check().await;
            results.push((name, result));
        }

        results
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}
