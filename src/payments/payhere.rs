use std::sync::Arc;

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{
    domain::{Booking, BookingStatus, PaymentStatus, StatusChange},
    error::{AppError, Result},
    repository::BookingRepository,
};

/// Inbound server-to-server notification from the gateway. Form
/// encoded; `order_id` carries the payment-group id and `custom_2` the
/// payment tier the payer chose at checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentNotification {
    pub merchant_id: String,
    pub order_id: String,
    #[serde(default)]
    pub payment_id: Option<String>,
    pub payhere_amount: String,
    pub payhere_currency: String,
    pub status_code: String,
    pub md5sig: String,
    #[serde(default)]
    pub custom_1: Option<String>,
    #[serde(default)]
    pub custom_2: Option<String>,
}

/// Field set a client posts to the gateway's checkout page. The hash
/// binds merchant, order and amount so the client cannot alter the
/// server-computed price on the way through.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutFields {
    pub merchant_id: String,
    pub order_id: String,
    pub items: String,
    pub amount: String,
    pub currency: String,
    pub hash: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NotificationOutcome {
    Success,
    Pending,
    Canceled,
    Failed,
    Chargedback,
    Unknown,
}

fn outcome_of(status_code: &str) -> NotificationOutcome {
    match status_code.trim() {
        "2" => NotificationOutcome::Success,
        "0" => NotificationOutcome::Pending,
        "-1" => NotificationOutcome::Canceled,
        "-2" => NotificationOutcome::Failed,
        "-3" => NotificationOutcome::Chargedback,
        _ => NotificationOutcome::Unknown,
    }
}

fn md5_upper(input: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize()).to_uppercase()
}

/// The gateway's notification signature:
/// MD5(merchant_id + order_id + amount + currency + status_code +
/// MD5(secret)), all uppercase hex.
pub fn notification_signature(
    merchant_id: &str,
    order_id: &str,
    amount: &str,
    currency: &str,
    status_code: &str,
    merchant_secret: &str,
) -> String {
    md5_upper(&format!(
        "{}{}{}{}{}{}",
        merchant_id,
        order_id,
        amount,
        currency,
        status_code,
        md5_upper(merchant_secret)
    ))
}

fn checkout_hash(
    merchant_id: &str,
    order_id: &str,
    amount: &str,
    currency: &str,
    merchant_secret: &str,
) -> String {
    md5_upper(&format!(
        "{}{}{}{}{}",
        merchant_id,
        order_id,
        amount,
        currency,
        md5_upper(merchant_secret)
    ))
}

/// Cents to the gateway's "1234.56" wire format.
pub fn format_amount(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// Gateway amount string to cents. Returns None on anything that does
/// not look like a decimal amount.
pub fn parse_amount_cents(amount: &str) -> Option<i64> {
    let (whole, frac) = match amount.trim().split_once('.') {
        Some((w, f)) => (w, f),
        None => (amount.trim(), ""),
    };
    let whole: i64 = whole.parse().ok()?;
    let frac_cents: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().ok()? * 10,
        _ => frac[..2].parse().ok()?,
    };
    Some(whole * 100 + frac_cents)
}

pub struct PayHereGateway {
    merchant_id: String,
    merchant_secret: String,
    currency: String,
    bookings: Arc<dyn BookingRepository>,
}

impl PayHereGateway {
    pub fn new(
        merchant_id: String,
        merchant_secret: String,
        currency: String,
        bookings: Arc<dyn BookingRepository>,
    ) -> Self {
        Self {
            merchant_id,
            merchant_secret,
            currency,
            bookings,
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Signed checkout fields for a payment group and its authoritative
    /// amount. Callers must use this amount, never their own.
    pub fn checkout_fields(&self, order_id: Uuid, amount_cents: i64, items: &str) -> CheckoutFields {
        let amount = format_amount(amount_cents);
        let hash = checkout_hash(
            &self.merchant_id,
            &order_id.to_string(),
            &amount,
            &self.currency,
            &self.merchant_secret,
        );
        CheckoutFields {
            merchant_id: self.merchant_id.clone(),
            order_id: order_id.to_string(),
            items: items.to_string(),
            amount,
            currency: self.currency.clone(),
            hash,
        }
    }

    fn verify_signature(&self, notification: &PaymentNotification) -> bool {
        let expected = notification_signature(
            &notification.merchant_id,
            &notification.order_id,
            &notification.payhere_amount,
            &notification.payhere_currency,
            &notification.status_code,
            &self.merchant_secret,
        );
        let received = notification.md5sig.to_uppercase();
        bool::from(expected.as_bytes().ct_eq(received.as_bytes()))
    }

    /// Process one gateway notification. The signature check is the
    /// sole authentication of this channel and runs before anything
    /// else; no booking is touched on a mismatch. Only a success status
    /// mutates state, and redelivery of the same success notification
    /// is a no-op. Returns the bookings that were confirmed (empty when
    /// the notification was acknowledged without mutation).
    pub async fn handle_notification(
        &self,
        notification: PaymentNotification,
    ) -> Result<Vec<Booking>> {
        if notification.merchant_id != self.merchant_id || !self.verify_signature(&notification) {
            return Err(AppError::InvalidSignature);
        }

        match outcome_of(&notification.status_code) {
            NotificationOutcome::Success => {}
            outcome => {
                tracing::info!(
                    order_id = %notification.order_id,
                    status_code = %notification.status_code,
                    "Ignoring non-success payment notification: {:?}",
                    outcome
                );
                return Ok(Vec::new());
            }
        }

        let group_id = Uuid::parse_str(notification.order_id.trim()).map_err(|_| {
            AppError::Validation(format!("Unrecognized order id: {}", notification.order_id))
        })?;

        let bookings = self.bookings.find_by_payment_group(group_id).await?;
        if bookings.is_empty() {
            // Webhooks have no interactive retry; log the anomaly and
            // answer with a client-safe error.
            tracing::warn!(
                order_id = %notification.order_id,
                "Payment notification for unknown booking group"
            );
            return Err(AppError::NotFound("Booking group not found".to_string()));
        }

        let tier = match notification.custom_2.as_deref() {
            Some("full") => PaymentStatus::FullPaid,
            _ => PaymentStatus::AdvancedPaid,
        };

        self.bookings
            .update_group_status(
                group_id,
                StatusChange {
                    status: Some(BookingStatus::Confirmed),
                    payment_status: Some(tier),
                },
            )
            .await?;

        self.bookings
            .record_gateway_payment(
                group_id,
                notification.payment_id.as_deref(),
                parse_amount_cents(&notification.payhere_amount),
            )
            .await?;

        tracing::info!(
            order_id = %notification.order_id,
            payment_id = ?notification.payment_id,
            "Payment confirmed for booking group"
        );

        self.bookings.find_by_payment_group(group_id).await
    }
}
