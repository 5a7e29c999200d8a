pub mod cancellation_service;
pub mod pricing;
pub mod reservation_service;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::notifications::NotificationManager;
use crate::repository::*;

pub use cancellation_service::{CancellationEligibility, CancellationService, CANCELLATION_NOTICE_HOURS};
pub use reservation_service::ReservationService;

pub struct ServiceContext {
    pub ground_repo: Arc<dyn GroundRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub reservation_service: Arc<ReservationService>,
    pub cancellation_service: Arc<CancellationService>,
    pub notifications: Arc<NotificationManager>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        ground_repo: Arc<dyn GroundRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        notifications: Arc<NotificationManager>,
        db_pool: SqlitePool,
    ) -> Self {
        let reservation_service = Arc::new(ReservationService::new(
            ground_repo.clone(),
            booking_repo.clone(),
        ));
        let cancellation_service = Arc::new(CancellationService::new(booking_repo.clone()));

        Self {
            ground_repo,
            booking_repo,
            reservation_service,
            cancellation_service,
            notifications,
            db_pool,
        }
    }
}
