use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

use turfbook::{
    domain::{CreateBookingRequest, Ground, GuestDetails, PaymentStatus, Sport},
    repository::{SqliteBookingRepository, SqliteGroundRepository},
    service::ReservationService,
};

use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("🌱 Starting database seeding...");

    // Initialize database connection
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:turfbook.db".to_string());

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    // Run migrations first
    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    // Initialize repositories
    let ground_repo = Arc::new(SqliteGroundRepository::new(db_pool.clone()));
    let booking_repo = Arc::new(SqliteBookingRepository::new(db_pool.clone()));
    let reservations = ReservationService::new(ground_repo.clone(), booking_repo.clone());

    // Seed grounds
    println!("🏟️  Creating grounds...");

    use turfbook::repository::GroundRepository;

    let owner_id = Uuid::new_v4();

    let court_a = ground_repo
        .create(Ground {
            id: Uuid::new_v4(),
            name: "Court A".to_string(),
            owner_id,
            open_from: "09:00".to_string(),
            open_to: "23:00".to_string(),
            sports: vec![
                Sport {
                    name: "Futsal".to_string(),
                    price_per_hour_cents: 250_000,
                },
                Sport {
                    name: "Badminton".to_string(),
                    price_per_hour_cents: 120_000,
                },
            ],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .await?;

    let arena = ground_repo
        .create(Ground {
            id: Uuid::new_v4(),
            name: "Riverside Arena".to_string(),
            owner_id: Uuid::new_v4(),
            open_from: "06:00".to_string(),
            open_to: "22:00".to_string(),
            sports: vec![Sport {
                name: "Cricket".to_string(),
                price_per_hour_cents: 400_000,
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .await?;

    println!("  ✅ Created 2 grounds ({} and {})", court_a.name, arena.name);

    // Seed a couple of demo bookings for tomorrow evening
    println!("📅 Creating demo bookings...");

    let tomorrow = (Utc::now() + Duration::days(1)).format("%Y-%m-%d").to_string();

    let guest_booking = reservations
        .create_booking(CreateBookingRequest {
            ground_id: court_a.id,
            sport_name: "Futsal".to_string(),
            date: tomorrow.clone(),
            time_slots: vec!["18:00".to_string(), "18:30".to_string()],
            user_id: None,
            guest: Some(GuestDetails {
                name: "Kasun Perera".to_string(),
                phone: "+94771234567".to_string(),
                email: Some("kasun@example.com".to_string()),
                national_id: None,
            }),
            intended_payment_status: Some(PaymentStatus::AdvancedPaid),
            payment_group_id: None,
        })
        .await?;

    reservations
        .create_booking(CreateBookingRequest {
            ground_id: court_a.id,
            sport_name: "Badminton".to_string(),
            date: tomorrow,
            time_slots: vec!["20:00".to_string()],
            user_id: Some(Uuid::new_v4()),
            guest: None,
            intended_payment_status: Some(PaymentStatus::FullPaid),
            payment_group_id: None,
        })
        .await?;

    println!(
        "  ✅ Created 2 demo bookings (guest group {})",
        guest_booking.payment_group_id
    );

    println!("🎉 Seeding complete!");

    Ok(())
}
