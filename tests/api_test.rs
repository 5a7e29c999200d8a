use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;
use uuid::Uuid;

use turfbook::{
    api::{self, middleware::auth::Claims},
    config::Settings,
    domain::{BookingStatus, Ground, Sport},
    notifications::NotificationManager,
    payments::{payhere, PayHereGateway},
    repository::{BookingRepository, GroundRepository, SqliteBookingRepository, SqliteGroundRepository},
    service::ServiceContext,
};

const MERCHANT_ID: &str = "1211149";
const MERCHANT_SECRET: &str = "test-merchant-secret";
const JWT_SECRET: &str = "test-jwt-secret";

struct TestApp {
    app: Router,
    grounds: Arc<SqliteGroundRepository>,
    bookings: Arc<SqliteBookingRepository>,
}

async fn setup() -> anyhow::Result<TestApp> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let grounds = Arc::new(SqliteGroundRepository::new(pool.clone()));
    let bookings = Arc::new(SqliteBookingRepository::new(pool.clone()));

    let mut settings = Settings::default();
    settings.auth.jwt_secret = JWT_SECRET.to_string();
    settings.payhere.merchant_id = Some(MERCHANT_ID.to_string());
    settings.payhere.merchant_secret = Some(MERCHANT_SECRET.to_string());
    settings.payhere.enabled = true;

    let service_context = Arc::new(ServiceContext::new(
        grounds.clone(),
        bookings.clone(),
        Arc::new(NotificationManager::new()),
        pool,
    ));

    let gateway = Arc::new(PayHereGateway::new(
        MERCHANT_ID.to_string(),
        MERCHANT_SECRET.to_string(),
        "LKR".to_string(),
        bookings.clone(),
    ));

    let app = api::create_app(service_context, Some(gateway), Arc::new(settings));

    Ok(TestApp {
        app,
        grounds,
        bookings,
    })
}

async fn seed_court_a(grounds: &SqliteGroundRepository) -> anyhow::Result<Ground> {
    Ok(grounds
        .create(Ground {
            id: Uuid::new_v4(),
            name: "Court A".to_string(),
            owner_id: Uuid::new_v4(),
            open_from: "09:00".to_string(),
            open_to: "11:00".to_string(),
            sports: vec![Sport {
                name: "Futsal".to_string(),
                price_per_hour_cents: 50_000,
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .await?)
}

fn bearer_token(role: &str) -> String {
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        role: role.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

async fn body_json(response: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_endpoint_responds() -> anyhow::Result<()> {
    let test = setup().await?;

    let response = test
        .app
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn slot_listing_is_public() -> anyhow::Result<()> {
    let test = setup().await?;
    let ground = seed_court_a(&test.grounds).await?;

    let response = test
        .app
        .oneshot(
            Request::builder()
                .uri(format!("/api/grounds/{}/slots?date=2026-03-10", ground.id))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await?;
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 4);
    assert_eq!(slots[0]["start_time"], "09:00");
    assert_eq!(slots[0]["status"], "available");

    Ok(())
}

#[tokio::test]
async fn guest_booking_ignores_client_totals() -> anyhow::Result<()> {
    let test = setup().await?;
    let ground = seed_court_a(&test.grounds).await?;

    // The client tries to pay one rupee; the field is not part of the
    // request schema and the server computes the real amount.
    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bookings",
            json!({
                "ground_id": ground.id,
                "sport_name": "Futsal",
                "date": "2026-03-10",
                "time_slots": ["09:00", "09:30"],
                "guest": {"name": "Amaya Fernando", "phone": "+94770001111"},
                "total_amount": 100,
            }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await?;
    assert_eq!(body["total_amount_cents"], 50_000);
    assert_eq!(body["status"], "reserved");
    assert_eq!(body["payment_status"], "advanced_paid");
    // Signed checkout fields carry the authoritative amount.
    assert_eq!(body["checkout"]["amount"], "500.00");
    assert_eq!(body["checkout"]["merchant_id"], MERCHANT_ID);

    Ok(())
}

#[tokio::test]
async fn booking_reads_require_a_token() -> anyhow::Result<()> {
    let test = setup().await?;
    let ground = seed_court_a(&test.grounds).await?;

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bookings",
            json!({
                "ground_id": ground.id,
                "sport_name": "Futsal",
                "date": "2026-03-10",
                "time_slots": ["10:00"],
                "guest": {"name": "Amaya Fernando", "phone": "+94770001111"},
            }),
        ))
        .await?;
    let body = body_json(response).await?;
    let booking_id = body["booking_id"].as_str().unwrap().to_string();

    let anonymous = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/bookings/{}", booking_id))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let authed = test
        .app
        .oneshot(
            Request::builder()
                .uri(format!("/api/bookings/{}", booking_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", bearer_token("member")))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(authed.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn gateway_callback_confirms_via_http() -> anyhow::Result<()> {
    let test = setup().await?;
    let ground = seed_court_a(&test.grounds).await?;

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bookings",
            json!({
                "ground_id": ground.id,
                "sport_name": "Futsal",
                "date": "2026-03-10",
                "time_slots": ["09:00", "09:30"],
                "guest": {"name": "Amaya Fernando", "phone": "+94770001111"},
            }),
        ))
        .await?;
    let body = body_json(response).await?;
    let group_id: Uuid = body["payment_group_id"].as_str().unwrap().parse()?;

    let md5sig = payhere::notification_signature(
        MERCHANT_ID,
        &group_id.to_string(),
        "500.00",
        "LKR",
        "2",
        MERCHANT_SECRET,
    );
    let form = format!(
        "merchant_id={}&order_id={}&payment_id=320025471&payhere_amount=500.00&payhere_currency=LKR&status_code=2&md5sig={}&custom_2=full",
        MERCHANT_ID, group_id, md5sig
    );

    let callback = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/payments/notify")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form))?,
        )
        .await?;
    assert_eq!(callback.status(), StatusCode::OK);

    let group = test.bookings.find_by_payment_group(group_id).await?;
    assert!(group.iter().all(|b| b.status == BookingStatus::Confirmed));

    // A tampered signature is rejected without touching the bookings.
    let tampered = format!(
        "merchant_id={}&order_id={}&payhere_amount=9999.00&payhere_currency=LKR&status_code=2&md5sig={}&custom_2=full",
        MERCHANT_ID, group_id, md5sig
    );
    let rejected = test
        .app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/payments/notify")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(tampered))?,
        )
        .await?;
    assert_eq!(rejected.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn operator_override_requires_admin_role() -> anyhow::Result<()> {
    let test = setup().await?;
    let ground = seed_court_a(&test.grounds).await?;

    let response = test
        .app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/bookings",
            json!({
                "ground_id": ground.id,
                "sport_name": "Futsal",
                "date": "2026-03-10",
                "time_slots": ["09:00"],
                "guest": {"name": "Amaya Fernando", "phone": "+94770001111"},
            }),
        ))
        .await?;
    let body = body_json(response).await?;
    let booking_id = body["booking_id"].as_str().unwrap().to_string();

    let as_member = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/bookings/{}/status", booking_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", bearer_token("member")))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"status": "confirmed"}).to_string()))?,
        )
        .await?;
    assert_eq!(as_member.status(), StatusCode::FORBIDDEN);

    let as_admin = test
        .app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/api/bookings/{}/status", booking_id))
                .header(header::AUTHORIZATION, format!("Bearer {}", bearer_token("admin")))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({"status": "confirmed"}).to_string()))?,
        )
        .await?;
    assert_eq!(as_admin.status(), StatusCode::OK);

    let json = body_json(as_admin).await?;
    assert_eq!(json["status"], "confirmed");

    Ok(())
}
