use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use turfbook::{
    api,
    config::Settings,
    notifications::{webhook::WebhookChannel, NotificationManager},
    payments::PayHereGateway,
    repository::{SqliteBookingRepository, SqliteGroundRepository},
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "turfbook=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!(
        "Starting Turfbook server on {}:{}",
        settings.server.host,
        settings.server.port
    );

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations").run(&db_pool).await?;

    // Initialize repositories
    let ground_repo = Arc::new(SqliteGroundRepository::new(db_pool.clone()));
    let booking_repo = Arc::new(SqliteBookingRepository::new(db_pool.clone()));

    // Initialize notification channels
    let notifications = Arc::new(NotificationManager::new());
    if let Some(webhook) = WebhookChannel::new(settings.notifications.clone()) {
        notifications.register(Arc::new(webhook)).await;
    }

    let health_results = notifications.health_check_all().await;
    for (name, result) in health_results {
        match result {
            Ok(_) => tracing::info!("Notification channel {} is healthy", name),
            Err(e) => tracing::warn!("Notification channel {} health check failed: {:?}", name, e),
        }
    }

    // Create service context
    let service_context = Arc::new(ServiceContext::new(
        ground_repo,
        booking_repo.clone(),
        notifications,
        db_pool.clone(),
    ));

    // Initialize the payment gateway if configured
    let gateway = if settings.payhere.enabled {
        if let (Some(merchant_id), Some(merchant_secret)) = (
            settings.payhere.merchant_id.clone(),
            settings.payhere.merchant_secret.clone(),
        ) {
            tracing::info!("PayHere payment processing enabled");
            Some(Arc::new(PayHereGateway::new(
                merchant_id,
                merchant_secret,
                settings.payhere.currency.clone(),
                booking_repo,
            )))
        } else {
            tracing::warn!("PayHere enabled but missing configuration");
            None
        }
    } else {
        tracing::info!("PayHere payment processing disabled");
        None
    };

    let app = api::create_app(service_context, gateway, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        settings.server.host, settings.server.port
    ))
    .await?;

    tracing::info!(
        "Server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
