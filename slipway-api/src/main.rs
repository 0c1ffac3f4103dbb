use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use slipway_api::state::{AdminCredentials, AuthConfig, PaymentsPublicConfig};
use slipway_api::{app, AppState};
use slipway_booking::{BookingCoordinator, DispatchConfig, NotificationDispatcher};
use slipway_core::notify::Mailer;
use slipway_core::repository::{BookingRepository, UnitRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "slipway_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = slipway_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Slipway API on port {}", config.server.port);

    // Postgres
    let pool = slipway_store::database::connect(&config.database)
        .await
        .expect("Failed to connect to Postgres");
    slipway_store::database::init_schema(&pool)
        .await
        .expect("Failed to initialise schema");
    slipway_store::database::seed_catalog(&pool)
        .await
        .expect("Failed to seed catalog");

    let bookings: Arc<dyn BookingRepository> =
        Arc::new(slipway_store::PgBookingRepository::new(pool.clone()));
    let units: Arc<dyn UnitRepository> = Arc::new(slipway_store::PgUnitRepository::new(pool));

    // External collaborators
    let gateway = Arc::new(
        slipway_store::HttpPaymentGateway::new(config.gateway.clone())
            .expect("Failed to build gateway client"),
    );
    let mailer: Arc<dyn Mailer> = Arc::new(
        slipway_store::HttpMailer::new(config.email.clone()).expect("Failed to build mail client"),
    );
    let dispatcher = Arc::new(NotificationDispatcher::new(
        mailer,
        DispatchConfig {
            from_name: config.email.from_name.clone(),
            admin_address: config.email.admin_address.clone(),
            max_attempts: config.email.max_attempts,
            retry_delay: Duration::from_secs(config.email.retry_delay_seconds),
        },
    ));

    let coordinator = Arc::new(BookingCoordinator::new(
        bookings.clone(),
        units.clone(),
        gateway,
        dispatcher.clone(),
    ));

    let app_state = AppState {
        coordinator,
        bookings,
        units,
        dispatcher,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        admin: AdminCredentials {
            email: config.admin.email.clone(),
            password: config.admin.password.clone(),
        },
        payments: PaymentsPublicConfig {
            public_key: config.gateway.public_key.clone(),
            currency: config.gateway.currency.clone(),
        },
        schedule: config.schedule.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
