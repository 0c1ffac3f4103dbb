use std::sync::Arc;

use slipway_booking::schedule::ScheduleRules;
use slipway_booking::{BookingCoordinator, NotificationDispatcher};
use slipway_core::repository::{BookingRepository, UnitRepository};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

/// Dashboard credentials; admin routes reject everything until both are set.
#[derive(Clone, Default)]
pub struct AdminCredentials {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// The part of the gateway configuration the frontend may see.
#[derive(Clone)]
pub struct PaymentsPublicConfig {
    pub public_key: String,
    pub currency: String,
}

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<BookingCoordinator>,
    pub bookings: Arc<dyn BookingRepository>,
    pub units: Arc<dyn UnitRepository>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub auth: AuthConfig,
    pub admin: AdminCredentials,
    pub payments: PaymentsPublicConfig,
    pub schedule: ScheduleRules,
}
