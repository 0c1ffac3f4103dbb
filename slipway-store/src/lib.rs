pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod gateway;
pub mod mailer;
pub mod unit_repo;

pub use booking_repo::PgBookingRepository;
pub use gateway::HttpPaymentGateway;
pub use mailer::HttpMailer;
pub use unit_repo::PgUnitRepository;
