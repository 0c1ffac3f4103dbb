pub mod coordinator;
pub mod dispatch;
pub mod emails;
pub mod memory;
pub mod pricing;
pub mod schedule;

pub use coordinator::{BookingCoordinator, BookingError, EventDisposition, MockPaymentGateway};
pub use dispatch::{DispatchConfig, NotificationDispatcher};
pub use memory::MemoryStore;
