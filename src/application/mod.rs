//! Application layer: use cases on top of the domain repositories

pub mod events;
pub mod services;

pub use events::{create_event_bus, Event, EventBus, EventSubscriber, SharedEventBus};
pub use services::{BookingService, StationService};
