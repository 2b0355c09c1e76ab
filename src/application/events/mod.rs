//! Application events (pub/sub)
//!
//! Services publish on the `EventBus`; the notification WebSocket relays
//! the stream to admin dashboards.

pub mod event_bus;
pub mod types;

pub use event_bus::{create_event_bus, EventBus, EventSubscriber, SharedEventBus};
pub use types::*;
