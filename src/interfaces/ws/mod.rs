//! WebSocket interfaces
//!
//! - `notifications`: realtime event stream for the admin dashboard

pub mod notifications;

pub use notifications::{ws_notifications_handler, NotificationState};
