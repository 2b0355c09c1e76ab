//! Inbound adapters: the REST API and the admin notification WebSocket

pub mod http;
pub mod ws;
