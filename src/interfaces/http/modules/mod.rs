pub mod health;
pub mod metrics;
pub mod payments;
pub mod request_id;
pub mod requests;
pub mod stations;
pub mod users;
