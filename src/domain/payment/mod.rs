//! Payment aggregate

pub mod model;
pub mod repository;

pub use model::{Payment, PaymentStatus, PaymentTotals};
pub use repository::PaymentRepository;
