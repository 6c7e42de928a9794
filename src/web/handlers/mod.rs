//! HTTP request handlers, one module per domain.

pub mod distance;
pub mod health;
pub mod notifications;
pub mod offers;
pub mod ratings;
pub mod requests;
pub mod users;
