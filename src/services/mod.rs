//! Business workflows sitting between the HTTP handlers and the
//! persistence layer.

pub mod notifications;
pub mod offers;
pub mod requests;

pub use notifications::NotificationService;
pub use offers::OfferService;
pub use requests::RequestService;
