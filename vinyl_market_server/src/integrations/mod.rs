pub mod notifications;
pub mod stripe;
