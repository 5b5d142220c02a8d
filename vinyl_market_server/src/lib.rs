//! # Vinyl Market server
//!
//! The HTTP surface of the vinyl market. It is responsible for:
//! * Opening Stripe checkout sessions for authenticated buyers.
//! * Receiving Stripe webhooks and turning completed checkout sessions into orders, exactly once per session.
//! * Accepting and removing reviews, which keeps each vinyl's average rating current.
//! * Sending receipts and channel announcements for new orders, off the request path.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/stripe/create-checkout-session`, `/stripe/webhook`: Checkout and payment notifications.
//! * `/reviews/{vinyl_id}`, `/reviews/{review_id}`, `/reviews/vinyl/{vinyl_id}`: Reviews.
//! * `/api/orders`, `/api/orders/session/{session_id}`, `/api/system_logs`: Admin views.
pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod stripe_routes;

#[cfg(test)]
mod endpoint_tests;
