//! Rent Gateway - backend for the rent estimate front-end
//!
//! Proxies address autocomplete and rent estimate lookups to their providers,
//! sends the signup confirmation email, and hosts the single-page app.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{format_currency, render_signup_email};
pub use models::{EmailSentResponse, ErrorResponse, RentRange, SignupNotification, ValuationQuery};
pub use routes::{configure_routes, AppState, StaticFiles};
