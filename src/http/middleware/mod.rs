//! Request middleware for the `/api` routes.
//!
//! ```text
//! request → cors.rs (answer preflight, decorate response)
//!         → gate.rs (feature flag → origin → rate limit)
//!         → handler
//! ```

pub mod cors;
pub mod gate;

pub use cors::cors;
pub use gate::{enforce, Gate};
