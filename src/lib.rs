//! datawatchman: public-data API service.
//!
//! Dataset gap reports, BDUK gigabit availability by USRN, and Paris
//! street works enriched with French address, business and road data.

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod store;
pub mod upstream;

pub use config::AppConfig;
pub use error::ApiError;
pub use http::{AppState, HttpServer};
pub use lifecycle::Shutdown;
