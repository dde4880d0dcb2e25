//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming /api request:
//!     → origin.rs (allow-list check on Origin / Referer)
//!     → rate_limit.rs (per-route fixed window)
//!     → handler
//! Outgoing response:
//!     → headers.rs (nosniff, frame, referrer, CSP, HSTS)
//! ```
//!
//! # Design Decisions
//! - Fail closed: a request with no usable origin is rejected unless the
//!   configuration says otherwise
//! - State (allow-list, limiters) is built once and injected, never global

pub mod headers;
pub mod origin;
pub mod rate_limit;

pub use headers::apply_security_headers;
pub use origin::OriginValidator;
pub use rate_limit::{FixedWindowLimiter, RateLimiterSet};
