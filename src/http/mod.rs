//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request ID, trace span, timeout, security headers, metrics)
//!     → middleware/cors.rs (preflight, CORS response headers)
//!     → middleware/gate.rs (feature flag, origin, rate limit)
//!     → extract.rs (body limit, JSON/query decoding)
//!     → api handler
//! ```

pub mod extract;
pub mod middleware;
pub mod server;

pub use server::{build_router, AppState, HttpServer, StartupError, X_REQUEST_ID};
