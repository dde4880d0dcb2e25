//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, overlay environment secrets)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the allowed-origin set never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load, ConfigError};
pub use schema::{
    AppConfig, CorsConfig, DatabaseConfig, FeatureConfig, LimitsConfig, ListenerConfig,
    MissingOriginPolicy, ObservabilityConfig, RateLimitConfig, SecurityConfig, UpstreamConfig,
    UsrnConfig, WindowLimit,
};
