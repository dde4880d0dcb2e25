//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Cross-origin policy.
    pub cors: CorsConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Request size and timeout limits.
    pub limits: LimitsConfig,

    /// Third-party HTTP APIs.
    pub upstream: UpstreamConfig,

    /// Database connections.
    pub database: DatabaseConfig,

    /// USRN lookup access control.
    pub usrn: UsrnConfig,

    /// Per-feature switches.
    pub features: FeatureConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Security response headers.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// What to do with a request that carries neither `Origin` nor `Referer`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MissingOriginPolicy {
    /// Treat the request as cross-origin from an unknown site.
    #[default]
    Reject,
    /// Assume a same-origin request (browsers omit `Origin` on same-origin GETs).
    Accept,
}

/// Cross-origin configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Exact origins allowed to call the API.
    pub allowed_origins: Vec<String>,

    /// Also allow `localhost_origin` (development).
    pub allow_localhost: bool,

    /// Development origin added when `allow_localhost` is set.
    pub localhost_origin: String,

    /// Policy for requests without `Origin` and `Referer`.
    pub missing_origin: MissingOriginPolicy,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "https://datawatchman.dev".to_string(),
                "https://www.datawatchman.dev".to_string(),
            ],
            allow_localhost: false,
            localhost_origin: "http://localhost:3000".to_string(),
            missing_origin: MissingOriginPolicy::Reject,
        }
    }
}

/// A fixed-window limit.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct WindowLimit {
    /// Requests allowed per window.
    pub max_requests: u32,

    /// Window length in seconds.
    pub window_secs: u64,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Limit applied to every gated route without an override.
    pub default: WindowLimit,

    /// Per-route overrides keyed by route name (e.g. "usrn_lookup").
    pub routes: HashMap<String, WindowLimit>,
}

impl RateLimitConfig {
    /// Effective limit for a route.
    pub fn for_route(&self, route: &str) -> WindowLimit {
        self.routes.get(route).copied().unwrap_or(self.default)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let mut routes = HashMap::new();
        routes.insert(
            "usrn_lookup".to_string(),
            WindowLimit {
                max_requests: 20,
                window_secs: 30 * 60,
            },
        );
        Self {
            enabled: true,
            default: WindowLimit {
                max_requests: 30,
                window_secs: 30 * 60,
            },
            routes,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum JSON body size in bytes.
    pub max_body_bytes: usize,

    /// Total time allowed for one inbound request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 100 * 1024,
            request_timeout_secs: 30,
        }
    }
}

/// Third-party API endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// BAN address search base URL.
    pub ban_url: String,

    /// IGN Géoplateforme base URL (reverse geocoding and WFS).
    pub geoplateforme_url: String,

    /// INSEE Sirene base URL.
    pub insee_url: String,

    /// INSEE integration key. Companies lookups return empty results without it.
    pub insee_api_key: Option<String>,

    /// Paris open-data records endpoint for street works.
    pub paris_works_url: String,

    /// Timeout for every outbound request, in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            ban_url: "https://api-adresse.data.gouv.fr".to_string(),
            geoplateforme_url: "https://data.geopf.fr".to_string(),
            insee_url: "https://api.insee.fr/api-sirene/3.11".to_string(),
            insee_api_key: None,
            paris_works_url:
                "https://opendata.paris.fr/api/explore/v2.1/catalog/datasets/chantiers-a-paris/records"
                    .to_string(),
            timeout_secs: 10,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection string for the submissions table.
    pub submissions_url: Option<String>,

    /// Connection string for the analytical (BDUK) database.
    pub analytics_url: Option<String>,

    /// BDUK premises table.
    pub bduk_table: String,

    /// OS open identifiers (UPRN -> USRN) table.
    pub os_identifiers_table: String,

    /// Pool size per database.
    pub max_connections: u32,

    /// Seconds to wait for a pooled connection.
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            submissions_url: None,
            analytics_url: None,
            bduk_table: "bduk_premises".to_string(),
            os_identifiers_table: "os_open_linked_identifiers".to_string(),
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }
}

/// USRN lookup access control.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UsrnConfig {
    /// Require the access password on lookups.
    pub require_password: bool,

    /// Shared access password.
    pub access_password: Option<String>,
}

impl Default for UsrnConfig {
    fn default() -> Self {
        Self {
            require_password: true,
            access_password: None,
        }
    }
}

/// Feature switches. A disabled feature answers 503.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub submissions: bool,
    pub usrn_lookup: bool,
    pub street_works: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            submissions: true,
            usrn_lookup: true,
            street_works: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security headers.
    pub enable_headers: bool,

    /// Production deployment: adds Strict-Transport-Security.
    pub production: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            production: false,
        }
    }
}
