//! Configuration validation.
//!
//! Semantic checks serde cannot express. Returns every error, not just the first.

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::AppConfig;
use crate::security::origin::check_origin_entry;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            "must be a socket address",
        ));
    }

    for origin in &config.cors.allowed_origins {
        if let Err(reason) = check_origin_entry(origin) {
            errors.push(ValidationError::new(
                "cors.allowed_origins",
                format!("{origin:?} {reason}"),
            ));
        }
    }
    if config.cors.allow_localhost {
        if let Err(reason) = check_origin_entry(&config.cors.localhost_origin) {
            errors.push(ValidationError::new("cors.localhost_origin", reason));
        }
    }

    let limits = std::iter::once(("rate_limit.default".to_string(), config.rate_limit.default))
        .chain(
            config
                .rate_limit
                .routes
                .iter()
                .map(|(name, limit)| (format!("rate_limit.routes.{name}"), *limit)),
        );
    for (field, limit) in limits {
        if limit.max_requests == 0 {
            errors.push(ValidationError::new(field.clone(), "max_requests must be > 0"));
        }
        if limit.window_secs == 0 {
            errors.push(ValidationError::new(field, "window_secs must be > 0"));
        }
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::new("limits.max_body_bytes", "must be > 0"));
    }
    if config.limits.request_timeout_secs == 0 {
        errors.push(ValidationError::new("limits.request_timeout_secs", "must be > 0"));
    }
    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::new("upstream.timeout_secs", "must be > 0"));
    }

    let upstreams = [
        ("upstream.ban_url", &config.upstream.ban_url),
        ("upstream.geoplateforme_url", &config.upstream.geoplateforme_url),
        ("upstream.insee_url", &config.upstream.insee_url),
        ("upstream.paris_works_url", &config.upstream.paris_works_url),
    ];
    for (field, value) in upstreams {
        match Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => errors.push(ValidationError::new(field, "must be an http(s) URL")),
        }
    }

    // Table names are interpolated into SQL.
    for (field, table) in [
        ("database.bduk_table", &config.database.bduk_table),
        ("database.os_identifiers_table", &config.database.os_identifiers_table),
    ] {
        if !is_sql_identifier(table) {
            errors.push(ValidationError::new(
                field,
                "must be a plain (optionally schema-qualified) identifier",
            ));
        }
    }
    if config.database.max_connections == 0 {
        errors.push(ValidationError::new("database.max_connections", "must be > 0"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "must be a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `name` or `schema.name`, ASCII alphanumerics and underscores only.
pub fn is_sql_identifier(value: &str) -> bool {
    !value.is_empty()
        && value.split('.').count() <= 3
        && value.split('.').all(|part| {
            !part.is_empty()
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !part.starts_with(|c: char| c.is_ascii_digit())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.cors.allowed_origins.push("http://example.org".into());
        config.rate_limit.default.max_requests = 0;
        config.database.bduk_table = "bduk; DROP TABLE x".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "cors.allowed_origins",
                "rate_limit.default",
                "database.bduk_table",
            ]
        );
    }

    #[test]
    fn sql_identifiers() {
        assert!(is_sql_identifier("bduk_premises"));
        assert!(is_sql_identifier("my_db.main.bduk"));
        assert!(!is_sql_identifier(""));
        assert!(!is_sql_identifier("a..b"));
        assert!(!is_sql_identifier("1table"));
        assert!(!is_sql_identifier("t where 1=1"));
    }
}
