//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{AppConfig, WindowLimit};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value:?}")]
    Env { key: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, apply environment overrides and validate.
///
/// Without a path the defaults are used as the base.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => AppConfig::default(),
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn parse_file(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay deploy-time values and secrets.
///
/// `lookup` abstracts `std::env::var` so tests can feed a fixed map.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get("BIND_ADDR") {
        config.listener.bind_address = v;
    }
    if let Some(v) = get("DATABASE_URL") {
        config.database.submissions_url = Some(v);
    }
    if let Some(v) = get("ANALYTICS_DATABASE_URL") {
        config.database.analytics_url = Some(v);
    }
    if let Some(v) = get("BDUK_TABLE") {
        config.database.bduk_table = v;
    }
    if let Some(v) = get("OS_IDENTIFIERS_TABLE") {
        config.database.os_identifiers_table = v;
    }
    if let Some(v) = get("INSEE_API_KEY") {
        config.upstream.insee_api_key = Some(v);
    }
    if let Some(v) = get("USRN_ACCESS_PASSWORD") {
        config.usrn.access_password = Some(v);
    }
    if let Some(v) = get("REQUIRE_PASSWORD") {
        // Anything but an explicit "false" keeps the password requirement.
        config.usrn.require_password = v.trim() != "false";
    }
    if let Some(v) = get("ALLOW_LOCALHOST") {
        config.cors.allow_localhost = v.trim() == "true";
    }

    let max = get("RATE_LIMIT_MAX")
        .map(|v| parse_env("RATE_LIMIT_MAX", &v))
        .transpose()?;
    let minutes = get("RATE_LIMIT_WINDOW_MINUTES")
        .map(|v| parse_env::<u64>("RATE_LIMIT_WINDOW_MINUTES", &v))
        .transpose()?;
    if max.is_some() || minutes.is_some() {
        let current = config.rate_limit.default;
        config.rate_limit.default = WindowLimit {
            max_requests: max.unwrap_or(current.max_requests),
            window_secs: minutes.map(|m| m * 60).unwrap_or(current.window_secs),
        };
    }

    Ok(())
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_secrets_and_limits() {
        let mut config = AppConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("INSEE_API_KEY", "secret"),
                ("REQUIRE_PASSWORD", "false"),
                ("ALLOW_LOCALHOST", "true"),
                ("RATE_LIMIT_MAX", "5"),
                ("RATE_LIMIT_WINDOW_MINUTES", "2"),
            ]),
        )
        .unwrap();

        assert_eq!(config.upstream.insee_api_key.as_deref(), Some("secret"));
        assert!(!config.usrn.require_password);
        assert!(config.cors.allow_localhost);
        assert_eq!(config.rate_limit.default.max_requests, 5);
        assert_eq!(config.rate_limit.default.window_secs, 120);
    }

    #[test]
    fn require_password_defaults_to_true_for_other_values() {
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, env(&[("REQUIRE_PASSWORD", "no")])).unwrap();
        assert!(config.usrn.require_password);
    }

    #[test]
    fn bad_numeric_env_is_an_error() {
        let mut config = AppConfig::default();
        let err = apply_env_overrides(&mut config, env(&[("RATE_LIMIT_MAX", "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { key: "RATE_LIMIT_MAX", .. }));
    }

    #[test]
    fn parses_toml_with_route_overrides() {
        let config: AppConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [cors]
            allowed_origins = ["https://example.org"]
            missing_origin = "accept"

            [rate_limit.routes.geocode]
            max_requests = 3
            window_secs = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.cors.allowed_origins, vec!["https://example.org"]);
        assert_eq!(
            config.rate_limit.for_route("geocode"),
            WindowLimit { max_requests: 3, window_secs: 60 }
        );
        assert_eq!(config.rate_limit.for_route("companies").max_requests, 30);
    }
}
