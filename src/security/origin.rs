//! Origin allow-list validation.
//!
//! A request passes when its `Origin` header (or, failing that, the origin
//! part of its `Referer`) is an exact member of the configured set and uses
//! `https`, unless the host is `localhost`. Requests that carry neither header
//! are governed by [`MissingOriginPolicy`].

use axum::http::{header, HeaderMap};
use url::Url;

use crate::config::{CorsConfig, MissingOriginPolicy};

/// Immutable allow-list built once at startup.
#[derive(Debug, Clone)]
pub struct OriginValidator {
    allowed: Vec<String>,
    missing: MissingOriginPolicy,
}

impl OriginValidator {
    pub fn new(allowed: Vec<String>, missing: MissingOriginPolicy) -> Self {
        Self { allowed, missing }
    }

    pub fn from_config(config: &CorsConfig) -> Self {
        let mut allowed = config.allowed_origins.clone();
        if config.allow_localhost && !allowed.contains(&config.localhost_origin) {
            allowed.push(config.localhost_origin.clone());
        }
        Self::new(allowed, config.missing_origin)
    }

    /// Exact membership, used to decide whether CORS headers are echoed.
    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed.iter().any(|o| o == origin)
    }

    /// Decide whether a request may proceed.
    pub fn validate(&self, origin: Option<&str>, referer: Option<&str>) -> bool {
        let origin = origin.filter(|v| !v.is_empty());
        let referer = referer.filter(|v| !v.is_empty());

        match (origin, referer) {
            (Some(origin), _) => self.check(origin),
            (None, Some(referer)) => match Url::parse(referer) {
                Ok(url) => self.check(&url.origin().ascii_serialization()),
                Err(_) => false,
            },
            (None, None) => self.missing == MissingOriginPolicy::Accept,
        }
    }

    /// [`validate`](Self::validate) over request headers.
    pub fn validate_headers(&self, headers: &HeaderMap) -> bool {
        let referer = headers
            .get(header::REFERER)
            .and_then(|v| v.to_str().ok());
        match headers.get(header::ORIGIN).map(|v| v.to_str()) {
            // Present but not visible ASCII: unusable, not absent.
            Some(Err(_)) => false,
            Some(Ok(origin)) => self.validate(Some(origin), referer),
            None => self.validate(None, referer),
        }
    }

    fn check(&self, origin: &str) -> bool {
        is_secure_origin(origin) && self.is_allowed(origin)
    }
}

fn is_secure_origin(origin: &str) -> bool {
    match Url::parse(origin) {
        Ok(url) => url.scheme() == "https" || url.host_str() == Some("localhost"),
        Err(_) => false,
    }
}

/// Startup check for a configured allow-list entry.
pub fn check_origin_entry(origin: &str) -> Result<(), &'static str> {
    let url = Url::parse(origin).map_err(|_| "is not a URL")?;
    if url.origin().ascii_serialization() != origin {
        return Err("must be a bare origin (scheme://host[:port], no path)");
    }
    if !is_secure_origin(origin) {
        return Err("must use https unless the host is localhost");
    }
    Ok(())
}
