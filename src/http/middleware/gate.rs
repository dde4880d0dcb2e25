//! Per-route admission: feature flag, then origin, then rate limit.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::observability::metrics;
use crate::security::{FixedWindowLimiter, OriginValidator};

/// Everything one route needs to admit or turn away a request.
#[derive(Clone)]
pub struct Gate {
    route: &'static str,
    enabled: bool,
    origins: Arc<OriginValidator>,
    limiter: Option<Arc<FixedWindowLimiter>>,
}

impl Gate {
    pub fn new(
        route: &'static str,
        enabled: bool,
        origins: Arc<OriginValidator>,
        limiter: Option<Arc<FixedWindowLimiter>>,
    ) -> Self {
        Self {
            route,
            enabled,
            origins,
            limiter,
        }
    }

    /// Decide without side effects other than consuming a rate-limit slot.
    pub fn check(&self, request: &Request<Body>) -> Result<(), ApiError> {
        if !self.enabled {
            metrics::record_rejection(self.route, "disabled");
            return Err(ApiError::FeatureDisabled(self.route));
        }

        if !self.origins.validate_headers(request.headers()) {
            tracing::warn!(route = self.route, "Rejected request origin");
            metrics::record_rejection(self.route, "origin");
            return Err(ApiError::OriginRejected);
        }

        if let Some(limiter) = &self.limiter {
            if !limiter.allow() {
                tracing::warn!(route = self.route, "Rate limit exceeded");
                metrics::record_rejection(self.route, "rate_limited");
                return Err(ApiError::RateLimited);
            }
        }

        Ok(())
    }
}

pub async fn enforce(State(gate): State<Gate>, request: Request<Body>, next: Next) -> Response {
    match gate.check(&request) {
        Ok(()) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}
