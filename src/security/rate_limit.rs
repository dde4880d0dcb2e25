//! Fixed-window request limiting.
//!
//! Each gated route owns one [`FixedWindowLimiter`]. The count lives in this
//! process only: it is not shared between server instances and starts over on
//! restart, so it is a coarse abuse guard rather than a quota.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::config::{RateLimitConfig, WindowLimit};

/// Counter and start of the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub request_count: u32,
    pub window_start: Instant,
}

/// A single fixed window.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    state: Mutex<WindowState>,
}

impl FixedWindowLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self::starting_at(max_requests, window, Instant::now())
    }

    pub fn starting_at(max_requests: u32, window: Duration, now: Instant) -> Self {
        Self {
            max_requests,
            window,
            state: Mutex::new(WindowState {
                request_count: 0,
                window_start: now,
            }),
        }
    }

    pub fn from_limit(limit: WindowLimit) -> Self {
        Self::new(limit.max_requests, Duration::from_secs(limit.window_secs))
    }

    /// Count one request against the window.
    pub fn allow(&self) -> bool {
        self.allow_at(Instant::now())
    }

    /// [`allow`](Self::allow) with an explicit clock reading.
    pub fn allow_at(&self, now: Instant) -> bool {
        let mut state = self.state.lock().expect("rate limiter mutex poisoned");

        if now.saturating_duration_since(state.window_start) >= self.window {
            state.request_count = 0;
            state.window_start = now;
        }

        if state.request_count >= self.max_requests {
            return false;
        }

        state.request_count = state.request_count.saturating_add(1);
        true
    }

    pub fn snapshot(&self) -> WindowState {
        *self.state.lock().expect("rate limiter mutex poisoned")
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }
}

/// Limiters for every gated route, built once from configuration.
#[derive(Debug, Clone, Default)]
pub struct RateLimiterSet {
    limiters: HashMap<&'static str, Arc<FixedWindowLimiter>>,
}

impl RateLimiterSet {
    /// One limiter per route name. Returns an empty set when limiting is disabled.
    pub fn from_config(config: &RateLimitConfig, routes: &[&'static str]) -> Self {
        if !config.enabled {
            return Self::default();
        }
        let limiters = routes
            .iter()
            .map(|route| {
                let limiter = FixedWindowLimiter::from_limit(config.for_route(route));
                (*route, Arc::new(limiter))
            })
            .collect();
        Self { limiters }
    }

    /// The limiter for `route`, or `None` when the route is unlimited.
    pub fn get(&self, route: &str) -> Option<Arc<FixedWindowLimiter>> {
        self.limiters.get(route).cloned()
    }
}
