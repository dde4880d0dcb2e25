//! HTTP endpoints.
//!
//! | Route                       | Method | Gate                     |
//! |-----------------------------|--------|--------------------------|
//! | `/api/submissions`          | POST   | origin + rate            |
//! | `/api/usrn-lookup`          | POST   | origin + rate + password |
//! | `/api/auth-config`          | GET    | none                     |
//! | `/api/geocode`              | GET    | origin + rate            |
//! | `/api/companies`            | GET    | origin + rate            |
//! | `/api/bdtopo`               | GET    | origin + rate            |
//! | `/api/french-street-works`  | GET    | origin + rate            |
//!
//! Every `/api` route also answers `OPTIONS` through the CORS layer.

pub mod auth_config;
pub mod bdtopo;
pub mod companies;
pub mod geocode;
pub mod street_works;
pub mod submissions;
pub mod usrn_lookup;

use axum::{
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};

use crate::error::ApiError;
use crate::http::middleware::{enforce, Gate};
use crate::http::AppState;
use crate::upstream::Resolution;

pub const SUBMISSIONS: &str = "submissions";
pub const USRN_LOOKUP: &str = "usrn_lookup";
pub const GEOCODE: &str = "geocode";
pub const COMPANIES: &str = "companies";
pub const BDTOPO: &str = "bdtopo";
pub const STREET_WORKS: &str = "street_works";

/// Routes that own a rate limiter.
pub const GATED_ROUTES: [&str; 6] = [
    SUBMISSIONS,
    USRN_LOOKUP,
    GEOCODE,
    COMPANIES,
    BDTOPO,
    STREET_WORKS,
];

pub fn routes(state: &AppState) -> Router<AppState> {
    let features = &state.config.features;

    Router::new()
        .route(
            "/api/submissions",
            gated(state, SUBMISSIONS, features.submissions, post(submissions::create)),
        )
        .route(
            "/api/usrn-lookup",
            gated(state, USRN_LOOKUP, features.usrn_lookup, post(usrn_lookup::lookup)),
        )
        .route("/api/auth-config", get(auth_config::show))
        .route("/api/geocode", gated(state, GEOCODE, true, get(geocode::reverse)))
        .route(
            "/api/companies",
            gated(state, COMPANIES, true, get(companies::list)),
        )
        .route("/api/bdtopo", gated(state, BDTOPO, true, get(bdtopo::road_sections)))
        .route(
            "/api/french-street-works",
            gated(state, STREET_WORKS, features.street_works, get(street_works::list)),
        )
}

fn gated(
    state: &AppState,
    route: &'static str,
    enabled: bool,
    handler: MethodRouter<AppState>,
) -> MethodRouter<AppState> {
    let gate = Gate::new(
        route,
        enabled,
        state.origins.clone(),
        state.limiters.get(route),
    );
    handler.route_layer(middleware::from_fn_with_state(gate, enforce))
}

/// Shared `?address=` parameter of the address-based routes.
fn required_address(address: Option<String>) -> Result<String, ApiError> {
    address
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::ValidationFailed("Address parameter is required".to_string()))
}

/// Resolve free text to a BAN identifier, or the matching error.
async fn resolve_address(state: &AppState, address: &str) -> Result<String, ApiError> {
    match state.resolver.resolve(address).await {
        Resolution::Found(id) => Ok(id),
        Resolution::NotFound => Err(ApiError::NoDataFound(
            "Could not find address in BAN database",
        )),
        Resolution::UpstreamError(e) => Err(ApiError::UpstreamUnavailable(e)),
    }
}
