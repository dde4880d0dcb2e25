//! Third-party open-data APIs.
//!
//! # Data Flow
//! ```text
//! handler
//!     → address.rs (BAN search, street-only query with full-text fallback)
//!     → geoplateforme.rs (reverse geocoding, BD TOPO road sections)
//!     → insee.rs (Sirene establishments at an address)
//!     → paris.rs (street-works records)
//! ```
//!
//! # Design Decisions
//! - One shared `reqwest::Client` carrying the configured timeout
//! - Transport failures, non-2xx statuses and undecodable bodies are all
//!   `UpstreamError`; "no result" is never an error at this layer
//! - Responses are reshaped by the caller, not here

pub mod address;
pub mod geoplateforme;
pub mod insee;
pub mod paris;

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::observability::metrics;

pub use address::{AddressResolver, AddressSearch, BanClient, Resolution};
pub use geoplateforme::{GeoplateformeClient, RoadSide};
pub use insee::InseeClient;
pub use paris::ParisWorksClient;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{upstream} request failed: {source}")]
    Transport {
        upstream: &'static str,
        source: reqwest::Error,
    },

    #[error("{upstream} returned status {status}")]
    Status { upstream: &'static str, status: u16 },

    #[error("{upstream} returned an unreadable body: {message}")]
    Decode {
        upstream: &'static str,
        message: String,
    },
}

/// Build the outbound client shared by every upstream.
pub fn build_client(config: &UpstreamConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(concat!("datawatchman/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Send a request, mapping transport failures.
pub(crate) async fn send(
    upstream: &'static str,
    request: RequestBuilder,
) -> Result<Response, UpstreamError> {
    match request.header("accept", "application/json").send().await {
        Ok(response) => Ok(response),
        Err(source) => {
            tracing::warn!(upstream, error = %source, "Upstream request failed");
            metrics::record_upstream(upstream, "transport_error");
            Err(UpstreamError::Transport { upstream, source })
        }
    }
}

/// Decode a successful response body, rejecting non-2xx statuses.
pub(crate) async fn read_json<T: DeserializeOwned>(
    upstream: &'static str,
    response: Response,
) -> Result<T, UpstreamError> {
    let status = response.status();
    if !status.is_success() {
        tracing::warn!(upstream, status = status.as_u16(), "Upstream returned an error status");
        metrics::record_upstream(upstream, "bad_status");
        return Err(UpstreamError::Status {
            upstream,
            status: status.as_u16(),
        });
    }

    match response.json::<T>().await {
        Ok(body) => {
            metrics::record_upstream(upstream, "ok");
            Ok(body)
        }
        Err(e) => {
            tracing::warn!(upstream, error = %e, "Upstream body could not be decoded");
            metrics::record_upstream(upstream, "decode_error");
            Err(UpstreamError::Decode {
                upstream,
                message: e.to_string(),
            })
        }
    }
}

/// `send` then `read_json`.
pub(crate) async fn get_json<T: DeserializeOwned>(
    upstream: &'static str,
    request: RequestBuilder,
) -> Result<T, UpstreamError> {
    let response = send(upstream, request).await?;
    read_json(upstream, response).await
}

/// Strip a trailing slash so paths can be appended with `format!`.
pub(crate) fn base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
