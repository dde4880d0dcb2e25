//! Address resolution against the BAN (Base Adresse Nationale) search API.
//!
//! House-number level matches are unreliable for joins against street-level
//! datasets, so the resolver first searches for the street alone and only
//! falls back to the full text when that finds nothing.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use super::{base, get_json, UpstreamError};

const UPSTREAM: &str = "ban";

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\s+").expect("valid house number regex"));

static POSTCODE_SPLIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+\s+)?(.+?\s+)([0-9]{5}\s+.+)$").expect("valid postcode regex")
});

/// Outcome of [`AddressResolver::resolve`].
#[derive(Debug)]
pub enum Resolution {
    /// BAN identifier of the best match.
    Found(String),
    /// Both queries returned zero features.
    NotFound,
    /// A query failed at the transport or protocol level.
    UpstreamError(UpstreamError),
}

/// A geocoding search that returns the identifier of its best match.
#[async_trait]
pub trait AddressSearch: Send + Sync {
    async fn first_id(&self, query: &str) -> Result<Option<String>, UpstreamError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
struct FeatureProperties {
    id: String,
}

/// HTTP client for `GET /search/?q=..&limit=1`.
#[derive(Debug, Clone)]
pub struct BanClient {
    http: Client,
    base_url: String,
}

impl BanClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base(base_url),
        }
    }
}

#[async_trait]
impl AddressSearch for BanClient {
    async fn first_id(&self, query: &str) -> Result<Option<String>, UpstreamError> {
        let request = self
            .http
            .get(format!("{}/search/", self.base_url))
            .query(&[("q", query), ("limit", "1")]);
        let body: SearchResponse = get_json(UPSTREAM, request).await?;
        Ok(body.features.into_iter().next().map(|f| f.properties.id))
    }
}

/// Street-first address resolution with a single full-text fallback.
#[derive(Clone)]
pub struct AddressResolver {
    search: Arc<dyn AddressSearch>,
}

impl AddressResolver {
    pub fn new(search: Arc<dyn AddressSearch>) -> Self {
        Self { search }
    }

    pub async fn resolve(&self, full_address: &str) -> Resolution {
        let street = street_only(full_address);

        match self.search.first_id(&street).await {
            Ok(Some(id)) => return Resolution::Found(id),
            Ok(None) => {}
            Err(e) => return Resolution::UpstreamError(e),
        }

        tracing::debug!(query = %street, "Street-only search empty, retrying with full address");
        match self.search.first_id(full_address).await {
            Ok(Some(id)) => Resolution::Found(id),
            Ok(None) => Resolution::NotFound,
            Err(e) => Resolution::UpstreamError(e),
        }
    }
}

/// Drop the house number from an address, keeping the rest.
///
/// `"7 Rue de l'Armorique, 75015 Paris"` → `"Rue de l'Armorique, 75015 Paris"`.
/// Without commas, `"7 Rue de l'Armorique 75015 Paris"` is split on the
/// five-digit postcode instead.
pub fn street_only(full_address: &str) -> String {
    let mut parts = full_address.split(',').map(str::trim);
    let first = parts.next().unwrap_or_default();
    let street = LEADING_NUMBER.replace(first, "").trim().to_string();
    let rest: Vec<&str> = parts.collect();

    if !rest.is_empty() {
        if street.is_empty() {
            return rest.join(", ");
        }
        return format!("{street}, {}", rest.join(", "));
    }

    if let Some(caps) = POSTCODE_SPLIT.captures(full_address) {
        return format!("{} {}", caps[2].trim(), &caps[3]);
    }

    street
}

/// Street-level identifier: the first two `_` segments.
///
/// `75105_9517_00004_b` → `75105_9517`.
pub fn street_level_id(id: &str) -> String {
    id.split('_').take(2).collect::<Vec<_>>().join("_")
}

/// Identifier with every underscore removed, as Sirene indexes it.
pub fn compact_id(id: &str) -> String {
    id.replace('_', "")
}
