//! IGN Géoplateforme: reverse geocoding and BD TOPO road sections (WFS).

use std::fmt;
use std::str::FromStr;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::{base, get_json, UpstreamError};

const REVERSE: &str = "geoplateforme_reverse";
const WFS: &str = "bdtopo_wfs";
const ROAD_SECTIONS: &str = "BDTOPO_V3:troncon_de_route";

/// Which side of the road a BAN street identifier is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoadSide {
    #[default]
    Left,
    Right,
}

impl RoadSide {
    fn field(self) -> &'static str {
        match self {
            RoadSide::Left => "identifiant_voie_ban_gauche",
            RoadSide::Right => "identifiant_voie_ban_droite",
        }
    }
}

impl FromStr for RoadSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gauche" | "left" => Ok(RoadSide::Left),
            "droite" | "droit" | "right" => Ok(RoadSide::Right),
            other => Err(format!("Unknown road side: {other}")),
        }
    }
}

impl fmt::Display for RoadSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RoadSide::Left => "gauche",
            RoadSide::Right => "droite",
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    features: Vec<ReverseFeature>,
}

#[derive(Debug, Deserialize)]
struct ReverseFeature {
    #[serde(default)]
    properties: ReverseProperties,
}

#[derive(Debug, Default, Deserialize)]
struct ReverseProperties {
    label: Option<String>,
    name: Option<String>,
}

/// GeoJSON feature collection returned by the WFS.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadSections {
    #[serde(default)]
    pub features: Vec<Value>,
    pub number_returned: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct GeoplateformeClient {
    http: Client,
    base_url: String,
}

impl GeoplateformeClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base(base_url),
        }
    }

    /// Best address label at a point, `None` when nothing is indexed there.
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<String>, UpstreamError> {
        let request = self
            .http
            .get(format!("{}/geocodage/reverse", self.base_url))
            .query(&[
                ("lon", lon.to_string()),
                ("lat", lat.to_string()),
                ("index", "address".to_string()),
                ("limit", "1".to_string()),
            ]);
        let body: ReverseResponse = get_json(REVERSE, request).await?;

        Ok(body.features.into_iter().next().and_then(|f| {
            let ReverseProperties { label, name } = f.properties;
            label.or(name).filter(|s| !s.is_empty())
        }))
    }

    /// Road sections whose BAN street identifier on `side` equals `street_id`.
    ///
    /// `street_id` must already be checked with [`is_street_id`].
    pub async fn road_sections(
        &self,
        street_id: &str,
        side: RoadSide,
    ) -> Result<RoadSections, UpstreamError> {
        let filter = format!("{}='{}'", side.field(), street_id);
        let request = self.http.get(format!("{}/wfs/ows", self.base_url)).query(&[
            ("SERVICE", "WFS"),
            ("VERSION", "2.0.0"),
            ("REQUEST", "GetFeature"),
            ("TYPENAMES", ROAD_SECTIONS),
            ("CQL_FILTER", filter.as_str()),
            ("OUTPUTFORMAT", "application/json"),
        ]);
        get_json(WFS, request).await
    }
}

/// Street identifiers are interpolated into a CQL literal.
pub fn is_street_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
