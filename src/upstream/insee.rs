//! INSEE Sirene: active employer establishments registered at an address.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{base, read_json, send, UpstreamError};

const UPSTREAM: &str = "insee";
const API_KEY_HEADER: &str = "X-INSEE-Api-Key-Integration";
const PAGE_SIZE: &str = "100";

#[derive(Debug, Default, Deserialize)]
pub struct SiretResponse {
    #[serde(default)]
    pub header: SiretHeader,
    #[serde(default)]
    pub etablissements: Vec<Establishment>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SiretHeader {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Establishment {
    pub siret: String,
    pub date_creation_etablissement: Option<String>,
    pub unite_legale: LegalUnit,
    pub adresse_etablissement: EstablishmentAddress,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LegalUnit {
    pub denomination_unite_legale: Option<String>,
    pub nom_unite_legale: Option<String>,
    pub prenom1_unite_legale: Option<String>,
    pub activite_principale_unite_legale: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstablishmentAddress {
    pub numero_voie_etablissement: Option<String>,
    pub type_voie_etablissement: Option<String>,
    pub libelle_voie_etablissement: Option<String>,
    pub code_postal_etablissement: Option<String>,
    pub libelle_commune_etablissement: Option<String>,
}

/// Flattened establishment returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub siret: String,
    pub nom: String,
    pub adresse: String,
    pub code_postal: String,
    pub ville: String,
    pub activite: String,
    pub date_creation: Option<String>,
}

impl From<Establishment> for Company {
    fn from(e: Establishment) -> Self {
        let unit = e.unite_legale;
        let nom = match unit.denomination_unite_legale.filter(|d| !d.is_empty()) {
            Some(name) => name,
            None => format!(
                "{} {}",
                unit.nom_unite_legale.unwrap_or_default(),
                unit.prenom1_unite_legale.unwrap_or_default()
            )
            .trim()
            .to_string(),
        };

        let address = e.adresse_etablissement;
        let adresse = [
            address.numero_voie_etablissement,
            address.type_voie_etablissement,
            address.libelle_voie_etablissement,
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        Company {
            siret: e.siret,
            nom,
            adresse,
            code_postal: address.code_postal_etablissement.unwrap_or_default(),
            ville: address.libelle_commune_etablissement.unwrap_or_default(),
            activite: unit.activite_principale_unite_legale.unwrap_or_default(),
            date_creation: e.date_creation_etablissement,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InseeClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl InseeClient {
    pub fn new(http: Client, base_url: &str, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: base(base_url),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Establishments at a compact (underscore-free) BAN address identifier.
    ///
    /// `Ok(None)` when Sirene answers 404, which it does for addresses with no
    /// matching establishment. Without an API key this is also `Ok(None)`.
    pub async fn establishments_at(
        &self,
        address_id: &str,
    ) -> Result<Option<SiretResponse>, UpstreamError> {
        let Some(api_key) = &self.api_key else {
            return Ok(None);
        };

        let request = self
            .http
            .get(format!("{}/siret", self.base_url))
            .header(API_KEY_HEADER, api_key)
            .query(&[("q", sirene_query(address_id).as_str()), ("nombre", PAGE_SIZE)]);

        let response = send(UPSTREAM, request).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        read_json(UPSTREAM, response).await.map(Some)
    }
}

/// Active employer establishments at the address.
pub fn sirene_query(address_id: &str) -> String {
    format!(
        "identifiantAdresseEtablissement:{address_id}_B AND \
         periode(etatAdministratifEtablissement:A AND caractereEmployeurEtablissement: O)"
    )
}
