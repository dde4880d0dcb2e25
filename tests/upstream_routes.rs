//! Routes backed by third-party APIs, run against mock upstreams.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get as route_get,
    Json, Router,
};
use datawatchman::config::AppConfig;
use serde_json::{json, Value};

mod common;
use common::{body_json, call, get, spawn_upstream, state, test_config};

type Params = Query<HashMap<String, String>>;

const ARMORIQUE: &str = "7 Rue de l'Armorique, 75015 Paris";
const ARMORIQUE_STREET: &str = "Rue de l'Armorique, 75015 Paris";

/// BAN mock: answers only for known queries and records what it was asked.
async fn ban(known: Vec<(&'static str, &'static str)>) -> (String, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let router = Router::new().route(
        "/search/",
        route_get(move |Query(params): Params| {
            let known = known.clone();
            let log = log.clone();
            async move {
                let q = params.get("q").cloned().unwrap_or_default();
                log.lock().unwrap().push(q.clone());
                let features: Vec<Value> = known
                    .iter()
                    .filter(|(query, _)| *query == q)
                    .map(|(_, id)| json!({ "type": "Feature", "properties": { "id": id, "label": q } }))
                    .collect();
                Json(json!({ "type": "FeatureCollection", "features": features }))
            }
        }),
    );
    (spawn_upstream(router).await, seen)
}

fn with_ban(mut config: AppConfig, url: &str) -> AppConfig {
    config.upstream.ban_url = url.to_string();
    config
}

#[tokio::test]
async fn companies_use_compact_street_id() {
    let (ban_url, seen) = ban(vec![(ARMORIQUE_STREET, "75115_0418")]).await;

    let insee_router = Router::new().route(
        "/siret",
        route_get(|headers: HeaderMap, Query(params): Params| async move {
            assert_eq!(headers["x-insee-api-key-integration"], "test-key");
            assert_eq!(params["nombre"], "100");
            if !params["q"].starts_with("identifiantAdresseEtablissement:751150418_B AND ") {
                return StatusCode::NOT_FOUND.into_response();
            }
            Json(json!({
                "header": { "total": 1 },
                "etablissements": [{
                    "siret": "12345678900011",
                    "dateCreationEtablissement": "2019-09-01",
                    "uniteLegale": {
                        "denominationUniteLegale": "BOULANGERIE ARMORIQUE",
                        "activitePrincipaleUniteLegale": "10.71C"
                    },
                    "adresseEtablissement": {
                        "numeroVoieEtablissement": "7",
                        "typeVoieEtablissement": "RUE",
                        "libelleVoieEtablissement": "DE L ARMORIQUE",
                        "codePostalEtablissement": "75015",
                        "libelleCommuneEtablissement": "PARIS 15"
                    }
                }]
            }))
            .into_response()
        }),
    );
    let insee_url = spawn_upstream(insee_router).await;

    let mut config = with_ban(test_config(), &ban_url);
    config.upstream.insee_url = insee_url;
    config.upstream.insee_api_key = Some("test-key".into());
    let state = state(config);

    let response = call(
        &state,
        get("/api/companies?address=7%20Rue%20de%20l%27Armorique%2C%2075015%20Paris"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 1);
    assert_eq!(body["searchedAddressId"], "751150418");
    assert_eq!(
        body["companies"][0],
        json!({
            "siret": "12345678900011",
            "nom": "BOULANGERIE ARMORIQUE",
            "adresse": "7 RUE DE L ARMORIQUE",
            "codePostal": "75015",
            "ville": "PARIS 15",
            "activite": "10.71C",
            "dateCreation": "2019-09-01"
        })
    );
    assert_eq!(*seen.lock().unwrap(), vec![ARMORIQUE_STREET.to_string()]);
}

#[tokio::test]
async fn companies_not_found_at_insee_is_an_empty_success() {
    let (ban_url, _) = ban(vec![(ARMORIQUE_STREET, "75115_0418")]).await;
    let insee_url = spawn_upstream(
        Router::new().route("/siret", route_get(|| async { StatusCode::NOT_FOUND })),
    )
    .await;

    let mut config = with_ban(test_config(), &ban_url);
    config.upstream.insee_url = insee_url;
    config.upstream.insee_api_key = Some("test-key".into());
    let state = state(config);

    let response = call(&state, get("/api/companies?address=7%20Rue%20de%20l%27Armorique%2C%2075015%20Paris")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "success": true,
            "total": 0,
            "companies": [],
            "message": "No companies found on this street",
            "searchedAddressId": "751150418"
        })
    );
}

#[tokio::test]
async fn companies_without_api_key_skip_every_upstream() {
    let (ban_url, seen) = ban(vec![]).await;
    let state = state(with_ban(test_config(), &ban_url));

    let response = call(&state, get("/api/companies?address=Rue%20de%20Rivoli")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 0);
    assert_eq!(
        body["message"],
        "INSEE API key not configured - returning empty results"
    );
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unresolvable_address_is_not_found_after_one_fallback() {
    let (ban_url, seen) = ban(vec![]).await;
    let state = state(with_ban(test_config(), &ban_url));

    let response = call(&state, get("/api/bdtopo?address=12%20Nowhere%20Lane%2C%2099999%20Nulle-part")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await["error"],
        "Could not find address in BAN database"
    );
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            "Nowhere Lane, 99999 Nulle-part".to_string(),
            "12 Nowhere Lane, 99999 Nulle-part".to_string()
        ]
    );
}

#[tokio::test]
async fn bdtopo_falls_back_to_full_text_and_trims_id() {
    let (ban_url, seen) = ban(vec![(ARMORIQUE, "75115_0418_00007")]).await;

    let filters = Arc::new(Mutex::new(Vec::new()));
    let log = filters.clone();
    let wfs = Router::new().route(
        "/wfs/ows",
        route_get(move |Query(params): Params| {
            let log = log.clone();
            async move {
                assert_eq!(params["TYPENAMES"], "BDTOPO_V3:troncon_de_route");
                log.lock().unwrap().push(params["CQL_FILTER"].clone());
                Json(json!({
                    "type": "FeatureCollection",
                    "features": [{ "type": "Feature", "id": "troncon_de_route.1" }],
                    "numberReturned": 1
                }))
            }
        }),
    );
    let mut config = with_ban(test_config(), &ban_url);
    config.upstream.geoplateforme_url = spawn_upstream(wfs).await;
    let state = state(config);

    let response = call(
        &state,
        get("/api/bdtopo?address=7%20Rue%20de%20l%27Armorique%2C%2075015%20Paris&side=droite"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["banId"], "75115_0418");
    assert_eq!(body["totalFeatures"], 1);
    assert_eq!(body["features"][0]["id"], "troncon_de_route.1");
    assert_eq!(seen.lock().unwrap().len(), 2);
    assert_eq!(
        *filters.lock().unwrap(),
        vec!["identifiant_voie_ban_droite='75115_0418'".to_string()]
    );
}

#[tokio::test]
async fn bdtopo_rejects_unknown_side() {
    let state = state(test_config());
    let response = call(&state, get("/api/bdtopo?address=Rue%20X&side=milieu")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upstream_failure_is_a_generic_500() {
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        "/search/",
        route_get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (StatusCode::BAD_GATEWAY, "upstream exploded")
            }
        }),
    );
    let state = state(with_ban(test_config(), &spawn_upstream(router).await));

    let response = call(&state, get("/api/bdtopo?address=7%20Rue%20X%2C%2075015%20Paris")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "Request Failed");
    // No fallback after a failure.
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreachable_upstream_is_a_500() {
    let state = state(test_config());
    let response = call(&state, get("/api/geocode?lat=48.8414&lon=2.2943")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn geocode_returns_label() {
    let router = Router::new().route(
        "/geocodage/reverse",
        route_get(|Query(params): Params| async move {
            let features = if params["lat"] == "48.8414" {
                json!([{ "properties": { "label": "7 Rue de l'Armorique 75015 Paris" } }])
            } else {
                json!([])
            };
            Json(json!({ "type": "FeatureCollection", "features": features }))
        }),
    );
    let mut config = test_config();
    config.upstream.geoplateforme_url = spawn_upstream(router).await;
    let state = state(config);

    let response = call(&state, get("/api/geocode?lat=48.8414&lon=2.2943")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "success": true, "address": "7 Rue de l'Armorique 75015 Paris" })
    );

    let response = call(&state, get("/api/geocode?lat=10&lon=10")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn street_works_forward_filters_and_reshape_records() {
    let router = Router::new().route(
        "/records",
        route_get(|Query(params): Params| async move {
            assert_eq!(params["limit"], "10");
            assert_eq!(params["where"], "cp_arrondissement=\"75015\"");
            Json(json!({
                "total_count": 57,
                "results": [{
                    "num_emprise": "EMP-1",
                    "cp_arrondissement": "75015",
                    "date_debut": "2025-05-01",
                    "date_fin": "2025-07-31",
                    "chantier_categorie": "Réseaux",
                    "moa_principal": "Eau de Paris",
                    "surface": 12.5,
                    "chantier_synthese": "Renouvellement de branchement",
                    "localisation_detail": ["7 rue de l'Armorique"],
                    "geo_point_2d": { "lon": 2.3131, "lat": 48.8402 }
                }]
            }))
        }),
    );
    let mut config = test_config();
    config.upstream.paris_works_url = format!("{}/records", spawn_upstream(router).await);
    let state = state(config);

    let response = call(&state, get("/api/french-street-works?limit=10&arrondissement=75015")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["totalCount"], 57);
    assert_eq!(body["count"], 1);
    let site = &body["data"][0];
    assert_eq!(site["id"], "EMP-1");
    assert_eq!(site["startDate"], "2025-05-01");
    assert_eq!(site["contractor"], "Eau de Paris");
    assert_eq!(site["area"], 12.5);
    assert_eq!(site["parkingImpact"], Value::Null);
    assert_eq!(site["coordinates"]["lat"], 48.8402);
}

#[tokio::test]
async fn street_works_reject_bad_filters() {
    let state = state(test_config());
    for query in ["limit=500", "arrondissement=abc", "dateDebut=2025-13-01"] {
        let response = call(&state, get(&format!("/api/french-street-works?{query}"))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{query}");
    }
}
