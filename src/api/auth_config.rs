use axum::{extract::State, Json};
use serde::Serialize;

use crate::http::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    pub require_password: bool,
}

/// Whether the USRN lookup form should ask for a password.
pub async fn show(State(state): State<AppState>) -> Json<AuthConfig> {
    Json(AuthConfig {
        require_password: state.config.usrn.require_password,
    })
}
