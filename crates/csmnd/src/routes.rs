//! HTTP surface of the daemon
//!
//! - `GET  /api/config`: full configuration snapshot
//! - `POST /api/config`: form fields `key`/`val`, answered with `{code, msg}`
//!
//! Handlers only translate between HTTP and [`ConfigService`]; all decoding
//! and store logic lives in csmn-core.

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use csmn_core::{ConfigService, ConfigSnapshot, Error, Reply};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: ConfigService,
}

/// Body of a config change request
#[derive(Debug, Default, Deserialize)]
pub struct SetConfigForm {
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    val: Option<String>,
}

/// Build the router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/config", get(get_config).post(set_config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn get_config(
    State(state): State<AppState>,
) -> Result<Json<ConfigSnapshot>, (StatusCode, Json<Reply>)> {
    match state.service.snapshot().await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(e) => {
            error!("Failed to read config: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Reply::new(e.reply_code(), format!("failed to get config: {}", e))),
            ))
        }
    }
}

async fn set_config(State(state): State<AppState>, Form(form): Form<SetConfigForm>) -> Json<Reply> {
    let (Some(key), Some(val)) = (form.key, form.val) else {
        let e = Error::validation("both 'key' and 'val' form fields are required");
        warn!("rejected config request: {}", e);
        return Json(Reply::new(-1, format!("failed to set config: {}", e)));
    };
    Json(state.service.handle(&key, &val).await)
}
