//! Rutas HTTP de la API. Todas las respuestas JSON usan la envoltura
//! `{success, data}` / `{success: false, error}`, salvo `/api/download`,
//! que devuelve el resultado del pipeline de audio sin envolver.

pub mod response;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::audio::AudioService;
use crate::error::SearchError;
use crate::search::{SearchOptions, SearchService};
use response::{error_response, success_response};

/// Estado compartido entre handlers
#[derive(Clone)]
pub struct AppState {
    pub search: SearchService,
    pub audio: AudioService,
}

/// Construye el router de la API
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", get(search_videos))
        .route("/api/cache/clear", post(clear_cache))
        .route("/api/cache/stats", get(cache_stats))
        .route("/api/download", post(download_audio))
        .route("/api/health", get(health))
        .with_state(state)
}

/// Parámetros de `/api/search`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
    q: Option<String>,
    limit: Option<usize>,
    min_duration: Option<u64>,
    max_duration: Option<u64>,
    filter_live: Option<bool>,
    include_metadata: Option<bool>,
}

async fn search_videos(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> (StatusCode, Json<Value>) {
    let Some(query) = params.q else {
        return error_response("Missing search query", StatusCode::BAD_REQUEST);
    };

    info!("📥 Procesando búsqueda: {}", query);

    let options = SearchOptions {
        // La ruta usa su propio default de límite, más generoso que el del
        // orquestador
        limit: Some(params.limit.unwrap_or(20)),
        min_duration: params.min_duration,
        max_duration: params.max_duration,
        filter_live: params.filter_live,
        include_metadata: params.include_metadata,
        ..SearchOptions::default()
    };

    match state.search.search(&query, options).await {
        Ok(results) if results.success => success_response(results),
        Ok(results) => {
            let message = results
                .error
                .unwrap_or_else(|| "Unknown search error".to_string());
            warn!("⚠️ Búsqueda fallida: {}", message);
            error_response(message, StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(error @ SearchError::InvalidQuery) => {
            error_response(error.to_string(), StatusCode::BAD_REQUEST)
        }
    }
}

async fn clear_cache(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    state.search.cache().clear();
    info!("🧹 Cache de búsqueda vaciado");

    success_response(json!({ "success": true, "message": "Cache cleared" }))
}

async fn cache_stats(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let stats = state.search.cache().stats();
    success_response(json!({ "cache": stats }))
}

/// Cuerpo de `/api/download`
#[derive(Debug, Deserialize)]
struct DownloadRequest {
    url: Option<String>,
}

async fn download_audio(
    State(state): State<AppState>,
    payload: Result<Json<DownloadRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let Ok(Json(request)) = payload else {
        return error_response("Invalid JSON data", StatusCode::BAD_REQUEST);
    };

    let Some(url) = request.url else {
        return error_response("No URL provided", StatusCode::BAD_REQUEST);
    };

    match state.audio.process(&url).await {
        Ok(public_url) => (
            StatusCode::OK,
            Json(json!({ "success": true, "url": public_url })),
        ),
        Err(error) => {
            error!("❌ Procesamiento de audio falló: {:#}", error);
            (
                StatusCode::OK,
                Json(json!({ "success": false, "error": error.to_string() })),
            )
        }
    }
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let yt_dlp = probe_status(probe_tool("yt-dlp", "--version").await);
    let ffmpeg = probe_status(probe_tool("ffmpeg", "-version").await);
    let uploader = if state.audio.uploader_configured() {
        "ok"
    } else {
        "not configured"
    };

    success_response(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "services": {
            "yt-dlp": yt_dlp,
            "ffmpeg": ffmpeg,
            "uploader": uploader,
        }
    }))
}

fn probe_status(available: bool) -> &'static str {
    if available {
        "ok"
    } else {
        "error"
    }
}

async fn probe_tool(binary: &str, arg: &str) -> bool {
    tokio::process::Command::new(binary)
        .arg(arg)
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_search_params_accept_camel_case() {
        let params: SearchParams = serde_json::from_value(json!({
            "q": "coldplay",
            "limit": 5,
            "minDuration": 60,
            "maxDuration": 300,
            "filterLive": false,
            "includeMetadata": true
        }))
        .unwrap();

        assert_eq!(params.q.as_deref(), Some("coldplay"));
        assert_eq!(params.limit, Some(5));
        assert_eq!(params.min_duration, Some(60));
        assert_eq!(params.max_duration, Some(300));
        assert_eq!(params.filter_live, Some(false));
        assert_eq!(params.include_metadata, Some(true));
    }

    #[test]
    fn test_search_params_are_all_optional() {
        let params: SearchParams = serde_json::from_value(json!({})).unwrap();
        assert!(params.q.is_none());
        assert!(params.limit.is_none());
    }
}
