//! HTTP surface: `/`, `/api`, `/api/command` and `/health`.
//!
//! Missing ids are 400 everywhere. Extraction failures are 500 on the page and
//! `/api`, while every failure of `/api/command` is reported as 400.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::command::{CommandDescriptor, generate_command, watch_url};
use crate::extractor::Extractor;
use crate::info::{InfoView, serialize_info};
use crate::page::render_info_page;

pub const MISSING_ID_MESSAGE: &str = "id parameter is required";
const DEFAULT_MEDIA_TYPE: &str = "video";

#[derive(Clone)]
pub struct AppState {
    extractor: Arc<dyn Extractor>,
}

impl AppState {
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self { extractor }
    }

    async fn fetch_view(&self, video_id: &str) -> anyhow::Result<InfoView> {
        let info = self.extractor.extract(&watch_url(video_id)).await?;
        Ok(serialize_info(video_id, &info))
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.message,
        });
        (self.status, Json(body)).into_response()
    }
}

/// Plain-text counterpart of [`ApiError`] for the HTML route.
#[derive(Debug)]
pub struct PageError {
    status: StatusCode,
    message: String,
}

impl PageError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Raw query pairs in request order. Repeated keys resolve to their first
/// occurrence.
#[derive(Debug, Default)]
struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    fn from_query(
        query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    ) -> Result<Self, String> {
        query
            .map(|Query(pairs)| Self(pairs))
            .map_err(|rejection| rejection.body_text())
    }

    fn first(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// The `id` parameter, with an empty value counting as missing.
    fn video_id(&self) -> Option<String> {
        self.first("id")
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api", get(api_info))
        .route("/api/command", get(api_command))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Html<String>, PageError> {
    let params = QueryParams::from_query(query).map_err(PageError::bad_request)?;
    let video_id = params
        .video_id()
        .ok_or_else(|| PageError::bad_request(MISSING_ID_MESSAGE))?;

    let view = state.fetch_view(&video_id).await.map_err(|err| {
        warn!(video_id = %video_id, error = %format!("{err:#}"), "extraction failed");
        PageError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    })?;

    Ok(Html(render_info_page(&view)))
}

async fn api_info(
    State(state): State<AppState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<InfoView>> {
    let params = QueryParams::from_query(query).map_err(ApiError::bad_request)?;
    let video_id = params
        .video_id()
        .ok_or_else(|| ApiError::bad_request(MISSING_ID_MESSAGE))?;

    let view = state.fetch_view(&video_id).await.map_err(|err| {
        warn!(video_id = %video_id, error = %format!("{err:#}"), "extraction failed");
        ApiError::internal(err.to_string())
    })?;

    Ok(Json(view))
}

async fn api_command(
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> ApiResult<Json<CommandDescriptor>> {
    let params = QueryParams::from_query(query).map_err(ApiError::bad_request)?;
    let video_id = params
        .video_id()
        .ok_or_else(|| ApiError::bad_request(MISSING_ID_MESSAGE))?;
    let media_type = params.first("type").unwrap_or(DEFAULT_MEDIA_TYPE);
    let format_id = params.first("format_id");

    let descriptor = generate_command(&video_id, media_type, format_id).map_err(|err| {
        warn!(
            video_id = %video_id,
            format_id = ?format_id,
            error = %err,
            "rejected command request"
        );
        ApiError::bad_request(err.to_string())
    })?;

    Ok(Json(descriptor))
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
