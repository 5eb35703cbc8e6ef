//! HTTP API over the catalog service

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chartview_core::{Chart, ChartAnalysis, ManifestResponse, Repo, Template, Values};
use chartview_service::{CatalogError, CatalogService};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

#[derive(Clone)]
struct AppState {
    service: Arc<CatalogService>,
}

/// Failure answered as `{"error": message}`
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn catalog(context: String, err: CatalogError) -> Self {
        let status = match &err {
            CatalogError::ManifestNotFound { .. } | CatalogError::RepositoryNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = format!("{context}: {err}");
        tracing::error!(%status, "{message}");
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Deserialize)]
struct ChartQuery {
    #[serde(rename = "kube-version", default)]
    kube_version: String,
}

#[derive(Debug, Deserialize)]
struct RenderRequest {
    #[serde(default)]
    values: String,
}

pub fn router(service: Arc<CatalogService>) -> Router {
    let api = Router::new()
        .route("/repos", get(get_repos))
        .route("/charts/:repo", get(get_charts))
        .route("/charts/:repo/:chart/:version", get(get_chart))
        .route("/charts/values/:repo/:chart/:version", get(get_values))
        .route("/charts/templates/:repo/:chart/:version", get(get_templates))
        .route(
            "/charts/manifests/render/:repo/:chart/:version",
            post(render_manifests),
        )
        .route(
            "/charts/manifests/:repo/:chart/:version/:hash",
            get(get_manifests),
        )
        .layer(middleware::from_fn(log_requests));

    Router::new()
        .nest("/api/v1", api)
        .layer(middleware::from_fn(cors))
        .with_state(AppState { service })
}

pub async fn serve(listener: TcpListener, service: Arc<CatalogService>) -> std::io::Result<()> {
    axum::serve(listener, router(service)).await
}

/// Permissive CORS; preflight requests never reach a handler
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    let any = HeaderValue::from_static("*");
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, any.clone());
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, any.clone());
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, any);
    response
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;
    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "incoming request"
    );
    response
}

async fn get_repos(State(state): State<AppState>) -> ApiResult<Json<Vec<Repo>>> {
    state
        .service
        .list_repos()
        .await
        .map(Json)
        .map_err(|e| ApiError::catalog("cannot get repos".to_string(), e))
}

async fn get_charts(
    State(state): State<AppState>,
    Path(repo): Path<String>,
) -> ApiResult<Json<Vec<Chart>>> {
    state
        .service
        .list_charts(&repo)
        .await
        .map(Json)
        .map_err(|e| ApiError::catalog(format!("cannot get charts from repo {repo}"), e))
}

async fn get_chart(
    State(state): State<AppState>,
    Path((repo, chart, version)): Path<(String, String, String)>,
    Query(query): Query<ChartQuery>,
) -> ApiResult<Json<ChartAnalysis>> {
    state
        .service
        .get_chart_analysis(&repo, &chart, &version, &query.kube_version)
        .await
        .map(Json)
        .map_err(|e| ApiError::catalog(format!("cannot get chart {repo}/{chart}:{version}"), e))
}

async fn get_values(
    State(state): State<AppState>,
    Path((repo, chart, version)): Path<(String, String, String)>,
) -> ApiResult<Json<Values>> {
    state
        .service
        .get_values(&repo, &chart, &version)
        .await
        .map(Json)
        .map_err(|e| ApiError::catalog(format!("cannot get values of {repo}/{chart}:{version}"), e))
}

async fn get_templates(
    State(state): State<AppState>,
    Path((repo, chart, version)): Path<(String, String, String)>,
) -> ApiResult<Json<Vec<Template>>> {
    state
        .service
        .get_templates(&repo, &chart, &version)
        .await
        .map(Json)
        .map_err(|e| {
            ApiError::catalog(format!("cannot get templates of {repo}/{chart}:{version}"), e)
        })
}

async fn render_manifests(
    State(state): State<AppState>,
    Path((repo, chart, version)): Path<(String, String, String)>,
    body: String,
) -> ApiResult<Json<ManifestResponse>> {
    let request: RenderRequest = serde_json::from_str(&body).map_err(|e| ApiError {
        status: StatusCode::BAD_REQUEST,
        message: format!("cannot decode request body: {e}"),
    })?;

    state
        .service
        .render(&repo, &chart, &version, &request.values)
        .await
        .map(Json)
        .map_err(|e| ApiError::catalog("cannot render manifest".to_string(), e))
}

async fn get_manifests(
    State(state): State<AppState>,
    Path((repo, chart, version, hash)): Path<(String, String, String, String)>,
) -> ApiResult<Response> {
    let text = state
        .service
        .get_rendered_text(&repo, &chart, &version, &hash)
        .await
        .map_err(|e| ApiError::catalog("cannot get manifest".to_string(), e))?;

    Ok(([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], text).into_response())
}
