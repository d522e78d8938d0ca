// Office Coverage - Web Server
// REST API + HTML dashboard with Axum

use crate::config::DataConfig;
use crate::context::{AppContext, Metrics};
use crate::filter::ViewFilter;
use crate::join::{JoinReport, JoinedRegion};
use crate::render::charts::{distribution, top_bars, Bar, PieSlice};
use crate::render::map::ChoroplethMap;
use crate::render::page::render_dashboard;
use crate::render::palette::table_row_background;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    context: Arc<RwLock<Arc<AppContext>>>,
    data_config: Arc<DataConfig>,
}

impl AppState {
    pub fn new(context: AppContext, data_config: DataConfig) -> Self {
        Self {
            context: Arc::new(RwLock::new(Arc::new(context))),
            data_config: Arc::new(data_config),
        }
    }

    /// Current context; requests never hold the lock while rendering
    fn snapshot(&self) -> Option<Arc<AppContext>> {
        self.context.read().ok().map(|guard| Arc::clone(&*guard))
    }
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            error: Some(message.into()),
        }
    }
}

fn unavailable() -> Response {
    tracing::error!("application context lock poisoned");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::err("Dashboard state unavailable")),
    )
        .into_response()
}

/// Summary response
#[derive(Serialize)]
struct SummaryResponse {
    metrics: Metrics,
    report: JoinReport,
    regions: usize,
    warning: Option<String>,
    fingerprint: Option<String>,
    loaded_at: DateTime<Utc>,
}

/// Region response (geometry left out)
#[derive(Serialize)]
struct RegionResponse {
    name: String,
    normalized_name: String,
    offices: u32,
    background: &'static str,
    has_geometry: bool,
}

impl From<&JoinedRegion> for RegionResponse {
    fn from(region: &JoinedRegion) -> Self {
        Self {
            name: region.name.clone(),
            normalized_name: region.normalized_name.clone(),
            offices: region.count,
            background: table_row_background(region.count),
            has_geometry: region.geometry.is_some(),
        }
    }
}

#[derive(Serialize)]
struct ReloadResponse {
    reloaded: bool,
    warning: Option<String>,
    fingerprint: Option<String>,
}

// ============================================================================
// Query parsing
// ============================================================================

/// Decoded `key=value` pairs; repeated `region` keys are kept
type QueryPairs = Query<Vec<(String, String)>>;

fn render_failed(err: askama::Error) -> Response {
    tracing::error!(error = %err, "template rendering failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::err("Rendering failed")),
    )
        .into_response()
}

// ============================================================================
// Page Handlers
// ============================================================================

/// GET / - Dashboard page
async fn serve_dashboard(State(state): State<AppState>, Query(pairs): QueryPairs) -> Response {
    let Some(context) = state.snapshot() else {
        return unavailable();
    };
    let filter = ViewFilter::from_pairs(pairs);
    tracing::debug!(filter = %filter.describe(), "render dashboard");

    match render_dashboard(&context, &filter) {
        Ok(html) => Html(html).into_response(),
        Err(err) => render_failed(err),
    }
}

/// GET /map.svg - Map only, same query as the dashboard
async fn serve_map(State(state): State<AppState>, Query(pairs): QueryPairs) -> Response {
    let Some(context) = state.snapshot() else {
        return unavailable();
    };
    let filter = ViewFilter::from_pairs(pairs);
    let filtered = filter.apply(&context.regions);

    match ChoroplethMap::new(&context.regions, &filtered, filter.palette).to_svg() {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(err) => render_failed(err),
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/summary - Metrics and join report
async fn get_summary(State(state): State<AppState>) -> Response {
    let Some(context) = state.snapshot() else {
        return unavailable();
    };

    Json(ApiResponse::ok(SummaryResponse {
        metrics: context.metrics(),
        report: context.report.clone(),
        regions: context.regions.len(),
        warning: context.warning.clone(),
        fingerprint: context.fingerprint.clone(),
        loaded_at: context.loaded_at,
    }))
    .into_response()
}

/// GET /api/regions - Joined table
async fn get_regions(State(state): State<AppState>) -> Response {
    let Some(context) = state.snapshot() else {
        return unavailable();
    };
    let regions: Vec<RegionResponse> = context.regions.iter().map(RegionResponse::from).collect();

    Json(ApiResponse::ok(regions)).into_response()
}

/// GET /api/regions/:name - One region by normalized name (Path is already decoded)
async fn get_region(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let Some(context) = state.snapshot() else {
        return unavailable();
    };

    match context.region(&name) {
        Some(region) => Json(ApiResponse::ok(RegionResponse::from(region))).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::err(format!("Unknown region: {}", name))),
        )
            .into_response(),
    }
}

/// GET /api/top - Top departments chart data
async fn get_top(State(state): State<AppState>) -> Response {
    let Some(context) = state.snapshot() else {
        return unavailable();
    };
    let bars: Vec<Bar> = top_bars(&context.regions);

    Json(ApiResponse::ok(bars)).into_response()
}

/// GET /api/distribution - Pie slices
async fn get_distribution(State(state): State<AppState>) -> Response {
    let Some(context) = state.snapshot() else {
        return unavailable();
    };
    let slices: Vec<PieSlice> = distribution(&context.regions);

    Json(ApiResponse::ok(slices)).into_response()
}

/// POST /api/reload - Rebuild the context if the source files changed
async fn reload(State(state): State<AppState>) -> Response {
    let Some(current) = state.snapshot() else {
        return unavailable();
    };

    // Fingerprinting reads both files in full; keep it off the async workers
    let config = Arc::clone(&state.data_config);
    let previous = Arc::clone(&current);
    let outcome = tokio::task::spawn_blocking(move || {
        previous
            .is_stale(&config)
            .then(|| AppContext::load(&config))
    })
    .await;

    let fresh = match outcome {
        Ok(Some(context)) => context,
        Ok(None) => {
            return Json(ApiResponse::ok(ReloadResponse {
                reloaded: false,
                warning: current.warning.clone(),
                fingerprint: current.fingerprint.clone(),
            }))
            .into_response();
        }
        Err(err) => {
            tracing::error!(error = %err, "reload task failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err("Reload failed")),
            )
                .into_response();
        }
    };

    let response = ReloadResponse {
        reloaded: true,
        warning: fresh.warning.clone(),
        fingerprint: fresh.fingerprint.clone(),
    };

    match state.context.write() {
        Ok(mut guard) => *guard = Arc::new(fresh),
        Err(_) => return unavailable(),
    }
    tracing::info!(fingerprint = ?response.fingerprint, "office data reloaded");

    Json(ApiResponse::ok(response)).into_response()
}

// ============================================================================
// Router
// ============================================================================

pub fn app_router(state: AppState) -> Router {
    // Build API routes
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/summary", get(get_summary))
        .route("/regions", get(get_regions))
        .route("/regions/:name", get(get_region))
        .route("/top", get(get_top))
        .route("/distribution", get(get_distribution))
        .route("/reload", post(reload))
        .with_state(state.clone());

    // Build main router
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/map.svg", get(serve_map))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Tests
// ============================================================================
