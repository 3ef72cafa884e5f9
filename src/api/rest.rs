use crate::config::ApiConfig;
use crate::dashboard::partition::{partition, IncidentSummary};
use crate::dashboard::resolve::{IncidentStore, ResolutionCoordinator, ResolveOutcome};
use crate::dashboard::timeline::{now_marker, project_day, CameraLane};
use crate::db::models::{Camera, IncidentView};
use crate::db::repositories::{CamerasRepository, IncidentsRepository, SqlIncidentStore};
use crate::error::Error;
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use log::info;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: Arc<PgPool>,
    pub store: SqlIncidentStore,
    pub session: Arc<Mutex<ResolutionCoordinator>>,
    pub incident_limit: i64,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
    pub status: u16,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::NotFound(_) => ApiError {
                message: err.to_string(),
                status: StatusCode::NOT_FOUND.as_u16(),
            },
            Error::Config(_) | Error::Api(_) => ApiError {
                message: err.to_string(),
                status: StatusCode::BAD_REQUEST.as_u16(),
            },
            Error::TransientIo(_) => ApiError {
                message: err.to_string(),
                status: StatusCode::SERVICE_UNAVAILABLE.as_u16(),
            },
            _ => ApiError {
                message: err.to_string(),
                status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            },
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(err) = err.downcast_ref::<Error>() {
            return err.clone().into();
        }

        ApiError {
            message: err.to_string(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        }
    }
}

/// Implement IntoResponse for ApiError
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = Json(self);
        (status, body).into_response()
    }
}

pub struct RestApi {
    config: ApiConfig,
    state: AppState,
}

impl RestApi {
    pub fn new(
        config: &ApiConfig,
        db_pool: Arc<PgPool>,
        store: SqlIncidentStore,
        session: Arc<Mutex<ResolutionCoordinator>>,
        incident_limit: i64,
    ) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            state: AppState {
                db_pool,
                store,
                session,
                incident_limit,
            },
        })
    }

    pub async fn run(&self) -> Result<()> {
        // Permissive CORS so the dashboard frontend can live anywhere
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = Router::new()
            .route("/api/health", get(health))
            // Store routes
            .route("/api/cameras", get(get_cameras))
            .route("/api/incidents", get(get_incidents))
            .route("/api/incidents/:id", get(get_incident))
            .route("/api/incidents/:id/resolve", patch(resolve_incident))
            // Timeline projection
            .route("/api/timeline", get(get_timeline))
            // Operator session
            .route("/api/dashboard", get(get_dashboard))
            .route("/api/dashboard/refresh", post(refresh_dashboard))
            .route("/api/dashboard/select/:id", post(select_incident))
            .route("/api/dashboard/resolve/:id", patch(resolve_selected))
            .with_state(self.state.clone())
            .layer(cors);

        let addr = self.config.address.clone() + ":" + &self.config.port.to_string();
        let addr: SocketAddr = addr.parse()?;

        info!("API server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;

        axum::Server::from_tcp(listener.into_std()?)?
            .serve(app.into_make_service())
            .await?;

        Ok(())
    }
}

async fn health(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let ok = sqlx::query("SELECT 1")
        .execute(&*state.db_pool)
        .await
        .is_ok();
    Ok(Json(serde_json::json!({ "database": ok })))
}

async fn get_cameras(State(state): State<AppState>) -> ApiResult<Json<Vec<Camera>>> {
    let repo = CamerasRepository::new(Arc::clone(&state.db_pool));
    let cameras = repo.get_all().await?;
    Ok(Json(cameras))
}

#[derive(Debug, Deserialize)]
struct IncidentListParams {
    resolved: Option<bool>,
}

async fn get_incidents(
    State(state): State<AppState>,
    Query(params): Query<IncidentListParams>,
) -> ApiResult<Json<Vec<IncidentView>>> {
    let repo = IncidentsRepository::new(Arc::clone(&state.db_pool));
    let incidents = repo.get_all(params.resolved, state.incident_limit).await?;
    Ok(Json(incidents))
}

async fn get_incident(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<IncidentView>> {
    let repo = IncidentsRepository::new(Arc::clone(&state.db_pool));
    let incident = repo.get_by_id(id).await?.ok_or_else(|| ApiError {
        message: format!("Incident not found: {}", id),
        status: StatusCode::NOT_FOUND.as_u16(),
    })?;
    Ok(Json(incident))
}

async fn resolve_incident(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<IncidentView>> {
    let repo = IncidentsRepository::new(Arc::clone(&state.db_pool));
    let updated = repo.toggle_resolved(id).await?;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
struct TimelineParams {
    date: Option<NaiveDate>,
}

/// Timeline projection for one day: positioned lanes per camera plus the
/// headline counts over the full incident list
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TimelineResponse {
    date: NaiveDate,
    now_marker: f64,
    lanes: Vec<CameraLane>,
    summary: IncidentSummary,
}

async fn get_timeline(
    State(state): State<AppState>,
    Query(params): Query<TimelineParams>,
) -> ApiResult<Json<TimelineResponse>> {
    let now = Local::now().naive_local();
    let date = params.date.unwrap_or_else(|| now.date());

    let cameras = state.store.list_cameras().await?;
    let incidents = state.store.list_incidents(None).await?;

    let response = TimelineResponse {
        date,
        now_marker: now_marker(now),
        lanes: project_day(date, &cameras, &incidents),
        summary: partition(&incidents).summary(),
    };

    Ok(Json(response))
}

/// Snapshot of the operator's view state
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardView {
    incidents: Vec<IncidentView>,
    selected_id: Option<i64>,
    in_flight: Vec<i64>,
    summary: IncidentSummary,
}

impl DashboardView {
    fn snapshot(session: &ResolutionCoordinator) -> Self {
        Self {
            incidents: session.incidents().to_vec(),
            selected_id: session.selected(),
            in_flight: session.in_flight_ids(),
            summary: partition(session.incidents()).summary(),
        }
    }
}

async fn get_dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardView>> {
    let session = state.session.lock().await;
    Ok(Json(DashboardView::snapshot(&session)))
}

async fn refresh_dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardView>> {
    let incidents = state.store.list_incidents(None).await?;
    let mut session = state.session.lock().await;
    session.load(incidents);
    Ok(Json(DashboardView::snapshot(&session)))
}

async fn select_incident(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DashboardView>> {
    let mut session = state.session.lock().await;
    if !session.select(id) {
        return Err(Error::NotFound(format!("Incident not found: {}", id)).into());
    }
    Ok(Json(DashboardView::snapshot(&session)))
}

/// Resolve through the operator session: dedup guard first, then the store
/// round trip with the session lock released, then reconciliation.
async fn resolve_selected(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DashboardView>> {
    {
        let mut session = state.session.lock().await;
        if !session.begin_resolve(id) {
            return Err(ApiError {
                message: format!("Resolve already in flight for incident {}", id),
                status: StatusCode::CONFLICT.as_u16(),
            });
        }
    }

    let result = state.store.resolve_incident(id).await;

    let mut session = state.session.lock().await;
    match session.complete_resolve(id, result) {
        ResolveOutcome::Applied(_) => Ok(Json(DashboardView::snapshot(&session))),
        ResolveOutcome::Duplicate => Err(ApiError {
            message: format!("Resolve already in flight for incident {}", id),
            status: StatusCode::CONFLICT.as_u16(),
        }),
        ResolveOutcome::Failed(message) => Err(ApiError {
            message,
            status: StatusCode::SERVICE_UNAVAILABLE.as_u16(),
        }),
    }
}
