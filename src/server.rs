// HTTP boundary over the core service operations.
//
// A thin layer: extract inputs, call the service, map the error taxonomy
// to status codes. Response shapes match what the mobile client consumes
// (team + event, enriched fixture cards, recommendations + next_gw).

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::error::CoreError;
use crate::service::{self, AppState, RecommendationParams};
use crate::squad::enrich::EnrichedFixture;

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    error: String,
}

#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    #[cfg(test)]
    pub(crate) fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        // Keep transport failures, data-consistency faults, and garbage
        // advisory output distinguishable in the logs even though most of
        // them collapse to a generic 500 for the caller.
        match &err {
            CoreError::InvalidRequest(_) => {}
            e if e.is_data_fault() => error!(%err, "upstream data inconsistent"),
            CoreError::MalformedAdvisoryResponse(_) => {
                error!(%err, "advisory service returned garbage")
            }
            _ => error!(%err, "request failed"),
        }

        let (status, message) = match &err {
            CoreError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CoreError::AdvisoryRateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "advisory service rate limited; try again later".to_string(),
            ),
            CoreError::MalformedAdvisoryResponse(_) | CoreError::AdvisoryUnavailable(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "AI analysis failed".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed to fetch and process FPL data".to_string(),
            ),
        };
        ApiError { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ApiErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TeamQuery {
    event: Option<u32>,
}

async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Query(query): Query<TeamQuery>,
) -> Result<Json<service::EnrichedTeam>, ApiError> {
    let team = service::enriched_team(&state, id, query.event).await?;
    Ok(Json(team))
}

async fn get_fixtures(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EnrichedFixture>>, ApiError> {
    let fixtures = service::enriched_fixtures(&state).await?;
    Ok(Json(fixtures))
}

#[derive(Debug, Deserialize)]
struct NextWeekBody {
    fpl_id: Option<u64>,
    last_event: Option<u32>,
    bank: Option<i64>,
    free_transfers: Option<u32>,
    notes: Option<String>,
}

async fn post_next_week(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NextWeekBody>,
) -> Result<Json<service::RecommendationOutcome>, ApiError> {
    let (Some(fpl_id), Some(last_event)) = (body.fpl_id, body.last_event) else {
        return Err(ApiError::from(CoreError::InvalidRequest(
            "fpl_id and last_event are required".to_string(),
        )));
    };

    let outcome = service::recommendation(
        &state,
        RecommendationParams {
            manager_id: fpl_id,
            last_event,
            bank: body.bank,
            free_transfers: body.free_transfers,
            notes: body.notes,
        },
    )
    .await?;
    Ok(Json(outcome))
}

// ---------------------------------------------------------------------------
// Router and serve loop
// ---------------------------------------------------------------------------

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/fpl/team/:id", get(get_team))
        .route("/api/fpl/fixtures", get(get_fixtures))
        .route("/api/ai/next-week", post(post_next_week))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {addr}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
