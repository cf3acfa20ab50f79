//! REST API handlers for allocation plans and operational endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kol_allocator::{
    find_template, Engine, SegmentPlanBuilder, SegmentTemplate, SegmentedAllocationOutcome,
    SingleAllocationOutcome, TEMPLATES,
};
use kol_core::{
    Offer, Platform, PlannerError, SegmentedAllocationRequest, SingleAllocationRequest,
    StaffParams,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, warn};

/// Upper bound on segments per request.
const MAX_SEGMENTS: usize = 32;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
    pub node_id: String,
    pub start_time: Instant,
    /// Largest accepted content units per offer.
    pub max_content_units: u32,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn reject(err: PlannerError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match &err {
        PlannerError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
        PlannerError::UnknownTemplate(_) => (StatusCode::NOT_FOUND, "unknown_template"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "planning_failed"),
    };
    if err.is_client_error() {
        warn!(error = %err, "Plan request rejected");
        metrics::counter!("planner.api.validation_errors").increment(1);
    } else {
        error!(error = %err, "Plan request failed");
        metrics::counter!("planner.api.errors").increment(1);
    }
    let message = if err.is_client_error() {
        err.to_string()
    } else {
        "Internal processing error".to_string()
    };
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message,
        }),
    )
}

fn check_content_units(state: &AppState, units: u32) -> Result<(), PlannerError> {
    if units > state.max_content_units {
        return Err(PlannerError::invalid(format!(
            "content_units_per_offer must be at most {}",
            state.max_content_units
        )));
    }
    Ok(())
}

fn record_outcome(empty: bool) {
    metrics::counter!("planner.api.requests").increment(1);
    if empty {
        metrics::counter!("planner.api.empty_plans").increment(1);
    }
}

/// POST /v1/plan/single: Allocate one budget.
pub async fn plan_single(
    State(state): State<AppState>,
    Json(request): Json<SingleAllocationRequest>,
) -> ApiResult<SingleAllocationOutcome> {
    check_content_units(&state, request.content_units_per_offer).map_err(reject)?;
    let outcome = state.engine.allocate_single(&request).map_err(reject)?;
    record_outcome(outcome.summary.is_empty());
    Ok(Json(outcome))
}

/// POST /v1/plan/segments: Allocate a budget split across explicit segments.
pub async fn plan_segments(
    State(state): State<AppState>,
    Json(request): Json<SegmentedAllocationRequest>,
) -> ApiResult<SegmentedAllocationOutcome> {
    if request.segments.len() > MAX_SEGMENTS {
        return Err(reject(PlannerError::invalid(format!(
            "at most {MAX_SEGMENTS} segments are allowed"
        ))));
    }
    check_content_units(&state, request.content_units_per_offer).map_err(reject)?;
    let outcome = state.engine.allocate_by_segments(&request).map_err(reject)?;
    record_outcome(outcome.summary.is_empty());
    Ok(Json(outcome))
}

/// Body of a template-based plan; the segments come from the template.
#[derive(Debug, Deserialize)]
pub struct TemplatePlanRequest {
    pub total_budget: f64,
    #[serde(default = "Platform::all")]
    pub platforms: BTreeSet<Platform>,
    #[serde(default = "default_content_units")]
    pub content_units_per_offer: u32,
    #[serde(default)]
    pub staff: Option<StaffParams>,
}

fn default_content_units() -> u32 {
    1
}

/// POST /v1/plan/template/:name: Allocate using a named segment template.
pub async fn plan_template(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(body): Json<TemplatePlanRequest>,
) -> ApiResult<SegmentedAllocationOutcome> {
    let template = find_template(&name).map_err(reject)?;
    let segments = SegmentPlanBuilder::from_template(template)
        .build()
        .map_err(reject)?;
    check_content_units(&state, body.content_units_per_offer).map_err(reject)?;

    let request = SegmentedAllocationRequest {
        total_budget: body.total_budget,
        segments,
        platforms: body.platforms,
        content_units_per_offer: body.content_units_per_offer,
        staff: body.staff,
    };
    let outcome = state.engine.allocate_by_segments(&request).map_err(reject)?;
    record_outcome(outcome.summary.is_empty());
    Ok(Json(outcome))
}

/// GET /v1/catalog: Offer catalog in platform/tier order.
pub async fn catalog(State(state): State<AppState>) -> Json<Vec<CatalogEntry>> {
    let entries = state
        .engine
        .offers()
        .iter()
        .map(|offer| {
            let (min_followers, max_followers) = offer.tier.follower_bounds();
            CatalogEntry {
                offer: *offer,
                tier_label: offer.tier.label(),
                min_followers,
                max_followers,
            }
        })
        .collect();
    Json(entries)
}

/// GET /v1/templates: Named budget split presets.
pub async fn templates() -> Json<Vec<SegmentTemplate>> {
    Json(TEMPLATES.to_vec())
}

/// GET /health: Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        node_id: state.node_id.clone(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        catalog_offers: state.engine.catalog().len(),
    })
}

/// GET /ready: Readiness probe for Kubernetes.
/// The catalog is built before the server starts, so a non-empty one means ready.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    if state.engine.catalog().is_empty() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// GET /live: Liveness probe for Kubernetes.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// An offer together with its tier's follower band.
#[derive(Serialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub offer: Offer,
    pub tier_label: &'static str,
    pub min_followers: u64,
    /// Exclusive; absent for the open-ended top tier.
    pub max_followers: Option<u64>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub node_id: String,
    pub uptime_secs: u64,
    pub catalog_offers: usize,
}
