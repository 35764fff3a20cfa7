use crate::infra::{AppState, OfferAction, OfferBoard};
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use chrono::{Duration, Utc};
use quickstaff::workflows::quicksearch::{
    check_balance_sufficiency, determine_stage, dispatch_router, estimate_eta_minutes,
    haversine_km, BalanceCheck, GeoPoint, OfferDispatchService, OfferId, OfferView, Stage,
    DEFAULT_AVG_SPEED_KMH,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

// Wire-supplied prep countdowns are clamped to plus or minus a week before
// they enter duration arithmetic; only the sign matters to the stage rules.
const MAX_PREP_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Deserialize)]
pub(crate) struct BalanceCheckRequest {
    pub(crate) available_balance: f64,
    pub(crate) required_balance: f64,
    pub(crate) hourly_rate: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StageRequest {
    #[serde(default)]
    pub(crate) current: Option<GeoPoint>,
    #[serde(default)]
    pub(crate) home: Option<GeoPoint>,
    #[serde(default)]
    pub(crate) workplace: Option<GeoPoint>,
    pub(crate) current_stage: Stage,
    #[serde(default)]
    pub(crate) prep_time_remaining_minutes: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct StageResponse {
    pub(crate) stage: Stage,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) distance_from_home_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) distance_from_workplace_km: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) eta_minutes: Option<u32>,
}

pub(crate) fn with_quick_search_routes(
    service: Arc<OfferDispatchService<OfferBoard>>,
) -> axum::Router {
    dispatch_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/quick-search/offers/board",
            axum::routing::get(board_endpoint),
        )
        .route(
            "/api/v1/quick-search/offers/sweep-expired",
            axum::routing::post(sweep_expired_endpoint),
        )
        .route(
            "/api/v1/quick-search/offers/:offer_id/accept",
            axum::routing::post(accept_endpoint),
        )
        .route(
            "/api/v1/quick-search/offers/:offer_id/decline",
            axum::routing::post(decline_endpoint),
        )
        .route(
            "/api/v1/quick-search/offers/:offer_id/cancel",
            axum::routing::post(cancel_endpoint),
        )
        .route(
            "/api/v1/quick-search/payments/balance-check",
            axum::routing::post(balance_check_endpoint),
        )
        .route(
            "/api/v1/quick-search/tracking/stage",
            axum::routing::post(stage_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn balance_check_endpoint(
    Json(payload): Json<BalanceCheckRequest>,
) -> Json<BalanceCheck> {
    Json(check_balance_sufficiency(
        payload.available_balance,
        payload.required_balance,
        payload.hourly_rate,
    ))
}

pub(crate) async fn stage_endpoint(Json(payload): Json<StageRequest>) -> Json<StageResponse> {
    let prep_minutes = payload
        .prep_time_remaining_minutes
        .clamp(-MAX_PREP_MINUTES, MAX_PREP_MINUTES);
    let stage = determine_stage(
        payload.current,
        payload.home,
        payload.workplace,
        payload.current_stage,
        Duration::minutes(prep_minutes),
    );

    Json(StageResponse {
        stage,
        distance_from_home_km: finite_km(haversine_km(payload.current, payload.home)),
        distance_from_workplace_km: finite_km(haversine_km(payload.current, payload.workplace)),
        eta_minutes: estimate_eta_minutes(payload.current, payload.workplace, DEFAULT_AVG_SPEED_KMH),
    })
}

pub(crate) async fn board_endpoint(Extension(state): Extension<AppState>) -> Json<Vec<OfferView>> {
    let now = Utc::now();
    let views = state
        .board
        .snapshot()
        .iter()
        .map(|offer| offer.view_at(now))
        .collect();
    Json(views)
}

pub(crate) async fn sweep_expired_endpoint(
    Extension(state): Extension<AppState>,
) -> Json<serde_json::Value> {
    let expired = state.board.sweep_expired(Utc::now());
    Json(json!({ "expired": expired }))
}

pub(crate) async fn accept_endpoint(
    Extension(state): Extension<AppState>,
    Path(offer_id): Path<String>,
) -> Response {
    settle_response(&state, offer_id, OfferAction::Accept)
}

pub(crate) async fn decline_endpoint(
    Extension(state): Extension<AppState>,
    Path(offer_id): Path<String>,
) -> Response {
    settle_response(&state, offer_id, OfferAction::Decline)
}

pub(crate) async fn cancel_endpoint(
    Extension(state): Extension<AppState>,
    Path(offer_id): Path<String>,
) -> Response {
    settle_response(&state, offer_id, OfferAction::Cancel)
}

fn settle_response(state: &AppState, offer_id: String, action: OfferAction) -> Response {
    let id = OfferId(offer_id);
    let now = Utc::now();

    match state.board.settle(&id, action, now) {
        None => {
            let payload = json!({ "error": format!("offer {} not found", id.0) });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Some(Ok(offer)) => (StatusCode::OK, Json(offer.view_at(now))).into_response(),
        Some(Err(error)) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
    }
}

fn finite_km(distance: f64) -> Option<f64> {
    distance.is_finite().then_some(distance)
}
