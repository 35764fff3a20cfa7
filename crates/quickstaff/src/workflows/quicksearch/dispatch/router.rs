use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use chrono::Utc;
use serde_json::json;

use super::outbox::{MatchPreview, OfferSink, OfferView};
use super::service::{DispatchRequest, OfferDispatchService};

/// Router builder exposing HTTP endpoints for offer dispatch.
pub fn dispatch_router<S>(service: Arc<OfferDispatchService<S>>) -> Router
where
    S: OfferSink + 'static,
{
    Router::new()
        .route("/api/v1/quick-search/offers", post(auto_send_handler::<S>))
        .route(
            "/api/v1/quick-search/offers/preview",
            post(preview_handler::<S>),
        )
        .route(
            "/api/v1/quick-search/offers/resend",
            post(resend_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn auto_send_handler<S>(
    State(service): State<Arc<OfferDispatchService<S>>>,
    axum::Json(request): axum::Json<DispatchRequest>,
) -> Response
where
    S: OfferSink + 'static,
{
    let now = Utc::now();
    match service.auto_send_offers(&request, now) {
        Ok(offers) => {
            let views: Vec<OfferView> = offers.iter().map(|offer| offer.view_at(now)).collect();
            (StatusCode::ACCEPTED, axum::Json(views)).into_response()
        }
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn preview_handler<S>(
    State(service): State<Arc<OfferDispatchService<S>>>,
    axum::Json(request): axum::Json<DispatchRequest>,
) -> Response
where
    S: OfferSink + 'static,
{
    let now = Utc::now();
    let shortlist: Vec<MatchPreview> = service
        .eligible_candidates(&request, now)
        .iter()
        .map(MatchPreview::from_ranked)
        .collect();
    (StatusCode::OK, axum::Json(shortlist)).into_response()
}

pub(crate) async fn resend_handler<S>(
    State(service): State<Arc<OfferDispatchService<S>>>,
    axum::Json(mut request): axum::Json<DispatchRequest>,
) -> Response
where
    S: OfferSink + 'static,
{
    let declined = match request.declined_offer.take() {
        Some(offer) => offer,
        None => {
            let payload = json!({
                "error": "declined_offer is required to resend",
            });
            return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
        }
    };

    let now = Utc::now();
    match service.resend_offer(&request, &declined, now) {
        Ok(Some(offer)) => (StatusCode::ACCEPTED, axum::Json(offer.view_at(now))).into_response(),
        Ok(None) => {
            let payload = json!({
                "offer": serde_json::Value::Null,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
