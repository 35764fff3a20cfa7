use super::common::*;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::quicksearch::dispatch::OfferDispatchService;
use crate::workflows::quicksearch::domain::OfferStatus;

#[tokio::test]
async fn auto_send_route_accepts_payloads() {
    let (service, _) = build_service();
    let router = dispatch_router_with_service(service);

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/quick-search/offers")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&dispatch_request()).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let payload = read_json_body(response).await;
    let offers = payload.as_array().expect("array of offer views");
    assert_eq!(offers.len(), 2);
    assert_eq!(offers[0].get("status"), Some(&Value::from("pending")));
    assert_eq!(offers[0].get("candidate_id"), Some(&Value::from("w-ace")));
}

#[tokio::test]
async fn preview_route_returns_the_ranked_shortlist() {
    let (service, _) = build_service();
    let router = dispatch_router_with_service(service);

    let response = router
        .oneshot(
            axum::http::Request::post("/api/v1/quick-search/offers/preview")
                .header(axum::http::header::CONTENT_TYPE, "application/json")
                .body(axum::body::Body::from(
                    serde_json::to_vec(&dispatch_request()).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    let shortlist = payload.as_array().expect("array of previews");
    assert_eq!(shortlist.len(), 4);
    assert_eq!(shortlist[0].get("candidate_id"), Some(&Value::from("w-ace")));
    assert!(shortlist[0].get("combined_score").is_some());
    assert_eq!(shortlist[0].get("badge"), Some(&Value::from("Gold")));
}

#[tokio::test]
async fn resend_handler_requires_a_declined_offer() {
    let (service, _) = build_service();
    let service = Arc::new(service);

    let response = crate::workflows::quicksearch::dispatch::router::resend_handler::<MemorySink>(
        State(service),
        axum::Json(dispatch_request()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn resend_handler_returns_the_next_offer() {
    let (service, _) = build_service();
    let service = Arc::new(service);
    // The handler judges engagement at Utc::now(), so seed relative to the
    // wall clock; clock() stays for service-level tests that pass `now`.
    let now = Utc::now();

    let mut request = dispatch_request();
    request.existing_offers = vec![offer_for(
        &request.job,
        "w-ace",
        OfferStatus::Pending,
        now,
    )];
    request.declined_offer = Some(offer_for(
        &request.job,
        "w-brook",
        OfferStatus::Declined,
        now,
    ));

    let response = crate::workflows::quicksearch::dispatch::router::resend_handler::<MemorySink>(
        State(service),
        axum::Json(request),
    )
    .await;

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let payload = read_json_body(response).await;
    assert_eq!(payload.get("candidate_id"), Some(&Value::from("w-cole")));
}

#[tokio::test]
async fn resend_handler_reports_exhaustion_as_ok() {
    let (service, _) = build_service();
    let service = Arc::new(service);
    let now = clock();

    let mut request = dispatch_request();
    request
        .pool
        .retain(|candidate| candidate.id.0 == "w-brook");
    request.declined_offer = Some(offer_for(
        &request.job,
        "w-brook",
        OfferStatus::Declined,
        now,
    ));

    let response = crate::workflows::quicksearch::dispatch::router::resend_handler::<MemorySink>(
        State(service),
        axum::Json(request),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("offer")
        .map(Value::is_null)
        .unwrap_or_default());
}

#[tokio::test]
async fn auto_send_handler_maps_sink_failures() {
    let service = Arc::new(OfferDispatchService::new(
        Arc::new(UnavailableSink),
        match_config(),
    ));

    let response =
        crate::workflows::quicksearch::dispatch::router::auto_send_handler::<UnavailableSink>(
            State(service),
            axum::Json(dispatch_request()),
        )
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert!(payload
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .contains("unavailable"));
}
