use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::quicksearch::dispatch::outbox::{OfferSink, OfferSinkError};
use crate::workflows::quicksearch::dispatch::{
    dispatch_router, DispatchRequest, OfferDispatchService,
};
use crate::workflows::quicksearch::domain::{
    Badge, Candidate, CandidateId, Job, JobId, Offer, OfferId, OfferStatus, PayRange,
    PaymentMethod, QuickSearchSettings, TaxType,
};
use crate::workflows::quicksearch::geo::GeoPoint;
use crate::workflows::quicksearch::matching::{JitterSource, MatchConfig, RankedCandidate};
use crate::workflows::quicksearch::tracking::{
    LocationFix, LocationUpdate, LocationWatcher, Stage, StageChange, TrackedRoute,
    TrackingObserver, TrackingPlan, WatchError, WatchSubscription,
};

pub(super) fn clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn construction_job() -> Job {
    Job {
        id: JobId("job-cn-1".to_string()),
        title: "Labourer".to_string(),
        industry: "Construction".to_string(),
        experience_years: 2,
        experience_months: 0,
        range_km: 10.0,
        salary_min: 30.0,
        salary_max: 40.0,
        tax_type: TaxType::Abn,
        payment_method: PaymentMethod::Platform,
        staff_count: 2,
        expected_hours: None,
        offer_expiry_days: None,
        recruiter_badge: Some(Badge::Pro),
    }
}

/// Strong profile against `construction_job`: every additive rule except the
/// preferred-role bonus fires, so the jitter-free score is exactly 90.
pub(super) fn candidate(id: &str) -> Candidate {
    Candidate {
        id: CandidateId(id.to_string()),
        name: format!("Worker {id}"),
        badge: Badge::Gold,
        industries: vec!["Construction".to_string()],
        preferred_roles: Vec::new(),
        tax_types: vec![TaxType::Abn],
        radius_km: 15.0,
        pay_preference: PayRange {
            min: 25.0,
            max: 45.0,
        },
        experience_years: 2.0,
        acceptance_rating: 80.0,
        location: None,
    }
}

pub(super) fn weak_candidate(id: &str) -> Candidate {
    Candidate {
        id: CandidateId(id.to_string()),
        name: format!("Worker {id}"),
        badge: Badge::Bronze,
        industries: vec!["Hospitality".to_string()],
        preferred_roles: Vec::new(),
        tax_types: vec![TaxType::Tfn],
        radius_km: 5.0,
        pay_preference: PayRange {
            min: 10.0,
            max: 20.0,
        },
        experience_years: 8.0,
        acceptance_rating: 50.0,
        location: None,
    }
}

/// Four workers whose jitter-free combined scores order as
/// ace > brook > cole > dust; the vec itself is deliberately unsorted.
pub(super) fn pool() -> Vec<Candidate> {
    let mut ace = candidate("w-ace");
    ace.acceptance_rating = 95.0;
    let brook = candidate("w-brook");
    let mut cole = candidate("w-cole");
    cole.acceptance_rating = 60.0;
    let dust = weak_candidate("w-dust");

    vec![brook, ace, cole, dust]
}

pub(super) fn auto_settings() -> QuickSearchSettings {
    QuickSearchSettings {
        auto_matching_enabled: true,
        ..QuickSearchSettings::default()
    }
}

pub(super) fn match_config() -> MatchConfig {
    MatchConfig {
        jitter: JitterSource::Disabled,
        ..MatchConfig::default()
    }
}

pub(super) fn dispatch_request() -> DispatchRequest {
    DispatchRequest {
        job: construction_job(),
        pool: pool(),
        settings: auto_settings(),
        ratings: HashMap::new(),
        candidate_settings: HashMap::new(),
        recruiter_balance: 10_000.0,
        existing_offers: Vec::new(),
        declined_offer: None,
    }
}

pub(super) fn offer_for(
    job: &Job,
    candidate_id: &str,
    status: OfferStatus,
    now: DateTime<Utc>,
) -> Offer {
    Offer {
        id: OfferId(format!("offer-test-{candidate_id}")),
        job_id: job.id.clone(),
        candidate_id: CandidateId(candidate_id.to_string()),
        status,
        match_percentage: 90.0,
        message: "You are a 90% match for Labourer.".to_string(),
        auto_sent: true,
        created_at: now - Duration::hours(2),
        expires_at: now + Duration::days(30),
        responded_at: None,
    }
}

pub(super) fn build_service() -> (OfferDispatchService<MemorySink>, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::default());
    let service = OfferDispatchService::new(sink.clone(), match_config());
    (service, sink)
}

pub(super) fn dispatch_router_with_service(
    service: OfferDispatchService<MemorySink>,
) -> axum::Router {
    dispatch_router(Arc::new(service))
}

pub(super) fn candidate_ids(entries: &[RankedCandidate<'_>]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| entry.candidate.id.0.clone())
        .collect()
}

#[derive(Default, Clone)]
pub(super) struct MemorySink {
    created: Arc<Mutex<Vec<Offer>>>,
}

impl MemorySink {
    pub(super) fn created(&self) -> Vec<Offer> {
        self.created.lock().expect("sink mutex poisoned").clone()
    }
}

impl OfferSink for MemorySink {
    fn create_offer(&self, offer: Offer) -> Result<(), OfferSinkError> {
        self.created.lock().expect("sink mutex poisoned").push(offer);
        Ok(())
    }
}

pub(super) struct UnavailableSink;

impl OfferSink for UnavailableSink {
    fn create_offer(&self, _offer: Offer) -> Result<(), OfferSinkError> {
        Err(OfferSinkError::Unavailable(
            "push gateway offline".to_string(),
        ))
    }
}

/// A point on the equator, where one degree of longitude is 111.19 km.
/// Tracking tests pick longitudes to land cleanly inside or outside the
/// stage thresholds.
pub(super) fn equator(longitude: f64) -> GeoPoint {
    GeoPoint {
        latitude: 0.0,
        longitude,
    }
}

pub(super) fn fix_at(point: Option<GeoPoint>, recorded_at: DateTime<Utc>) -> LocationFix {
    LocationFix {
        coordinates: point,
        accuracy_m: Some(8.0),
        recorded_at,
    }
}

/// Home at longitude 0, workplace 0.18 degrees east (about 20 km).
pub(super) fn commute_route() -> TrackedRoute {
    TrackedRoute {
        home: Some(equator(0.0)),
        workplace: Some(equator(0.18)),
    }
}

pub(super) fn tracking_plan(initial_stage: Stage) -> TrackingPlan {
    TrackingPlan {
        route: commute_route(),
        initial_stage,
        prep_time: Duration::minutes(30),
        started_at: clock(),
    }
}

type FixSink = Box<dyn FnMut(LocationFix) + Send>;

/// Watcher fake that replays whatever fixes the test pushes. Cancelling the
/// subscription drops the stored callback, so pushes after a cancel go
/// nowhere, mirroring the contract a real driver must honor.
#[derive(Default, Clone)]
pub(super) struct ReplayWatcher {
    sink: Arc<Mutex<Option<FixSink>>>,
}

impl ReplayWatcher {
    pub(super) fn push(&self, fix: LocationFix) {
        let mut guard = self.sink.lock().expect("watcher mutex poisoned");
        if let Some(sink) = guard.as_mut() {
            sink(fix);
        }
    }
}

impl LocationWatcher for ReplayWatcher {
    fn watch(
        &self,
        sink: Box<dyn FnMut(LocationFix) + Send>,
    ) -> Result<Box<dyn WatchSubscription>, WatchError> {
        *self.sink.lock().expect("watcher mutex poisoned") = Some(sink);
        Ok(Box::new(ReplaySubscription {
            sink: self.sink.clone(),
        }))
    }
}

struct ReplaySubscription {
    sink: Arc<Mutex<Option<FixSink>>>,
}

impl WatchSubscription for ReplaySubscription {
    fn cancel(&mut self) {
        self.sink.lock().expect("watcher mutex poisoned").take();
    }
}

pub(super) struct DeniedWatcher;

impl LocationWatcher for DeniedWatcher {
    fn watch(
        &self,
        _sink: Box<dyn FnMut(LocationFix) + Send>,
    ) -> Result<Box<dyn WatchSubscription>, WatchError> {
        Err(WatchError::PermissionDenied)
    }
}

#[derive(Default)]
pub(super) struct RecordingObserver {
    updates: Mutex<Vec<LocationUpdate>>,
    changes: Mutex<Vec<StageChange>>,
}

impl RecordingObserver {
    pub(super) fn updates(&self) -> Vec<LocationUpdate> {
        self.updates.lock().expect("observer mutex poisoned").clone()
    }

    pub(super) fn changes(&self) -> Vec<StageChange> {
        self.changes.lock().expect("observer mutex poisoned").clone()
    }
}

impl TrackingObserver for RecordingObserver {
    fn on_location_update(&self, update: LocationUpdate) {
        self.updates
            .lock()
            .expect("observer mutex poisoned")
            .push(update);
    }

    fn on_stage_change(&self, change: StageChange) {
        self.changes
            .lock()
            .expect("observer mutex poisoned")
            .push(change);
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
