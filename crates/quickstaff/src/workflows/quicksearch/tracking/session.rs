use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::super::geo::{haversine_km, GeoPoint};
use super::stage::{determine_stage, Stage};

/// One GPS sample from the watcher. Coordinates may be absent when the fix
/// failed; absence means "unknown", not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
    #[serde(default)]
    pub accuracy_m: Option<f64>,
    pub recorded_at: DateTime<Utc>,
}

/// Home and workplace anchors for one tracked shift. Either may be unknown;
/// distances against a missing anchor come out infinite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackedRoute {
    #[serde(default)]
    pub home: Option<GeoPoint>,
    #[serde(default)]
    pub workplace: Option<GeoPoint>,
}

/// Emitted for every processed sample, stage change or not.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationUpdate {
    pub fix: LocationFix,
    pub stage: Stage,
    pub distance_from_home_km: f64,
    pub distance_from_workplace_km: f64,
    pub prep_time_remaining: Duration,
}

/// Emitted only when the computed stage differs from the previous one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageChange {
    pub from: Stage,
    pub to: Stage,
    pub at: DateTime<Utc>,
}

/// Receiving side of the tracking boundary; the UI or store lives here.
pub trait TrackingObserver: Send + Sync {
    fn on_location_update(&self, update: LocationUpdate);
    fn on_stage_change(&self, change: StageChange);
}

/// Cancellable handle returned by a watcher. After `cancel` returns, no
/// further samples may be delivered on the subscription.
pub trait WatchSubscription: Send {
    fn cancel(&mut self);
}

/// Source of GPS samples, usually the device location driver.
pub trait LocationWatcher {
    fn watch(
        &self,
        sink: Box<dyn FnMut(LocationFix) + Send>,
    ) -> Result<Box<dyn WatchSubscription>, WatchError>;
}

/// Failure reported by the sample source itself. The session does not
/// retry; it only reacts to samples that arrive.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location source unavailable: {0}")]
    Unavailable(String),
}

/// Parameters captured when tracking starts. `prep_time` counts down from
/// `started_at` using each sample's own timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackingPlan {
    pub route: TrackedRoute,
    pub initial_stage: Stage,
    pub prep_time: Duration,
    pub started_at: DateTime<Utc>,
}

struct TrackerState {
    plan: TrackingPlan,
    stage: Stage,
}

/// Live tracking session for one accepted shift. Holds the watcher
/// subscription and cancels it on `stop` and on drop, so every exit path
/// detaches the callback.
pub struct TrackingSession {
    state: Arc<Mutex<TrackerState>>,
    subscription: Option<Box<dyn WatchSubscription>>,
}

impl TrackingSession {
    /// Subscribe to the watcher and process samples until stopped. Samples
    /// arrive one at a time; each is fully processed before the next.
    pub fn start<W, O>(
        plan: TrackingPlan,
        watcher: &W,
        observer: Arc<O>,
    ) -> Result<Self, WatchError>
    where
        W: LocationWatcher + ?Sized,
        O: TrackingObserver + 'static,
    {
        let state = Arc::new(Mutex::new(TrackerState {
            plan,
            stage: plan.initial_stage,
        }));

        let shared = state.clone();
        let subscription = watcher.watch(Box::new(move |fix| {
            process_fix(&shared, observer.as_ref(), fix);
        }))?;

        Ok(Self {
            state,
            subscription: Some(subscription),
        })
    }

    /// Latest computed stage.
    pub fn stage(&self) -> Stage {
        self.state.lock().expect("tracker mutex poisoned").stage
    }

    /// Detach from the watcher. No callbacks fire afterwards.
    pub fn stop(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.cancel();
        }
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        self.stop();
    }
}

fn process_fix(state: &Mutex<TrackerState>, observer: &dyn TrackingObserver, fix: LocationFix) {
    let (update, change) = {
        let mut state = state.lock().expect("tracker mutex poisoned");

        let route = state.plan.route;
        let distance_from_home_km = haversine_km(fix.coordinates, route.home);
        let distance_from_workplace_km = haversine_km(fix.coordinates, route.workplace);

        let elapsed = fix.recorded_at - state.plan.started_at;
        let prep_time_remaining = (state.plan.prep_time - elapsed).max(Duration::zero());

        let previous = state.stage;
        let stage = determine_stage(
            fix.coordinates,
            route.home,
            route.workplace,
            previous,
            prep_time_remaining,
        );
        state.stage = stage;

        let update = LocationUpdate {
            fix,
            stage,
            distance_from_home_km,
            distance_from_workplace_km,
            prep_time_remaining,
        };
        let change = (stage != previous).then(|| StageChange {
            from: previous,
            to: stage,
            at: fix.recorded_at,
        });

        (update, change)
    };

    // Observers run outside the lock so they may query the session freely.
    observer.on_location_update(update);
    if let Some(change) = change {
        observer.on_stage_change(change);
    }
}
