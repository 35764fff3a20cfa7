//! Shift tracking: the stage state machine plus the watcher-driven session.

mod session;
mod stage;

pub use session::{
    LocationFix, LocationUpdate, LocationWatcher, StageChange, TrackedRoute, TrackingObserver,
    TrackingPlan, TrackingSession, WatchError, WatchSubscription,
};
pub use stage::{
    determine_stage, Stage, APPROACH_RADIUS_KM, ARRIVAL_RADIUS_KM, EN_ROUTE_FROM_HOME_KM,
    PREP_HOME_RADIUS_KM,
};
