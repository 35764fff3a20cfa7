//! Quick Search matching and dispatch.
//!
//! Given a job and a candidate pool, the engine scores and ranks workers,
//! the dispatcher emits time-boxed offers through an injected sink, and the
//! tracker turns GPS fixes into discrete progress stages once a worker has
//! accepted. Jobs, candidates, and offers are owned by the caller's store;
//! every operation takes them as inputs and hands back the next value.

pub mod dispatch;
pub mod domain;
pub mod geo;
pub mod matching;
pub mod payments;
pub mod roster;
pub mod tracking;

#[cfg(test)]
mod tests;

pub use dispatch::{
    accepts_auto_offer, dispatch_router, DispatchRequest, MatchPreview, OfferDispatchService,
    OfferSink, OfferSinkError, OfferView,
};
pub use domain::{
    Badge, Candidate, CandidateId, CandidateSettings, Job, JobId, Offer, OfferId, OfferStateError,
    OfferStatus, PayRange, PaymentMethod, QuickSearchSettings, TaxType,
};
pub use geo::{estimate_eta_minutes, haversine_km, GeoPoint, DEFAULT_AVG_SPEED_KMH};
pub use matching::{passes_settings, JitterSource, MatchConfig, MatchEngine, RankedCandidate};
pub use payments::{
    can_use_platform_payment, check_balance_sufficiency, required_balance_for, BalanceCheck,
    DEFAULT_EXPECTED_HOURS,
};
pub use roster::{CandidateRosterImporter, RosterImportError};
pub use tracking::{
    determine_stage, LocationFix, LocationUpdate, LocationWatcher, Stage, StageChange,
    TrackedRoute, TrackingObserver, TrackingPlan, TrackingSession, WatchError, WatchSubscription,
};
