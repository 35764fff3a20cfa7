use super::common::*;
use std::sync::Arc;

use chrono::Duration;

use crate::workflows::quicksearch::geo::GeoPoint;
use crate::workflows::quicksearch::tracking::{determine_stage, Stage, TrackingSession, WatchError};

// Longitudes along the commute route; one degree is 111.19 km here.
fn at_home() -> Option<GeoPoint> {
    Some(equator(0.0))
}

fn leaving_home() -> Option<GeoPoint> {
    // 6.67 km from home, 13.3 km from the workplace.
    Some(equator(0.06))
}

fn near_work() -> Option<GeoPoint> {
    // 3.3 km from the workplace.
    Some(equator(0.15))
}

fn at_work() -> Option<GeoPoint> {
    // 11 metres from the workplace.
    Some(equator(0.1799))
}

#[test]
fn arrival_within_the_work_radius_is_terminal() {
    let route = commute_route();
    let stage = determine_stage(
        at_work(),
        route.home,
        route.workplace,
        Stage::EnRoute,
        Duration::zero(),
    );
    assert_eq!(stage, Stage::Arrived);

    // Sticky: once arrived, even a fix back home stays arrived.
    let after = determine_stage(
        at_home(),
        route.home,
        route.workplace,
        Stage::Arrived,
        Duration::zero(),
    );
    assert_eq!(after, Stage::Arrived);
}

#[test]
fn approaching_wins_over_en_route_when_both_bands_hold() {
    let route = commute_route();
    // 16.7 km from home satisfies the en-route rule too; approach is first.
    let stage = determine_stage(
        near_work(),
        route.home,
        route.workplace,
        Stage::EnRoute,
        Duration::zero(),
    );
    assert_eq!(stage, Stage::Approaching);
}

#[test]
fn first_fix_inside_approach_band_stays_accepted() {
    let route = commute_route();
    let stage = determine_stage(
        near_work(),
        route.home,
        route.workplace,
        Stage::Accepted,
        Duration::minutes(30),
    );

    // Pinned quirk: the guard reads the previous stage, so a worker who was
    // never seen leaving home cannot advance on distance alone.
    assert_eq!(stage, Stage::Accepted);

    let again = determine_stage(
        near_work(),
        route.home,
        route.workplace,
        stage,
        Duration::minutes(30),
    );
    assert_eq!(again, stage, "same inputs must give the same stage");
}

#[test]
fn preparing_requires_home_proximity_and_prep_clock() {
    let route = commute_route();

    let preparing = determine_stage(
        at_home(),
        route.home,
        route.workplace,
        Stage::Accepted,
        Duration::minutes(10),
    );
    assert_eq!(preparing, Stage::Preparing);

    let clock_ran_out = determine_stage(
        at_home(),
        route.home,
        route.workplace,
        Stage::Preparing,
        Duration::zero(),
    );
    assert_eq!(clock_ran_out, Stage::Accepted);
}

#[test]
fn missing_coordinates_stall_proximity_transitions() {
    let route = commute_route();

    // No fix while travelling keeps the worker travelling.
    let stage = determine_stage(None, route.home, route.workplace, Stage::EnRoute, Duration::zero());
    assert_eq!(stage, Stage::EnRoute);

    // No fix before departure cannot start the preparation window.
    let stage = determine_stage(
        None,
        route.home,
        route.workplace,
        Stage::Accepted,
        Duration::minutes(30),
    );
    assert_eq!(stage, Stage::Accepted);
}

#[test]
fn session_progresses_to_arrival_and_sticks() {
    let watcher = ReplayWatcher::default();
    let observer = Arc::new(RecordingObserver::default());
    let session = TrackingSession::start(
        tracking_plan(Stage::EnRoute),
        &watcher,
        observer.clone(),
    )
    .expect("watcher subscribes");

    watcher.push(fix_at(leaving_home(), clock() + Duration::minutes(5)));
    watcher.push(fix_at(near_work(), clock() + Duration::minutes(10)));
    watcher.push(fix_at(at_work(), clock() + Duration::minutes(15)));
    watcher.push(fix_at(at_home(), clock() + Duration::minutes(20)));

    let updates = observer.updates();
    assert_eq!(updates.len(), 4, "every fix emits an update");
    assert_eq!(updates[0].stage, Stage::EnRoute);
    assert!((updates[0].distance_from_home_km - 6.67).abs() < 0.05);
    assert_eq!(updates[0].prep_time_remaining, Duration::minutes(25));
    assert_eq!(updates[3].stage, Stage::Arrived);

    let changes = observer.changes();
    assert_eq!(changes.len(), 2, "only real transitions emit changes");
    assert_eq!(changes[0].from, Stage::EnRoute);
    assert_eq!(changes[0].to, Stage::Approaching);
    assert_eq!(changes[1].to, Stage::Arrived);
    assert_eq!(changes[1].at, clock() + Duration::minutes(15));

    assert_eq!(session.stage(), Stage::Arrived);
}

#[test]
fn session_prep_window_follows_the_sample_clock() {
    let watcher = ReplayWatcher::default();
    let observer = Arc::new(RecordingObserver::default());
    let _session = TrackingSession::start(
        tracking_plan(Stage::Accepted),
        &watcher,
        observer.clone(),
    )
    .expect("watcher subscribes");

    watcher.push(fix_at(at_home(), clock() + Duration::minutes(10)));
    watcher.push(fix_at(at_home(), clock() + Duration::minutes(40)));

    let updates = observer.updates();
    assert_eq!(updates[0].stage, Stage::Preparing);
    assert_eq!(updates[0].prep_time_remaining, Duration::minutes(20));
    assert_eq!(updates[1].stage, Stage::Accepted);
    assert_eq!(updates[1].prep_time_remaining, Duration::zero());

    let changes = observer.changes();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[1].from, Stage::Preparing);
    assert_eq!(changes[1].to, Stage::Accepted);
}

#[test]
fn stop_unsubscribes_the_watcher() {
    let watcher = ReplayWatcher::default();
    let observer = Arc::new(RecordingObserver::default());
    let mut session = TrackingSession::start(
        tracking_plan(Stage::EnRoute),
        &watcher,
        observer.clone(),
    )
    .expect("watcher subscribes");

    watcher.push(fix_at(leaving_home(), clock() + Duration::minutes(5)));
    session.stop();
    watcher.push(fix_at(near_work(), clock() + Duration::minutes(10)));

    assert_eq!(observer.updates().len(), 1, "no events after stop");
}

#[test]
fn dropping_the_session_cancels_the_subscription() {
    let watcher = ReplayWatcher::default();
    let observer = Arc::new(RecordingObserver::default());

    {
        let _session = TrackingSession::start(
            tracking_plan(Stage::EnRoute),
            &watcher,
            observer.clone(),
        )
        .expect("watcher subscribes");
        watcher.push(fix_at(leaving_home(), clock() + Duration::minutes(5)));
    }

    watcher.push(fix_at(near_work(), clock() + Duration::minutes(10)));

    assert_eq!(observer.updates().len(), 1, "no events after drop");
}

#[test]
fn session_reports_unknown_distances_as_infinite() {
    let watcher = ReplayWatcher::default();
    let observer = Arc::new(RecordingObserver::default());
    let session = TrackingSession::start(
        tracking_plan(Stage::EnRoute),
        &watcher,
        observer.clone(),
    )
    .expect("watcher subscribes");

    watcher.push(fix_at(None, clock() + Duration::minutes(5)));

    let updates = observer.updates();
    assert_eq!(updates[0].stage, Stage::EnRoute);
    assert!(updates[0].distance_from_home_km.is_infinite());
    assert!(updates[0].distance_from_workplace_km.is_infinite());
    assert_eq!(session.stage(), Stage::EnRoute);
}

#[test]
fn permission_denied_surfaces_at_start() {
    let observer = Arc::new(RecordingObserver::default());
    let error = TrackingSession::start(tracking_plan(Stage::Accepted), &DeniedWatcher, observer)
        .err()
        .expect("denied watcher cannot start");

    assert!(matches!(error, WatchError::PermissionDenied));
}
