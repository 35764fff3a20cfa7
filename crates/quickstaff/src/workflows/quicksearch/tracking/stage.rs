use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::super::geo::{haversine_km, GeoPoint};

/// Worker proximity inside which a shift counts as arrived.
pub const ARRIVAL_RADIUS_KM: f64 = 0.1;
/// Workplace proximity that marks the final approach.
pub const APPROACH_RADIUS_KM: f64 = 5.0;
/// Distance from home past which the worker counts as travelling.
pub const EN_ROUTE_FROM_HOME_KM: f64 = 5.0;
/// Home proximity inside which the preparation window applies.
pub const PREP_HOME_RADIUS_KM: f64 = 1.0;

/// Discrete progress states for a worker heading to an accepted shift.
/// `Arrived` is terminal and sticky; the stage never regresses from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Accepted,
    Preparing,
    EnRoute,
    Approaching,
    Arrived,
}

impl Stage {
    pub const fn label(self) -> &'static str {
        match self {
            Stage::Accepted => "accepted",
            Stage::Preparing => "preparing",
            Stage::EnRoute => "en_route",
            Stage::Approaching => "approaching",
            Stage::Arrived => "arrived",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Stage::Arrived)
    }
}

/// Next progress stage for one location sample. Rule order is load-bearing:
/// arrival beats approaching, approaching beats en-route. Unknown
/// coordinates read as an infinite distance, which fails every proximity
/// check, so a worker with no fix can only hold position or fall back.
pub fn determine_stage(
    current: Option<GeoPoint>,
    home: Option<GeoPoint>,
    workplace: Option<GeoPoint>,
    current_stage: Stage,
    prep_time_remaining: Duration,
) -> Stage {
    if current_stage == Stage::Arrived {
        return Stage::Arrived;
    }

    let distance_from_workplace = haversine_km(current, workplace);
    let distance_from_home = haversine_km(current, home);

    if distance_from_workplace <= ARRIVAL_RADIUS_KM {
        return Stage::Arrived;
    }

    // TODO: a worker whose first sample already sits inside the approaching
    // or en-route band stays at Accepted, because both rules below read the
    // previous stage rather than distance alone. Shipped behavior; needs a
    // product call before it changes.
    let underway = !matches!(current_stage, Stage::Accepted | Stage::Preparing);

    if distance_from_workplace <= APPROACH_RADIUS_KM && underway {
        return Stage::Approaching;
    }

    if distance_from_home >= EN_ROUTE_FROM_HOME_KM && underway {
        return Stage::EnRoute;
    }

    if distance_from_home < PREP_HOME_RADIUS_KM && prep_time_remaining > Duration::zero() {
        return Stage::Preparing;
    }

    Stage::Accepted
}
