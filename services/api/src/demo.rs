use crate::infra::{OfferAction, OfferBoard};
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use quickstaff::error::AppError;
use quickstaff::workflows::quicksearch::{
    check_balance_sufficiency, estimate_eta_minutes, required_balance_for, Badge, Candidate,
    CandidateId, CandidateRosterImporter, CandidateSettings, DispatchRequest, GeoPoint,
    JitterSource, Job, JobId, LocationFix, LocationUpdate, LocationWatcher, MatchConfig,
    MatchEngine, Offer, OfferDispatchService, PayRange, PaymentMethod, QuickSearchSettings,
    RankedCandidate, Stage, StageChange, TaxType, TrackedRoute, TrackingObserver, TrackingPlan,
    TrackingSession, WatchError, WatchSubscription, DEFAULT_AVG_SPEED_KMH,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Pin score jitter for reproducible demo output
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Skip the shift tracking portion of the demo
    #[arg(long)]
    pub(crate) skip_tracking: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ShortlistPreviewArgs {
    /// Worker roster CSV export to rank
    #[arg(long)]
    pub(crate) roster: PathBuf,
    /// Job title candidates are matched against
    #[arg(long)]
    pub(crate) title: String,
    /// Job industry
    #[arg(long)]
    pub(crate) industry: String,
    /// Travel distance the job expects, in kilometres
    #[arg(long, default_value_t = 10.0)]
    pub(crate) range_km: f64,
    /// Bottom of the offered hourly range
    #[arg(long, default_value_t = 25.0)]
    pub(crate) salary_min: f64,
    /// Top of the offered hourly range
    #[arg(long, default_value_t = 40.0)]
    pub(crate) salary_max: f64,
    /// Tax registration the job requires (ABN, TFN or both)
    #[arg(long, default_value = "ABN", value_parser = crate::infra::parse_tax_type)]
    pub(crate) tax_type: TaxType,
    /// Required experience in whole years
    #[arg(long, default_value_t = 1)]
    pub(crate) experience_years: u8,
    /// Pin score jitter for reproducible rankings
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Cap the printed shortlist
    #[arg(long)]
    pub(crate) limit: Option<usize>,
}

pub(crate) fn run_shortlist_preview(args: ShortlistPreviewArgs) -> Result<(), AppError> {
    let pool = CandidateRosterImporter::from_path(&args.roster)?;
    let job = preview_job(&args);

    let mut config = MatchConfig::default();
    if let Some(limit) = args.limit {
        config.shortlist_limit = limit;
    }
    if let Some(seed) = args.seed {
        config.jitter = JitterSource::Seeded(seed);
    }

    let engine = MatchEngine::new(config);
    let settings = QuickSearchSettings::default();
    let ratings = HashMap::new();
    let shortlist = engine.rank(&job, &pool, &settings, &ratings);

    println!(
        "Quick Search shortlist for \"{}\" ({})",
        job.title, job.industry
    );
    println!("{} of {} workers ranked", shortlist.len(), pool.len());
    render_shortlist(&shortlist);

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        seed,
        skip_tracking,
    } = args;

    let now = Utc::now();
    let job = demo_job();

    println!("Quick Search demo");
    println!(
        "Job: {} ({}) | {} workers wanted | ${:.0}-${:.0}/h",
        job.title, job.industry, job.staff_count, job.salary_min, job.salary_max
    );

    let mut config = MatchConfig::default();
    if let Some(seed) = seed {
        config.jitter = JitterSource::Seeded(seed);
    }

    let board = Arc::new(OfferBoard::default());
    let service = Arc::new(OfferDispatchService::new(board.clone(), config));

    let mut request = DispatchRequest {
        job: job.clone(),
        pool: demo_pool(),
        settings: QuickSearchSettings {
            auto_matching_enabled: true,
            ..QuickSearchSettings::default()
        },
        ratings: demo_ratings(),
        candidate_settings: demo_candidate_settings(),
        recruiter_balance: 900.0,
        existing_offers: Vec::new(),
        declined_offer: None,
    };

    println!("\nShortlist preview (opted-out workers already removed)");
    render_shortlist(&service.eligible_candidates(&request, now));

    let exposure = required_balance_for(&job);
    let balance = check_balance_sufficiency(request.recruiter_balance, exposure, job.salary_min);
    println!("\nRecruiter balance check");
    println!(
        "- holds ${:.2} against ${:.2} wage exposure -> {}",
        balance.available_balance,
        balance.required_balance,
        if balance.has_sufficient_balance {
            "sufficient"
        } else {
            "insufficient"
        }
    );
    if !balance.has_sufficient_balance {
        println!(
            "- shortfall ${:.2} | balance covers {:.1} paid hours",
            balance.shortfall, balance.coverable_hours
        );
    }

    println!("\nAuto-sending offers");
    let offers = match service.auto_send_offers(&request, now) {
        Ok(offers) => offers,
        Err(err) => {
            println!("  Offer dispatch unavailable: {}", err);
            return Ok(());
        }
    };
    for offer in &offers {
        render_offer(offer, now);
    }
    let first = match offers.first() {
        Some(offer) => offer.clone(),
        None => {
            println!("- no eligible workers, nothing sent");
            return Ok(());
        }
    };

    let declined_at = now + Duration::minutes(10);
    println!("\n{} declines after 10 minutes", first.candidate_id.0);
    let declined = match board.settle(&first.id, OfferAction::Decline, declined_at) {
        Some(Ok(offer)) => offer,
        Some(Err(err)) => {
            println!("  Decline rejected: {}", err);
            return Ok(());
        }
        None => {
            println!("  Offer missing from the board");
            return Ok(());
        }
    };

    request.existing_offers = board.snapshot();
    match service.resend_offer(&request, &declined, declined_at) {
        Ok(Some(replacement)) => {
            println!("Resent to the next worker on the shortlist:");
            render_offer(&replacement, declined_at);
        }
        Ok(None) => println!("Shortlist exhausted, no replacement offer"),
        Err(err) => println!("  Offer dispatch unavailable: {}", err),
    }

    let window_days = job.expiry_window_days();
    let later = now + Duration::days(window_days + 1);
    let flipped = board.sweep_expired(later);
    println!("\nBoard one day past the {window_days} day expiry window");
    for offer in board.snapshot() {
        render_offer(&offer, later);
    }
    println!("- {flipped} pending offer(s) flipped to expired by the sweep");

    if skip_tracking {
        return Ok(());
    }

    println!("\nShift tracking demo");
    println!("Route: Parramatta -> Sydney CBD, about 20 km");

    let plan = TrackingPlan {
        route: TrackedRoute {
            home: Some(GeoPoint {
                latitude: -33.8150,
                longitude: 151.0010,
            }),
            workplace: Some(GeoPoint {
                latitude: -33.8690,
                longitude: 151.2070,
            }),
        },
        initial_stage: Stage::EnRoute,
        prep_time: Duration::minutes(20),
        started_at: now,
    };

    if let Some(eta) =
        estimate_eta_minutes(plan.route.home, plan.route.workplace, DEFAULT_AVG_SPEED_KMH)
    {
        println!(
            "Estimated drive from home: {} min at {:.0} km/h",
            eta, DEFAULT_AVG_SPEED_KMH
        );
    }

    let watcher = ScriptedWatcher {
        fixes: vec![
            demo_fix(-33.8290, 151.0560, now + Duration::minutes(3)),
            demo_fix(-33.8600, 151.1700, now + Duration::minutes(12)),
            demo_fix(-33.8689, 151.2065, now + Duration::minutes(18)),
        ],
    };

    let session = match TrackingSession::start(plan, &watcher, Arc::new(PrintObserver)) {
        Ok(session) => session,
        Err(err) => {
            println!("  Tracking unavailable: {}", err);
            return Ok(());
        }
    };
    println!("Final stage: {}", session.stage().label());

    Ok(())
}

fn preview_job(args: &ShortlistPreviewArgs) -> Job {
    Job {
        id: JobId("job-preview".to_string()),
        title: args.title.clone(),
        industry: args.industry.clone(),
        experience_years: args.experience_years,
        experience_months: 0,
        range_km: args.range_km,
        salary_min: args.salary_min,
        salary_max: args.salary_max,
        tax_type: args.tax_type,
        payment_method: PaymentMethod::Platform,
        staff_count: 1,
        expected_hours: None,
        offer_expiry_days: None,
        recruiter_badge: None,
    }
}

fn demo_job() -> Job {
    Job {
        id: JobId("job-demo-1".to_string()),
        title: "Barista".to_string(),
        industry: "Hospitality".to_string(),
        experience_years: 1,
        experience_months: 0,
        range_km: 10.0,
        salary_min: 28.0,
        salary_max: 36.0,
        tax_type: TaxType::Abn,
        payment_method: PaymentMethod::Platform,
        staff_count: 2,
        expected_hours: Some(6.0),
        offer_expiry_days: Some(3),
        recruiter_badge: Some(Badge::Pro),
    }
}

fn demo_pool() -> Vec<Candidate> {
    vec![
        hospitality_worker("w-mira", "Mira Patel", Badge::Gold, vec!["Barista"], 2.0, 88.0),
        hospitality_worker("w-liam", "Liam Walsh", Badge::Silver, Vec::new(), 1.0, 82.0),
        hospitality_worker(
            "w-sofia",
            "Sofia Marino",
            Badge::Platinum,
            vec!["Barista shifts"],
            1.5,
            75.0,
        ),
        Candidate {
            id: CandidateId("w-theo".to_string()),
            name: "Theo Brandt".to_string(),
            badge: Badge::Bronze,
            industries: vec!["Construction".to_string()],
            preferred_roles: Vec::new(),
            tax_types: vec![TaxType::Tfn],
            radius_km: 5.0,
            pay_preference: PayRange {
                min: 45.0,
                max: 60.0,
            },
            experience_years: 6.0,
            acceptance_rating: 64.0,
            location: None,
        },
    ]
}

fn hospitality_worker(
    id: &str,
    name: &str,
    badge: Badge,
    preferred_roles: Vec<&str>,
    experience_years: f64,
    acceptance_rating: f64,
) -> Candidate {
    Candidate {
        id: CandidateId(id.to_string()),
        name: name.to_string(),
        badge,
        industries: vec!["Hospitality".to_string()],
        preferred_roles: preferred_roles.into_iter().map(String::from).collect(),
        tax_types: vec![TaxType::Abn],
        radius_km: 15.0,
        pay_preference: PayRange {
            min: 24.0,
            max: 40.0,
        },
        experience_years,
        acceptance_rating,
        location: None,
    }
}

fn demo_ratings() -> HashMap<String, f64> {
    HashMap::from([("w-mira".to_string(), 96.0)])
}

fn demo_candidate_settings() -> HashMap<String, CandidateSettings> {
    HashMap::from([(
        "w-sofia".to_string(),
        CandidateSettings {
            quick_offers_enabled: false,
            ..CandidateSettings::default()
        },
    )])
}

fn demo_fix(latitude: f64, longitude: f64, recorded_at: DateTime<Utc>) -> LocationFix {
    LocationFix {
        coordinates: Some(GeoPoint {
            latitude,
            longitude,
        }),
        accuracy_m: Some(10.0),
        recorded_at,
    }
}

fn render_shortlist(entries: &[RankedCandidate<'_>]) {
    if entries.is_empty() {
        println!("- nobody matches this job right now");
        return;
    }

    for (position, entry) in entries.iter().enumerate() {
        println!(
            "{:>3}. {} [{}] match {:.0}% | rating {:.1} | combined {:.1}",
            position + 1,
            entry.candidate.name,
            entry.candidate.badge.label(),
            entry.match_percentage,
            entry.rating,
            entry.combined_score
        );
    }
}

fn render_offer(offer: &Offer, now: DateTime<Utc>) {
    println!(
        "- {} -> {} | {} | match {:.0}% | expires {}",
        offer.id.0,
        offer.candidate_id.0,
        offer.status_at(now).label(),
        offer.match_percentage,
        offer.expires_at.format("%Y-%m-%d %H:%M")
    );
}

fn format_km(distance: f64) -> String {
    if distance.is_finite() {
        format!("{distance:.2} km")
    } else {
        "unknown".to_string()
    }
}

/// Replays a recorded commute while subscribing, so the whole walk happens
/// before `start` returns.
struct ScriptedWatcher {
    fixes: Vec<LocationFix>,
}

impl LocationWatcher for ScriptedWatcher {
    fn watch(
        &self,
        mut sink: Box<dyn FnMut(LocationFix) + Send>,
    ) -> Result<Box<dyn WatchSubscription>, WatchError> {
        for fix in &self.fixes {
            sink(*fix);
        }
        Ok(Box::new(CompletedSubscription))
    }
}

struct CompletedSubscription;

impl WatchSubscription for CompletedSubscription {
    fn cancel(&mut self) {}
}

struct PrintObserver;

impl TrackingObserver for PrintObserver {
    fn on_location_update(&self, update: LocationUpdate) {
        println!(
            "- {} | {} from home | {} from work | stage {}",
            update.fix.recorded_at.format("%H:%M"),
            format_km(update.distance_from_home_km),
            format_km(update.distance_from_workplace_km),
            update.stage.label()
        );
    }

    fn on_stage_change(&self, change: StageChange) {
        println!(
            "  stage change: {} -> {} at {}",
            change.from.label(),
            change.to.label(),
            change.at.format("%H:%M")
        );
    }
}
