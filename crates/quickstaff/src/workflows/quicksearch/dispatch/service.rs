use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::super::domain::{
    Candidate, CandidateSettings, Job, Offer, OfferId, OfferStatus, QuickSearchSettings,
};
use super::super::matching::{MatchConfig, MatchEngine, RankedCandidate};
use super::eligibility::accepts_auto_offer;
use super::outbox::{OfferSink, OfferSinkError};

/// Everything one dispatch decision needs, packed by the caller. The
/// workflow never reads a store of its own: the job, the candidate pool,
/// and any offers already out for this job all arrive as inputs, and the
/// result goes back out through the sink plus the return value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchRequest {
    pub job: Job,
    #[serde(default)]
    pub pool: Vec<Candidate>,
    #[serde(default)]
    pub settings: QuickSearchSettings,
    /// Observed per-worker ratings keyed by candidate id. Workers absent
    /// from the map fall back to their profile acceptance rating.
    #[serde(default)]
    pub ratings: HashMap<String, f64>,
    /// Per-worker opt-in settings keyed by candidate id. Workers absent
    /// from the map get the accept-everything default.
    #[serde(default)]
    pub candidate_settings: HashMap<String, CandidateSettings>,
    #[serde(default)]
    pub recruiter_balance: f64,
    /// Offers already dispatched for this job, consulted only to exclude
    /// workers who are still engaged.
    #[serde(default)]
    pub existing_offers: Vec<Offer>,
    /// Offer whose decline triggered a resend call. Ignored by the other
    /// operations.
    #[serde(default)]
    pub declined_offer: Option<Offer>,
}

impl DispatchRequest {
    fn settings_for(&self, candidate: &Candidate) -> CandidateSettings {
        self.candidate_settings
            .get(candidate.id.0.as_str())
            .copied()
            .unwrap_or_default()
    }

    /// Ids of workers holding an offer on this job in any of `statuses`,
    /// judged with lazy expiry at `now`.
    fn engaged_candidates(&self, statuses: &[OfferStatus], now: DateTime<Utc>) -> HashSet<&str> {
        self.existing_offers
            .iter()
            .filter(|offer| offer.job_id == self.job.id)
            .filter(|offer| statuses.contains(&offer.status_at(now)))
            .map(|offer| offer.candidate_id.0.as_str())
            .collect()
    }
}

/// Service composing the match engine, worker eligibility gate, and offer
/// sink.
pub struct OfferDispatchService<S> {
    engine: Arc<MatchEngine>,
    sink: Arc<S>,
}

static OFFER_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_offer_id() -> OfferId {
    let id = OFFER_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    OfferId(format!("offer-{id:06}"))
}

impl<S> OfferDispatchService<S>
where
    S: OfferSink + 'static,
{
    pub fn new(sink: Arc<S>, config: MatchConfig) -> Self {
        Self {
            engine: Arc::new(MatchEngine::new(config)),
            sink,
        }
    }

    pub fn engine(&self) -> &MatchEngine {
        &self.engine
    }

    /// Rank the pool, drop workers whose settings refuse the offer, cut to
    /// the job's staff count, and emit one offer per survivor. The whole
    /// batch shares a single expiry instant. A recruiter with auto matching
    /// switched off gets an empty batch, not an error.
    pub fn auto_send_offers(
        &self,
        request: &DispatchRequest,
        now: DateTime<Utc>,
    ) -> Result<Vec<Offer>, OfferSinkError> {
        if !request.settings.auto_matching_enabled {
            return Ok(Vec::new());
        }

        let ranked = self.engine.rank(
            &request.job,
            &request.pool,
            &request.settings,
            &request.ratings,
        );
        let expires_at = now + Duration::days(request.job.expiry_window_days());

        let mut offers = Vec::new();
        for entry in ranked
            .iter()
            .filter(|entry| self.accepts(request, entry))
            .take(request.job.staff_count as usize)
        {
            let offer = build_offer(&request.job, entry, now, expires_at);
            self.sink.create_offer(offer.clone())?;
            offers.push(offer);
        }

        Ok(offers)
    }

    /// Walk down the shortlist after a decline and offer the job to the
    /// next worker who accepts auto offers, is not the decliner, and holds
    /// no live offer on this job. `Ok(None)` means the shortlist is spent,
    /// which is a normal outcome rather than a failure.
    pub fn resend_offer(
        &self,
        request: &DispatchRequest,
        declined: &Offer,
        now: DateTime<Utc>,
    ) -> Result<Option<Offer>, OfferSinkError> {
        let pending = request.engaged_candidates(&[OfferStatus::Pending], now);

        let ranked = self.engine.rank(
            &request.job,
            &request.pool,
            &request.settings,
            &request.ratings,
        );

        let next = ranked.iter().find(|entry| {
            let candidate_id = entry.candidate.id.0.as_str();
            candidate_id != declined.candidate_id.0.as_str()
                && !pending.contains(candidate_id)
                && self.accepts(request, entry)
        });

        match next {
            Some(entry) => {
                let expires_at = now + Duration::days(request.job.expiry_window_days());
                let offer = build_offer(&request.job, entry, now, expires_at);
                self.sink.create_offer(offer.clone())?;
                Ok(Some(offer))
            }
            None => Ok(None),
        }
    }

    /// Dry run of the auto-send pipeline: the ranked, gated shortlist minus
    /// workers who already hold a pending or accepted offer on this job.
    /// Nothing is emitted and the staff count does not truncate the result.
    pub fn eligible_candidates<'a>(
        &self,
        request: &'a DispatchRequest,
        now: DateTime<Utc>,
    ) -> Vec<RankedCandidate<'a>> {
        let engaged =
            request.engaged_candidates(&[OfferStatus::Pending, OfferStatus::Accepted], now);

        self.engine
            .rank(
                &request.job,
                &request.pool,
                &request.settings,
                &request.ratings,
            )
            .into_iter()
            .filter(|entry| {
                !engaged.contains(entry.candidate.id.0.as_str()) && self.accepts(request, entry)
            })
            .collect()
    }

    fn accepts(&self, request: &DispatchRequest, entry: &RankedCandidate<'_>) -> bool {
        let settings = request.settings_for(entry.candidate);
        accepts_auto_offer(&settings, &request.job, request.recruiter_balance)
    }
}

fn build_offer(
    job: &Job,
    entry: &RankedCandidate<'_>,
    now: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Offer {
    Offer {
        id: next_offer_id(),
        job_id: job.id.clone(),
        candidate_id: entry.candidate.id.clone(),
        status: OfferStatus::Pending,
        match_percentage: entry.match_percentage,
        message: offer_message(job, entry.match_percentage),
        auto_sent: true,
        created_at: now,
        expires_at,
        responded_at: None,
    }
}

fn offer_message(job: &Job, match_percentage: f64) -> String {
    format!(
        "You are a {}% match for {}. Accept before the offer expires to lock in the shift.",
        match_percentage.round() as i64,
        job.title
    )
}
