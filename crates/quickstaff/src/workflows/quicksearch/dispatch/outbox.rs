use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::super::domain::{CandidateId, JobId, Offer, OfferId};
use super::super::matching::RankedCandidate;

/// Delivery seam for dispatched offers. The workflow decides which offers
/// exist; whatever sits behind this trait stores or pushes them. Adapters
/// must be idempotent on offer id so a retried batch cannot double-send.
pub trait OfferSink: Send + Sync {
    fn create_offer(&self, offer: Offer) -> Result<(), OfferSinkError>;
}

#[derive(Debug, Error)]
pub enum OfferSinkError {
    #[error("offer channel unavailable: {0}")]
    Unavailable(String),
    #[error("offer rejected downstream: {0}")]
    Rejected(String),
}

/// Externally visible snapshot of one offer, with lazy expiry applied.
#[derive(Debug, Clone, Serialize)]
pub struct OfferView {
    pub offer_id: OfferId,
    pub job_id: JobId,
    pub candidate_id: CandidateId,
    pub status: &'static str,
    pub match_percentage: f64,
    pub message: String,
    pub auto_sent: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Offer {
    /// Snapshot for API responses. The stored status may still read pending
    /// while the clock has moved past the deadline, so the view derives the
    /// status from `now` instead of echoing the field.
    pub fn view_at(&self, now: DateTime<Utc>) -> OfferView {
        OfferView {
            offer_id: self.id.clone(),
            job_id: self.job_id.clone(),
            candidate_id: self.candidate_id.clone(),
            status: self.status_at(now).label(),
            match_percentage: self.match_percentage,
            message: self.message.clone(),
            auto_sent: self.auto_sent,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

/// Row in a shortlist preview response.
#[derive(Debug, Clone, Serialize)]
pub struct MatchPreview {
    pub candidate_id: CandidateId,
    pub name: String,
    pub badge: &'static str,
    pub match_percentage: f64,
    pub rating: f64,
    pub combined_score: f64,
}

impl MatchPreview {
    pub fn from_ranked(entry: &RankedCandidate<'_>) -> Self {
        Self {
            candidate_id: entry.candidate.id.clone(),
            name: entry.candidate.name.clone(),
            badge: entry.candidate.badge.label(),
            match_percentage: entry.match_percentage,
            rating: entry.rating,
            combined_score: entry.combined_score,
        }
    }
}
