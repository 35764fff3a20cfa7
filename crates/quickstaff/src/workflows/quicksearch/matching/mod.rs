mod config;
mod scoring;

pub use config::{JitterSource, MatchConfig, MAX_JITTER};
pub use scoring::passes_settings;

use std::cmp::Ordering;
use std::collections::HashMap;

use super::domain::{Candidate, Job, QuickSearchSettings};

/// One scored pool entry. Engine output is ordered by `combined_score`.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedCandidate<'a> {
    pub candidate: &'a Candidate,
    pub match_percentage: f64,
    pub rating: f64,
    pub combined_score: f64,
}

/// Stateless scorer applying the additive rule set to a candidate pool.
pub struct MatchEngine {
    config: MatchConfig,
}

impl MatchEngine {
    pub fn new(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Match percentage for one candidate: rule total plus jitter, clamped
    /// to [40, 100] and rounded to a whole percentage.
    pub fn match_percentage(&self, job: &Job, candidate: &Candidate) -> f64 {
        let raw = scoring::raw_match_score(job, candidate);
        let jitter = self.config.jitter.draw(&job.id, &candidate.id);
        scoring::clamp_score(raw + jitter).round()
    }

    /// Filter the pool by recruiter settings, score the survivors, and
    /// return the shortlist sorted descending by combined score. A missing
    /// ratings entry falls back to the candidate's own acceptance rating.
    pub fn rank<'a>(
        &self,
        job: &Job,
        pool: &'a [Candidate],
        settings: &QuickSearchSettings,
        ratings: &HashMap<String, f64>,
    ) -> Vec<RankedCandidate<'a>> {
        let mut ranked: Vec<RankedCandidate<'a>> = pool
            .iter()
            .filter(|candidate| passes_settings(candidate, settings))
            .map(|candidate| {
                let match_percentage = self.match_percentage(job, candidate);
                let rating = ratings
                    .get(candidate.id.0.as_str())
                    .copied()
                    .unwrap_or(candidate.acceptance_rating);
                let combined_score = self.config.match_weight * match_percentage
                    + self.config.rating_weight * rating;

                RankedCandidate {
                    candidate,
                    match_percentage,
                    rating,
                    combined_score,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(Ordering::Equal)
        });
        ranked.truncate(self.config.shortlist_limit);
        ranked
    }
}
