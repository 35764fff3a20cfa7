use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::super::domain::{CandidateId, JobId};

/// Upper bound (exclusive) of the tie-breaking jitter added to raw scores.
pub const MAX_JITTER: f64 = 5.0;

/// Where score jitter comes from. Production uses fresh entropy; tests pin
/// rankings with a seed or switch jitter off entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JitterSource {
    Entropy,
    Seeded(u64),
    Disabled,
}

impl JitterSource {
    pub(crate) fn draw(&self, job: &JobId, candidate: &CandidateId) -> f64 {
        match self {
            JitterSource::Entropy => rand::thread_rng().gen_range(0.0..MAX_JITTER),
            JitterSource::Seeded(seed) => {
                let mut rng = StdRng::seed_from_u64(pair_seed(*seed, job, candidate));
                rng.gen_range(0.0..MAX_JITTER)
            }
            JitterSource::Disabled => 0.0,
        }
    }
}

// Each (job, candidate) pair gets its own stable stream so a seeded run
// still spreads draws across the pool.
fn pair_seed(seed: u64, job: &JobId, candidate: &CandidateId) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    job.0.hash(&mut hasher);
    candidate.0.hash(&mut hasher);
    hasher.finish()
}

/// Weights and limits applied when ranking a candidate pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchConfig {
    pub match_weight: f64,
    pub rating_weight: f64,
    pub shortlist_limit: usize,
    pub jitter: JitterSource,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            match_weight: 0.7,
            rating_weight: 0.3,
            shortlist_limit: 20,
            jitter: JitterSource::Entropy,
        }
    }
}
