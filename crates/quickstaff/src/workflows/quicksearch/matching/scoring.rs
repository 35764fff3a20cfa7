use super::super::domain::{Badge, Candidate, Job, QuickSearchSettings};

pub(crate) const BASE_SCORE: f64 = 45.0;
pub(crate) const MIN_SCORE: f64 = 40.0;
pub(crate) const MAX_SCORE: f64 = 100.0;

/// Additive rule total before jitter and clamping. Every factor either adds
/// its weight or adds nothing; missing data never subtracts.
pub(crate) fn raw_match_score(job: &Job, candidate: &Candidate) -> f64 {
    let mut score = BASE_SCORE;

    if candidate
        .industries
        .iter()
        .any(|industry| industry == &job.industry)
    {
        score += 20.0;
    }

    let title = job.title.to_lowercase();
    if candidate
        .preferred_roles
        .iter()
        .any(|role| role.to_lowercase().contains(&title))
    {
        score += 10.0;
    }

    if candidate.tax_types.contains(&job.tax_type) {
        score += 10.0;
    }

    if job.range_km <= candidate.radius_km {
        score += 5.0;
    }

    if candidate
        .pay_preference
        .overlaps(job.salary_min, job.salary_max)
    {
        score += 5.0;
    }

    let experience_gap = (candidate.experience_years - job.experience_years_total()).abs();
    if experience_gap <= 1.0 {
        score += 5.0;
    } else if experience_gap <= 3.0 {
        score += 3.0;
    }

    score
}

pub(crate) fn clamp_score(score: f64) -> f64 {
    score.clamp(MIN_SCORE, MAX_SCORE)
}

/// Recruiter-side pool filter applied before any scoring happens.
pub fn passes_settings(candidate: &Candidate, settings: &QuickSearchSettings) -> bool {
    if let Some(min_badge) = settings.min_badge {
        if candidate.badge < min_badge {
            return false;
        }
    }

    if settings.pro_only && candidate.badge != Badge::Pro {
        return false;
    }

    true
}
