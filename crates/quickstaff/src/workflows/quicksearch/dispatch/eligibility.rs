use super::super::domain::{Badge, CandidateSettings, Job, PaymentMethod};
use super::super::payments;

/// Worker-side opt-in gate applied after ranking and before an automatic
/// offer goes out. Every check answers "did this worker agree to receive
/// this kind of offer"; a worker with default settings accepts everything.
pub fn accepts_auto_offer(
    settings: &CandidateSettings,
    job: &Job,
    recruiter_balance: f64,
) -> bool {
    if !settings.quick_offers_enabled {
        return false;
    }

    if settings.only_platform_payment && job.payment_method != PaymentMethod::Platform {
        return false;
    }

    if settings.only_sufficient_balance && recruiter_balance < payments::required_balance_for(job) {
        return false;
    }

    if settings.only_pro_badge_or_above
        && !matches!(job.recruiter_badge, Some(badge) if badge >= Badge::Pro)
    {
        return false;
    }

    true
}
