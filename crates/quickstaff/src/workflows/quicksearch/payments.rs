use serde::Serialize;

use super::domain::{Job, TaxType};

/// Hours assumed for a shift when the job does not state them.
pub const DEFAULT_EXPECTED_HOURS: f64 = 8.0;

/// Advisory snapshot of recruiter balance against one job's wage exposure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceCheck {
    pub has_sufficient_balance: bool,
    pub available_balance: f64,
    pub required_balance: f64,
    pub shortfall: f64,
    pub coverable_hours: f64,
}

/// Compare an available balance against a required amount. Invalid numeric
/// inputs default toward zero rather than erroring, and `coverable_hours`
/// is zero whenever the hourly rate is not positive.
pub fn check_balance_sufficiency(
    available_balance: f64,
    required_balance: f64,
    hourly_rate: f64,
) -> BalanceCheck {
    let available = sanitize_amount(available_balance);
    let required = sanitize_amount(required_balance);

    let coverable_hours = if hourly_rate.is_finite() && hourly_rate > 0.0 {
        available / hourly_rate
    } else {
        0.0
    };

    BalanceCheck {
        has_sufficient_balance: available >= required,
        available_balance: available,
        required_balance: required,
        shortfall: (required - available).max(0.0),
        coverable_hours,
    }
}

/// Platform-mediated payment is permitted only for ABN (or "both") workers;
/// TFN-only workers must be paid directly.
pub fn can_use_platform_payment(tax_type: TaxType) -> bool {
    matches!(tax_type, TaxType::Abn | TaxType::Both)
}

/// Wage exposure a recruiter must cover before auto-offering this job.
pub fn required_balance_for(job: &Job) -> f64 {
    job.salary_min * job.expected_hours.unwrap_or(DEFAULT_EXPECTED_HOURS)
}

fn sanitize_amount(amount: f64) -> f64 {
    if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    }
}
