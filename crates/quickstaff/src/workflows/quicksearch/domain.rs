use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;

/// Identifier wrapper for posted jobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

/// Identifier wrapper for worker profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub String);

/// Identifier wrapper for dispatched offers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OfferId(pub String);

/// Worker reputation tier. Declaration order is the ladder, so the derived
/// `Ord` gives Bronze < Silver < Platinum < Gold < PRO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Badge {
    Bronze,
    Silver,
    Platinum,
    Gold,
    #[serde(rename = "PRO")]
    Pro,
}

impl Badge {
    pub const fn label(self) -> &'static str {
        match self {
            Badge::Bronze => "Bronze",
            Badge::Silver => "Silver",
            Badge::Platinum => "Platinum",
            Badge::Gold => "Gold",
            Badge::Pro => "PRO",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bronze" => Some(Badge::Bronze),
            "silver" => Some(Badge::Silver),
            "platinum" => Some(Badge::Platinum),
            "gold" => Some(Badge::Gold),
            "pro" => Some(Badge::Pro),
            _ => None,
        }
    }
}

/// Australian tax registration carried by jobs and worker profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxType {
    #[serde(rename = "ABN")]
    Abn,
    #[serde(rename = "TFN")]
    Tfn,
    #[serde(rename = "both")]
    Both,
}

impl TaxType {
    pub const fn label(self) -> &'static str {
        match self {
            TaxType::Abn => "ABN",
            TaxType::Tfn => "TFN",
            TaxType::Both => "both",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "abn" => Some(TaxType::Abn),
            "tfn" => Some(TaxType::Tfn),
            "both" => Some(TaxType::Both),
            _ => None,
        }
    }
}

/// How the recruiter settles wages for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Platform,
    Direct,
}

impl PaymentMethod {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentMethod::Platform => "platform",
            PaymentMethod::Direct => "direct",
        }
    }
}

/// Hourly pay band a worker is willing to accept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayRange {
    pub min: f64,
    pub max: f64,
}

impl PayRange {
    /// True when this band and `[salary_min, salary_max]` share any value.
    pub fn overlaps(&self, salary_min: f64, salary_max: f64) -> bool {
        self.min <= salary_max && salary_min <= self.max
    }
}

const DEFAULT_OFFER_EXPIRY_DAYS: i64 = 30;
// Windows beyond a year are treated as unset. Jobs arrive over the wire, and
// an unchecked i64 here would overflow the expiry arithmetic.
const MAX_OFFER_EXPIRY_DAYS: i64 = 365;

/// Immutable snapshot of the posted job passed into every workflow call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub industry: String,
    #[serde(default)]
    pub experience_years: u8,
    #[serde(default)]
    pub experience_months: u8,
    pub range_km: f64,
    pub salary_min: f64,
    pub salary_max: f64,
    pub tax_type: TaxType,
    pub payment_method: PaymentMethod,
    pub staff_count: u32,
    #[serde(default)]
    pub expected_hours: Option<f64>,
    #[serde(default)]
    pub offer_expiry_days: Option<i64>,
    #[serde(default)]
    pub recruiter_badge: Option<Badge>,
}

impl Job {
    /// Required experience expressed in fractional years.
    pub fn experience_years_total(&self) -> f64 {
        self.experience_years as f64 + self.experience_months as f64 / 12.0
    }

    /// Offer validity window in days. Missing values and values outside
    /// `1..=MAX_OFFER_EXPIRY_DAYS` fall back to the 30 day default, so
    /// `created_at + window` stays on the calendar and after `created_at`.
    pub fn expiry_window_days(&self) -> i64 {
        match self.offer_expiry_days {
            Some(days) if (1..=MAX_OFFER_EXPIRY_DAYS).contains(&days) => days,
            _ => DEFAULT_OFFER_EXPIRY_DAYS,
        }
    }
}

/// Worker profile supplied by the external store; read-only input here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub badge: Badge,
    pub industries: Vec<String>,
    pub preferred_roles: Vec<String>,
    pub tax_types: Vec<TaxType>,
    pub radius_km: f64,
    pub pay_preference: PayRange,
    pub experience_years: f64,
    pub acceptance_rating: f64,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// Recruiter-side Quick Search controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickSearchSettings {
    pub auto_matching_enabled: bool,
    pub min_badge: Option<Badge>,
    pub pro_only: bool,
}

/// Per-worker opt-in controls governing automatic offers. A worker with no
/// stored settings accepts quick offers, so that is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateSettings {
    pub quick_offers_enabled: bool,
    pub only_platform_payment: bool,
    pub only_sufficient_balance: bool,
    pub only_pro_badge_or_above: bool,
}

impl Default for CandidateSettings {
    fn default() -> Self {
        Self {
            quick_offers_enabled: true,
            only_platform_payment: false,
            only_sufficient_balance: false,
            only_pro_badge_or_above: false,
        }
    }
}

/// Offer lifecycle states. Every state other than `Pending` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
    Cancelled,
}

impl OfferStatus {
    pub const fn label(self) -> &'static str {
        match self {
            OfferStatus::Pending => "pending",
            OfferStatus::Accepted => "accepted",
            OfferStatus::Declined => "declined",
            OfferStatus::Expired => "expired",
            OfferStatus::Cancelled => "cancelled",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, OfferStatus::Pending)
    }
}

/// Time-boxed offer dispatched to one worker for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub job_id: JobId,
    pub candidate_id: CandidateId,
    pub status: OfferStatus,
    pub match_percentage: f64,
    pub message: String,
    pub auto_sent: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub responded_at: Option<DateTime<Utc>>,
}

impl Offer {
    /// Effective status once lazy expiry is taken into account. A stored
    /// `Pending` offer past `expires_at` reads as `Expired` here, which is
    /// the only way callers may interpret it.
    pub fn status_at(&self, now: DateTime<Utc>) -> OfferStatus {
        if self.status == OfferStatus::Pending && now > self.expires_at {
            OfferStatus::Expired
        } else {
            self.status
        }
    }

    pub fn accept(&mut self, now: DateTime<Utc>) -> Result<(), OfferStateError> {
        self.settle(OfferStatus::Accepted, now)
    }

    pub fn decline(&mut self, now: DateTime<Utc>) -> Result<(), OfferStateError> {
        self.settle(OfferStatus::Declined, now)
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<(), OfferStateError> {
        self.settle(OfferStatus::Cancelled, now)
    }

    /// Persist lazily observed expiry. Returns true when the stored status
    /// actually flipped.
    pub fn mark_expired(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == OfferStatus::Pending && now > self.expires_at {
            self.status = OfferStatus::Expired;
            true
        } else {
            false
        }
    }

    fn settle(&mut self, to: OfferStatus, now: DateTime<Utc>) -> Result<(), OfferStateError> {
        match self.status_at(now) {
            OfferStatus::Pending => {
                self.status = to;
                self.responded_at = Some(now);
                Ok(())
            }
            settled => Err(OfferStateError::AlreadySettled {
                offer: self.id.clone(),
                status: settled,
            }),
        }
    }
}

/// Rejected transition on an offer that already reached a final state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OfferStateError {
    #[error("offer {} is already {} and cannot change", .offer.0, .status.label())]
    AlreadySettled { offer: OfferId, status: OfferStatus },
}
