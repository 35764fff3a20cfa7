use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use quickstaff::config::AppConfig;
use quickstaff::workflows::quicksearch::{
    JitterSource, MatchConfig, Offer, OfferId, OfferSink, OfferSinkError, OfferStateError,
    TaxType,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) board: Arc<OfferBoard>,
}

/// Worker response applied to a stored offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OfferAction {
    Accept,
    Decline,
    Cancel,
}

/// In-memory home for dispatched offers. The dispatch workflow writes
/// through the sink seam; the lifecycle endpoints read and settle here.
#[derive(Default)]
pub(crate) struct OfferBoard {
    offers: Mutex<HashMap<OfferId, Offer>>,
}

impl OfferBoard {
    /// All stored offers in dispatch order.
    pub(crate) fn snapshot(&self) -> Vec<Offer> {
        let guard = self.offers.lock().expect("board mutex poisoned");
        let mut offers: Vec<Offer> = guard.values().cloned().collect();
        offers.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.0.cmp(&b.id.0))
        });
        offers
    }

    /// Apply a worker response. `None` means the offer id is unknown; the
    /// inner result reports transitions rejected by the offer itself.
    pub(crate) fn settle(
        &self,
        id: &OfferId,
        action: OfferAction,
        now: DateTime<Utc>,
    ) -> Option<Result<Offer, OfferStateError>> {
        let mut guard = self.offers.lock().expect("board mutex poisoned");
        let offer = guard.get_mut(id)?;
        let outcome = match action {
            OfferAction::Accept => offer.accept(now),
            OfferAction::Decline => offer.decline(now),
            OfferAction::Cancel => offer.cancel(now),
        };
        Some(outcome.map(|()| offer.clone()))
    }

    /// Persist lazy expiry for every pending offer past its deadline.
    /// Returns how many statuses flipped.
    pub(crate) fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut guard = self.offers.lock().expect("board mutex poisoned");
        guard
            .values_mut()
            .map(|offer| offer.mark_expired(now))
            .filter(|&flipped| flipped)
            .count()
    }
}

impl OfferSink for OfferBoard {
    fn create_offer(&self, offer: Offer) -> Result<(), OfferSinkError> {
        let mut guard = self.offers.lock().expect("board mutex poisoned");
        if guard.contains_key(&offer.id) {
            return Err(OfferSinkError::Rejected(format!(
                "offer {} already exists",
                offer.id.0
            )));
        }
        guard.insert(offer.id.clone(), offer);
        Ok(())
    }
}

pub(crate) fn default_match_config(config: &AppConfig) -> MatchConfig {
    MatchConfig {
        shortlist_limit: config.matching.shortlist_limit,
        jitter: match config.matching.jitter_seed {
            Some(seed) => JitterSource::Seeded(seed),
            None => JitterSource::Entropy,
        },
        ..MatchConfig::default()
    }
}

pub(crate) fn parse_tax_type(raw: &str) -> Result<TaxType, String> {
    TaxType::parse(raw)
        .ok_or_else(|| format!("unknown tax type '{raw}' (expected ABN, TFN or both)"))
}
