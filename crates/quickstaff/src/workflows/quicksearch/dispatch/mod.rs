//! Offer dispatch: auto-send, resend-on-decline, and the preview query.

pub mod eligibility;
pub mod outbox;
pub mod router;
pub mod service;

pub use eligibility::accepts_auto_offer;
pub use outbox::{MatchPreview, OfferSink, OfferSinkError, OfferView};
pub use router::dispatch_router;
pub use service::{DispatchRequest, OfferDispatchService};
