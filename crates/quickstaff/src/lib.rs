//! Quick Search core for an on-demand staffing marketplace.
//!
//! The crate scores and ranks worker candidates against a job, dispatches
//! time-boxed offers through an injected sink, derives a worker's travel
//! stage from GPS fixes, and computes recruiter balance exposure. All
//! persistence belongs to the caller; the workflows here compute the next
//! value and emit it.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
