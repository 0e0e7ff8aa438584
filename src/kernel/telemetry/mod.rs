//! Metrics scatter-gather over the signal bus.
//!
//! # Protocol
//! - A provider announces itself with `metric_register` and answers every
//!   `metric_collect` with a `metric_response` echoing the request id.
//! - The collector opens a round per interval, waits for every publisher it knew
//!   about at the start or for the round deadline, whichever comes first, then
//!   flushes whatever arrived as one `metric` payload.
//!
//! Samples are forwarded untouched. [`metrics`] has a typed model for producers
//! that want one, but nothing on the collection path inspects sample contents.

pub mod collector;
pub mod metrics;
pub mod provider;
pub mod recorder;
pub mod round;

pub use collector::{CollectorConfig, MetricCollector, MIN_INTERVAL_SECONDS};
pub use metrics::MetricsData;
pub use provider::{MetricProvider, MetricSource};
pub use recorder::{RoundRecorder, RoundStats};
pub use round::{CollectionRound, RoundSummary};
