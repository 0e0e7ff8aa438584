//! Coordinator side of the scatter-gather protocol.
//!
//! ```text
//! IDLE ──(interval timer)──► COLLECTING(round)
//!   ▲                              │
//!   └──(all answered | deadline)───┘
//! ```
//!
//! The live publisher set follows `metric_register` / `metric_unregister` at all
//! times, including mid-round, but a round's `expected` is fixed when it opens.
//! Partial rounds are the normal outcome of churn, not an error. The interval timer
//! is re-armed only after a round is flushed.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::metrics::MetricsData;
use super::recorder::{RoundRecorder, RoundStats};
use super::round::CollectionRound;
use crate::kernel::bus::Bus;
use crate::kernel::error::PullError;
use crate::kernel::event::Event;
use crate::kernel::pull::EventPuller;
use crate::kernel::time::millis_to_unix_nanos;

pub const MIN_INTERVAL_SECONDS: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Seconds between the end of one round and the start of the next.
    pub interval_seconds: f64,
    /// Round deadline; half the interval when unset.
    pub response_timeout_seconds: Option<f64>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 1.0,
            response_timeout_seconds: None,
        }
    }
}

impl CollectorConfig {
    pub fn new(interval_seconds: f64) -> Self {
        Self {
            interval_seconds,
            response_timeout_seconds: None,
        }
    }

    pub fn with_response_timeout(mut self, seconds: f64) -> Self {
        self.response_timeout_seconds = Some(seconds);
        self
    }

    /// Clamped to [`MIN_INTERVAL_SECONDS`].
    pub fn interval(&self) -> Duration {
        seconds(self.interval_seconds.max(MIN_INTERVAL_SECONDS))
    }

    pub fn response_timeout(&self) -> Duration {
        match self.response_timeout_seconds {
            Some(s) => seconds(s.max(0.0)),
            None => self.interval() / 2,
        }
    }
}

/// Saturates at [`Duration::MAX`]; inputs are already clamped to be non-negative.
fn seconds(s: f64) -> Duration {
    Duration::try_from_secs_f64(s).unwrap_or(Duration::MAX)
}

type FlushFn = Box<dyn FnMut(MetricsData) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundEnd {
    Complete,
    TimedOut,
    Terminated,
}

pub struct MetricCollector {
    config: CollectorConfig,
    bus: Bus,
    puller: EventPuller,
    publishers: HashSet<String>,
    next_request_id: u64,
    on_flush: Option<FlushFn>,
    recorder: RoundRecorder,
}

impl MetricCollector {
    /// Subscribes immediately; registrations emitted after this call are tracked.
    pub fn new(bus: &Bus, config: CollectorConfig) -> Self {
        Self {
            config,
            bus: bus.clone(),
            puller: bus.subscribe(),
            publishers: HashSet::new(),
            next_request_id: 1,
            on_flush: None,
            recorder: RoundRecorder::new(),
        }
    }

    /// Hands each flushed payload to `flush` instead of broadcasting a `metric` signal.
    pub fn on_flush(mut self, flush: impl FnMut(MetricsData) + Send + 'static) -> Self {
        self.on_flush = Some(Box::new(flush));
        self
    }

    pub fn publishers(&self) -> impl Iterator<Item = &str> {
        self.publishers.iter().map(String::as_str)
    }

    pub fn recorder(&self) -> &RoundRecorder {
        &self.recorder
    }

    pub fn stats(&self) -> RoundStats {
        self.recorder.snapshot()
    }

    /// Runs rounds until `terminate` is observed, outside or inside a round.
    pub async fn run(&mut self) -> Result<(), PullError> {
        let interval = self.config.interval();
        info!(
            interval_ms = interval.as_millis() as u64,
            timeout_ms = self.config.response_timeout().as_millis() as u64,
            "metric collector started"
        );
        let mut timer_id = self.bus.start_timer(interval);

        loop {
            match self.puller.pull_raw(None).await? {
                Event::MetricRegister(ev) => self.track(ev.publisher_id),
                Event::MetricUnregister(ev) => self.untrack(&ev.publisher_id),
                Event::Timer(timer) if !timer.is_alarm && timer.id == timer_id => {
                    if self.collect_round().await? == RoundEnd::Terminated {
                        break;
                    }
                    timer_id = self.bus.start_timer(interval);
                }
                Event::Terminate(_) => break,
                _ => {}
            }
        }

        info!(rounds = self.next_request_id - 1, "metric collector stopped");
        Ok(())
    }

    async fn collect_round(&mut self) -> Result<RoundEnd, PullError> {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        let collection_time_unix_nano = millis_to_unix_nanos(self.bus.now_unix_millis());

        self.bus.request_collect(request_id, collection_time_unix_nano);
        let expected = self.publishers.len();
        let mut round = CollectionRound::new(request_id, collection_time_unix_nano, expected);
        let deadline = self.bus.start_timer(self.config.response_timeout());
        debug!(request_id, expected = round.expected, "collection round opened");

        let end = loop {
            if round.is_complete() {
                break RoundEnd::Complete;
            }
            match self.puller.pull_raw(None).await? {
                Event::MetricResponse(response) => {
                    let publisher = response.publisher_id.clone();
                    let response_id = response.request_id;
                    if !round.accept(response) {
                        debug!(
                            request_id,
                            response_id,
                            %publisher,
                            "stale or duplicate response dropped"
                        );
                    }
                }
                Event::MetricRegister(ev) => self.track(ev.publisher_id),
                Event::MetricUnregister(ev) => self.untrack(&ev.publisher_id),
                Event::Timer(timer) if !timer.is_alarm && timer.id == deadline => {
                    break RoundEnd::TimedOut;
                }
                Event::Terminate(_) => break RoundEnd::Terminated,
                _ => {}
            }
        };

        if end == RoundEnd::Terminated {
            info!(
                request_id,
                responded = round.received.len(),
                "terminated mid-round; round discarded"
            );
            return Ok(end);
        }

        let summary = round.summary(end == RoundEnd::TimedOut);
        debug!(
            request_id,
            expected = summary.expected,
            responded = summary.responded,
            samples = summary.samples,
            timed_out = summary.timed_out,
            "collection round closed"
        );
        self.recorder.record(summary);
        self.flush(round.into_payload());
        Ok(end)
    }

    fn flush(&mut self, data: MetricsData) {
        match self.on_flush.as_mut() {
            Some(flush) => flush(data),
            None => self.bus.metric(data),
        }
    }

    fn track(&mut self, publisher_id: String) {
        if self.publishers.insert(publisher_id.clone()) {
            let live = self.publishers.len();
            debug!(publisher = %publisher_id, live, "publisher registered");
        }
    }

    fn untrack(&mut self, publisher_id: &str) {
        if self.publishers.remove(publisher_id) {
            let live = self.publishers.len();
            debug!(publisher = %publisher_id, live, "publisher unregistered");
        }
    }
}
