use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::metrics::MetricsData;
use crate::kernel::event::MetricResponseEvent;

/// One scatter-gather cycle, alive from the collect broadcast until flush.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionRound {
    pub request_id: u64,
    pub collection_time_unix_nano: u64,
    /// Live publisher count when the round opened. Later registrations don't move it.
    pub expected: usize,
    pub received: HashSet<String>,
    pub samples: Vec<Value>,
    pub empty_responses: usize,
}

impl CollectionRound {
    pub fn new(request_id: u64, collection_time_unix_nano: u64, expected: usize) -> Self {
        Self {
            request_id,
            collection_time_unix_nano,
            expected,
            received: HashSet::new(),
            samples: Vec::new(),
            empty_responses: 0,
        }
    }

    /// Records a response for this round.
    ///
    /// Returns `false` for a stale request id or a publisher that already answered;
    /// neither changes the round.
    pub fn accept(&mut self, response: MetricResponseEvent) -> bool {
        if response.request_id != self.request_id {
            return false;
        }
        if !self.received.insert(response.publisher_id) {
            return false;
        }
        if response.resource_metrics.is_empty() {
            self.empty_responses += 1;
        }
        self.samples.extend(response.resource_metrics);
        true
    }

    pub fn is_complete(&self) -> bool {
        self.received.len() >= self.expected
    }

    pub fn summary(&self, timed_out: bool) -> RoundSummary {
        RoundSummary {
            request_id: self.request_id,
            collection_time_unix_nano: self.collection_time_unix_nano,
            expected: self.expected,
            responded: self.received.len(),
            empty_responses: self.empty_responses,
            samples: self.samples.len(),
            timed_out,
        }
    }

    pub fn into_payload(self) -> MetricsData {
        MetricsData { resource_metrics: self.samples }
    }
}

/// What a closed round looked like. Observability only; the flushed payload
/// does not carry it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub request_id: u64,
    pub collection_time_unix_nano: u64,
    pub expected: usize,
    pub responded: usize,
    /// Publishers that answered with zero samples.
    pub empty_responses: usize,
    pub samples: usize,
    pub timed_out: bool,
}
