use std::collections::VecDeque;

use super::round::RoundSummary;

const MAX_ROUNDS: usize = 1_024;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoundStats {
    pub rounds: u64,
    pub timed_out: u64,
    pub total_expected: u64,
    pub total_responded: u64,
    pub empty_responses: u64,
    pub total_samples: u64,
    /// Mean of responded / expected over rounds that expected anyone.
    pub avg_response_ratio: f64,
}

/// Bounded history of closed rounds, oldest evicted first.
#[derive(Debug)]
pub struct RoundRecorder {
    buffer: VecDeque<RoundSummary>,
}

impl RoundRecorder {
    pub fn new() -> Self {
        Self {
            buffer: VecDeque::with_capacity(MAX_ROUNDS),
        }
    }

    pub fn record(&mut self, summary: RoundSummary) {
        if self.buffer.len() >= MAX_ROUNDS {
            self.buffer.pop_front();
        }
        self.buffer.push_back(summary);
    }

    pub fn last(&self) -> Option<&RoundSummary> {
        self.buffer.back()
    }

    pub fn rounds(&self) -> impl Iterator<Item = &RoundSummary> {
        self.buffer.iter()
    }

    pub fn snapshot(&self) -> RoundStats {
        compute_stats(&self.buffer)
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for RoundRecorder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn compute_stats(rounds: &VecDeque<RoundSummary>) -> RoundStats {
    let mut stats = RoundStats::default();
    let mut ratio_sum = 0.0;
    let mut ratio_count = 0u64;

    for round in rounds {
        stats.rounds += 1;
        if round.timed_out {
            stats.timed_out += 1;
        }
        stats.total_expected += round.expected as u64;
        stats.total_responded += round.responded as u64;
        stats.empty_responses += round.empty_responses as u64;
        stats.total_samples += round.samples as u64;

        if round.expected > 0 {
            // Late registrations can answer too, so a round may exceed 1.0.
            ratio_sum += round.responded as f64 / round.expected as f64;
            ratio_count += 1;
        }
    }

    if ratio_count > 0 {
        stats.avg_response_ratio = ratio_sum / ratio_count as f64;
    }

    stats
}
