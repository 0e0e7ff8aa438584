//! Publisher side of the scatter-gather protocol.
//!
//! A provider registers its id once, then answers every `metric_collect` with a
//! `metric_response`. An empty answer is still sent so the collector can count
//! the publisher as accounted for. Unregistration is not this loop's job; it comes
//! from outside (e.g. the peripheral hosting the publisher detaching).

use serde_json::Value;
use tracing::{debug, info};

use crate::kernel::bus::Bus;
use crate::kernel::error::PullError;
use crate::kernel::event::MetricCollectEvent;
use crate::kernel::pull::{EventPuller, Pulled};

/// Produces samples for one collect request.
///
/// Called synchronously on the provider's loop; it must not block.
pub trait MetricSource: Send {
    fn collect(&mut self, request_id: u64, collection_time_unix_nano: u64) -> Option<Vec<Value>>;
}

impl<F> MetricSource for F
where
    F: FnMut(u64, u64) -> Option<Vec<Value>> + Send,
{
    fn collect(&mut self, request_id: u64, collection_time_unix_nano: u64) -> Option<Vec<Value>> {
        self(request_id, collection_time_unix_nano)
    }
}

pub struct MetricProvider<S> {
    publisher_id: String,
    source: S,
    bus: Bus,
    puller: EventPuller,
}

impl<S: MetricSource> MetricProvider<S> {
    /// Subscribes immediately, so no collect request emitted after this call is missed.
    ///
    /// `publisher_id` must be unique among concurrently registered publishers.
    pub fn new(bus: &Bus, publisher_id: impl Into<String>, source: S) -> Self {
        Self {
            publisher_id: publisher_id.into(),
            source,
            bus: bus.clone(),
            puller: bus.subscribe(),
        }
    }

    pub fn publisher_id(&self) -> &str {
        &self.publisher_id
    }

    /// Registers and serves collect requests until `terminate` is observed.
    ///
    /// No retries: a round whose request never reaches this loop is simply missed.
    pub async fn run(mut self) -> Result<(), PullError> {
        info!(publisher = %self.publisher_id, "metric provider started");
        self.bus.register_publisher(self.publisher_id.as_str());

        loop {
            match self.puller.pull_as::<MetricCollectEvent>().await? {
                Pulled::Matched(request) => self.answer(request),
                Pulled::Other(event) if event.is_terminate() => {
                    info!(publisher = %self.publisher_id, "metric provider stopped");
                    return Ok(());
                }
                Pulled::Other(_) => {}
            }
        }
    }

    fn answer(&mut self, request: MetricCollectEvent) {
        let resource_metrics = self
            .source
            .collect(request.request_id, request.collection_time_unix_nano)
            .unwrap_or_default();
        debug!(
            publisher = %self.publisher_id,
            request_id = request.request_id,
            samples = resource_metrics.len(),
            "answering collect request"
        );
        self.bus.respond(request.request_id, self.publisher_id.as_str(), resource_metrics);
    }
}

