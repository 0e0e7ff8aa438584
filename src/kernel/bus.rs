//! # In-process signal host.
//!
//! [`Bus`] plays the part of the host scheduler: it carries raw tuples between
//! loops, runs timers and tells the time. Every [`EventPuller`] owns its own
//! unbounded queue, and `emit` fans a signal out to all of them under one lock,
//! so every puller observes every signal emitted after it subscribed, in the
//! same order.
//!
//! ```text
//!   emit ──┐                  ┌──► mpsc ──► EventPuller (collector)
//!   timer ─┼──► Bus (fan-out) ┼──► mpsc ──► EventPuller (provider a)
//!   emit ──┘                  └──► mpsc ──► EventPuller (provider b)
//! ```
//!
//! ## Rules
//! - `emit` never blocks. With no subscribers the signal is dropped.
//! - No signal is ever skipped for a live subscriber; a slow loop only builds a
//!   backlog. Timer signals in particular always arrive.
//! - A dropped [`EventPuller`] is pruned on the next emit.
//! - Timers are one-shot: `start_timer` returns an id and a `timer` signal carrying
//!   that id is emitted once the duration elapses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

use super::event::{
    Event, EventKind, LogEvent, LogLevel, MetricCollectEvent, MetricEvent, MetricRegisterEvent,
    MetricResponseEvent, MetricUnregisterEvent, TerminateEvent, TimerEvent,
};
use super::pull::EventPuller;
use super::registry::Registry;
use super::telemetry::MetricsData;
use super::time::Clock;

/// Raw wire form of a signal: `[discriminator, ...args]`.
pub type Tuple = Vec<Value>;

type Subscribers = Arc<Mutex<Vec<mpsc::UnboundedSender<Arc<Tuple>>>>>;

fn fan_out(subscribers: &Subscribers, tuple: Tuple) {
    let tuple = Arc::new(tuple);
    let mut subscribers = subscribers.lock().unwrap_or_else(PoisonError::into_inner);
    subscribers.retain(|tx| tx.send(Arc::clone(&tuple)).is_ok());
}

#[derive(Clone, Debug)]
pub struct Bus {
    subscribers: Subscribers,
    registry: Arc<Registry>,
    clock: Clock,
    next_timer: Arc<AtomicU64>,
}

impl Bus {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_clock(registry, Clock::system())
    }

    /// A bus whose wall clock starts at a fixed instant.
    pub fn with_clock(registry: Arc<Registry>, clock: Clock) -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            registry,
            clock,
            next_timer: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Emits `[name, ...args]` to every current subscriber.
    pub fn emit(&self, name: &str, args: impl IntoIterator<Item = Value>) {
        let mut tuple = vec![Value::from(name)];
        tuple.extend(args);
        self.emit_raw(tuple);
    }

    pub fn emit_raw(&self, tuple: Tuple) {
        trace!(signal = ?tuple.first(), "emit");
        fan_out(&self.subscribers, tuple);
    }

    /// Emits the canonical wire form of `event`.
    pub fn emit_event(&self, event: impl Into<Event>) {
        self.emit_raw(event.into().to_tuple());
    }

    pub fn terminate(&self) {
        self.emit_raw(vec![Value::from(TerminateEvent::TYPES[0])]);
    }

    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.emit_event(LogEvent::new(level, message));
    }

    pub fn metric(&self, data: MetricsData) {
        self.emit_event(MetricEvent { data });
    }

    pub fn register_publisher(&self, publisher_id: impl Into<String>) {
        self.emit_event(MetricRegisterEvent {
            publisher_id: publisher_id.into(),
        });
    }

    pub fn unregister_publisher(&self, publisher_id: impl Into<String>) {
        self.emit_event(MetricUnregisterEvent {
            publisher_id: publisher_id.into(),
        });
    }

    pub fn request_collect(&self, request_id: u64, collection_time_unix_nano: u64) {
        self.emit_event(MetricCollectEvent {
            request_id,
            collection_time_unix_nano,
        });
    }

    pub fn respond(
        &self,
        request_id: u64,
        publisher_id: impl Into<String>,
        resource_metrics: Vec<Value>,
    ) {
        self.emit_event(MetricResponseEvent {
            request_id,
            publisher_id: publisher_id.into(),
            resource_metrics,
        });
    }

    /// Starts a one-shot timer and returns its id.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_timer(&self, after: Duration) -> u64 {
        let id = self.next_timer.fetch_add(1, Ordering::Relaxed);
        let subscribers = Arc::clone(&self.subscribers);
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            fan_out(&subscribers, Event::from(TimerEvent::timer(id)).to_tuple());
        });
        id
    }

    pub fn now_unix_millis(&self) -> u64 {
        self.clock.now_unix_millis()
    }

    /// A new pull point that observes signals emitted from now on.
    pub fn subscribe(&self) -> EventPuller {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        EventPuller::new(rx, Arc::clone(&self.registry))
    }
}
