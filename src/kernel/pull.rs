//! Pull points: the only places a loop suspends.
//!
//! [`EventPuller::pull_raw`] waits for the next admitted tuple and decodes it.
//! There is no built-in timeout; callers race a timer signal in the same loop.
//!
//! `terminate` passes every filter. A loop waiting on a narrow filter still sees
//! shutdown and decides what to do with it.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::trace;

use super::bus::Tuple;
use super::error::PullError;
use super::event::{Event, EventKind, TerminateEvent};
use super::registry::Registry;

/// Result of a typed pull.
#[derive(Debug, Clone, PartialEq)]
pub enum Pulled<K> {
    Matched(K),
    /// Anything else that passed the filter, shutdown included.
    Other(Event),
}

impl<K> Pulled<K> {
    pub fn is_match(&self) -> bool {
        matches!(self, Pulled::Matched(_))
    }

    pub fn matched(self) -> Option<K> {
        match self {
            Pulled::Matched(k) => Some(k),
            Pulled::Other(_) => None,
        }
    }
}

#[derive(Debug)]
pub struct EventPuller {
    rx: mpsc::UnboundedReceiver<Arc<Tuple>>,
    registry: Arc<Registry>,
}

impl EventPuller {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<Arc<Tuple>>, registry: Arc<Registry>) -> Self {
        Self { rx, registry }
    }

    /// Fails only once every handle to the bus, timers included, is gone.
    async fn next_tuple(&mut self) -> Result<Arc<Tuple>, PullError> {
        self.rx.recv().await.ok_or(PullError::Closed)
    }

    /// Waits for the next tuple whose discriminator is in `filter` (any tuple when
    /// `None`) and decodes it.
    ///
    /// A decode mismatch is returned as an error, never skipped.
    pub async fn pull_raw(&mut self, filter: Option<&[&str]>) -> Result<Event, PullError> {
        loop {
            let tuple = self.next_tuple().await?;
            if admits(filter, &tuple) {
                return Ok(self.registry.decode(&tuple)?);
            }
        }
    }

    /// Pulls until something passes `K`'s own discriminator filter.
    pub async fn pull_as<K: EventKind>(&mut self) -> Result<Pulled<K>, PullError> {
        self.pull_as_with::<K>(None, &[]).await
    }

    /// Typed pull with an explicit filter and a reject-list.
    ///
    /// A non-matching event whose discriminator is in `reject` is dropped and the
    /// pull continues; any other non-matching event is returned as [`Pulled::Other`].
    pub async fn pull_as_with<K: EventKind>(
        &mut self,
        filter: Option<&[&str]>,
        reject: &[&str],
    ) -> Result<Pulled<K>, PullError> {
        let filter = filter.unwrap_or(K::TYPES);
        loop {
            let event = self.pull_raw(Some(filter)).await?;
            match K::try_from(event) {
                Ok(matched) => return Ok(Pulled::Matched(matched)),
                Err(other) if reject.contains(&other.name()) => {
                    trace!(signal = other.name(), "rejected signal skipped");
                }
                Err(other) => return Ok(Pulled::Other(other)),
            }
        }
    }
}

fn admits(filter: Option<&[&str]>, tuple: &[Value]) -> bool {
    let Some(names) = filter else {
        return true;
    };
    match tuple.first().and_then(Value::as_str) {
        Some(name) => name == TerminateEvent::TYPES[0] || names.contains(&name),
        None => false,
    }
}
