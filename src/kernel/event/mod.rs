//! Typed events decoded from positional signal tuples.
//!
//! On the wire every signal is a tuple `[discriminator, ...args]`. Each variant
//! here is a plain struct paired with:
//! - the discriminators it claims ([`EventKind::TYPES`]),
//! - the shape its tuple must satisfy ([`EventKind::shape`]),
//! - a canonical discriminator and positional argument list for re-encoding.
//!
//! Argument order is part of the external contract and must not be reshuffled.
//! Anything with an unregistered discriminator becomes a [`GenericEvent`].

mod input;
mod metric;
mod network;
mod system;

use serde_json::Value;

use super::error::{DecodeError, RegistryError};
use super::registry::RegistryBuilder;
use super::schema::{validate_tuple, Shape};

pub use input::{
    CharEvent, ComputerCommandEvent, KeyEvent, MouseEvent, MouseKind, PasteEvent, ResizeEvent,
};
pub use metric::{
    MetricCollectEvent, MetricEvent, MetricRegisterEvent, MetricResponseEvent,
    MetricUnregisterEvent,
};
pub use network::{
    HttpEvent, ModemMessageEvent, RednetMessageEvent, WebSocketCloseEvent, WebSocketConnectEvent,
    WebSocketMessageEvent,
};
pub use system::{
    DiskEvent, LogEvent, LogLevel, PeripheralEvent, RedstoneEvent, SpeakerAudioEmptyEvent,
    TaskCompleteEvent, TaskOutcome, TerminateEvent, TimerEvent, TurtleInventoryEvent,
};

/// A registered event variant.
pub trait EventKind: Sized + Into<Event> + TryFrom<Event, Error = Event> {
    /// Every discriminator this variant decodes.
    const TYPES: &'static [&'static str];

    /// Shape of the full tuple, discriminator included.
    fn shape() -> Shape;

    /// Builds the variant from a tuple that already passed [`EventKind::shape`].
    fn from_args(args: Args<'_>) -> Self;

    /// Canonical discriminator for this instance.
    fn name(&self) -> &'static str;

    /// Positional arguments, discriminator excluded.
    fn args(&self) -> Vec<Value>;

    fn decode(tuple: &[Value]) -> Result<Self, DecodeError> {
        validate_tuple(&Self::shape(), tuple).map_err(|issues| DecodeError {
            discriminator: tuple.first().and_then(Value::as_str).unwrap_or_default().to_string(),
            issues,
        })?;
        Ok(Self::from_args(Args::new(tuple)))
    }
}

/// Read access to a validated tuple.
///
/// Index 0 is the discriminator. Reads past the end, or of the wrong type, fall back
/// to the type's default; after validation that only happens for optional slots.
#[derive(Debug, Clone, Copy)]
pub struct Args<'a> {
    tuple: &'a [Value],
}

impl<'a> Args<'a> {
    pub fn new(tuple: &'a [Value]) -> Self {
        Self { tuple }
    }

    pub fn name(&self) -> &'a str {
        self.str(0)
    }

    pub fn get(&self, i: usize) -> &'a Value {
        self.tuple.get(i).unwrap_or(&Value::Null)
    }

    pub fn str(&self, i: usize) -> &'a str {
        self.get(i).as_str().unwrap_or_default()
    }

    pub fn opt_str(&self, i: usize) -> Option<String> {
        self.get(i).as_str().map(str::to_string)
    }

    pub fn int(&self, i: usize) -> i64 {
        self.opt_int(i).unwrap_or_default()
    }

    pub fn opt_int(&self, i: usize) -> Option<i64> {
        let v = self.get(i);
        v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))
    }

    pub fn float(&self, i: usize) -> f64 {
        self.get(i).as_f64().unwrap_or_default()
    }

    pub fn bool(&self, i: usize) -> bool {
        self.opt_bool(i).unwrap_or_default()
    }

    pub fn opt_bool(&self, i: usize) -> Option<bool> {
        self.get(i).as_bool()
    }

    /// `None` for absent and `null` alike.
    pub fn opt_value(&self, i: usize) -> Option<Value> {
        match self.get(i) {
            Value::Null => None,
            v => Some(v.clone()),
        }
    }

    pub fn rest(&self, from: usize) -> Vec<Value> {
        self.tuple.get(from..).map(<[Value]>::to_vec).unwrap_or_default()
    }
}

/// Fallback for tuples with no registered decoder. Never fails.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericEvent {
    pub tuple: Vec<Value>,
}

impl GenericEvent {
    pub fn new(tuple: Vec<Value>) -> Self {
        Self { tuple }
    }

    pub fn name(&self) -> &str {
        self.tuple.first().and_then(Value::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> Vec<Value> {
        self.tuple.get(1..).map(<[Value]>::to_vec).unwrap_or_default()
    }
}

macro_rules! events {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum Event {
            $($variant($ty),)*
            Generic(GenericEvent),
        }

        impl Event {
            /// Canonical discriminator.
            pub fn name(&self) -> &str {
                match self {
                    $(Event::$variant(ev) => ev.name(),)*
                    Event::Generic(ev) => ev.name(),
                }
            }

            /// Positional arguments, discriminator excluded.
            pub fn args(&self) -> Vec<Value> {
                match self {
                    $(Event::$variant(ev) => ev.args(),)*
                    Event::Generic(ev) => ev.args(),
                }
            }
        }

        $(
            impl From<$ty> for Event {
                fn from(ev: $ty) -> Self {
                    Event::$variant(ev)
                }
            }

            impl TryFrom<Event> for $ty {
                type Error = Event;

                fn try_from(event: Event) -> Result<Self, Event> {
                    match event {
                        Event::$variant(ev) => Ok(ev),
                        other => Err(other),
                    }
                }
            }
        )*

        pub(crate) fn register_all(
            builder: RegistryBuilder,
        ) -> Result<RegistryBuilder, RegistryError> {
            Ok(builder $(.register::<$ty>()?)*)
        }
    };
}

events! {
    Char(CharEvent),
    Key(KeyEvent),
    Paste(PasteEvent),
    Timer(TimerEvent),
    TaskComplete(TaskCompleteEvent),
    Redstone(RedstoneEvent),
    Terminate(TerminateEvent),
    Disk(DiskEvent),
    Peripheral(PeripheralEvent),
    RednetMessage(RednetMessageEvent),
    ModemMessage(ModemMessageEvent),
    Http(HttpEvent),
    WebSocketMessage(WebSocketMessageEvent),
    WebSocketClose(WebSocketCloseEvent),
    WebSocketConnect(WebSocketConnectEvent),
    Mouse(MouseEvent),
    Resize(ResizeEvent),
    TurtleInventory(TurtleInventoryEvent),
    SpeakerAudioEmpty(SpeakerAudioEmptyEvent),
    ComputerCommand(ComputerCommandEvent),
    Log(LogEvent),
    Metric(MetricEvent),
    MetricRegister(MetricRegisterEvent),
    MetricUnregister(MetricUnregisterEvent),
    MetricCollect(MetricCollectEvent),
    MetricResponse(MetricResponseEvent),
}

impl Event {
    /// Wire form: `[discriminator, ...args]` with trailing absent slots dropped.
    pub fn to_tuple(&self) -> Vec<Value> {
        let args = self.args();
        let mut tuple = Vec::with_capacity(1 + args.len());
        tuple.push(Value::from(self.name()));
        tuple.extend(args);
        while tuple.len() > 1 && tuple.last().is_some_and(Value::is_null) {
            tuple.pop();
        }
        tuple
    }

    pub fn is_terminate(&self) -> bool {
        matches!(self, Event::Terminate(_))
    }
}
