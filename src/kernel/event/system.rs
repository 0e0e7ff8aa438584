//! Host lifecycle events: timers, tasks, attached hardware and structured logs.

use serde_json::Value;

use super::{Args, EventKind};
use crate::kernel::schema::Shape;

/// Fired by the host once a timer (or an `alarm`) started earlier elapses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerEvent {
    pub id: u64,
    pub is_alarm: bool,
}

impl TimerEvent {
    pub fn timer(id: u64) -> Self {
        Self { id, is_alarm: false }
    }
}

impl EventKind for TimerEvent {
    const TYPES: &'static [&'static str] = &["timer", "alarm"];

    fn shape() -> Shape {
        Shape::union([
            Shape::event("timer", [Shape::Integer]),
            Shape::event("alarm", [Shape::Integer]),
        ])
    }

    fn from_args(args: Args<'_>) -> Self {
        Self {
            id: args.int(1).max(0) as u64,
            is_alarm: args.name() == "alarm",
        }
    }

    fn name(&self) -> &'static str {
        if self.is_alarm {
            "alarm"
        } else {
            "timer"
        }
    }

    fn args(&self) -> Vec<Value> {
        vec![Value::from(self.id)]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// Extra positional results of the task, kept verbatim.
    Success { params: Vec<Value> },
    /// An absent error message reads as the empty string.
    Failure { error: String },
}

/// Completion of an asynchronous host task. The boolean in slot 2 picks the shape.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCompleteEvent {
    pub id: i64,
    pub outcome: TaskOutcome,
}

impl TaskCompleteEvent {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Success { .. })
    }
}

impl EventKind for TaskCompleteEvent {
    const TYPES: &'static [&'static str] = &["task_complete"];

    fn shape() -> Shape {
        Shape::union([
            Shape::event("task_complete", [Shape::Integer, Shape::literal(true)]),
            Shape::event(
                "task_complete",
                [
                    Shape::Integer,
                    Shape::literal(false),
                    Shape::optional(Shape::String),
                ],
            ),
        ])
    }

    fn from_args(args: Args<'_>) -> Self {
        let outcome = if args.bool(2) {
            TaskOutcome::Success { params: args.rest(3) }
        } else {
            TaskOutcome::Failure {
                error: args.opt_str(3).unwrap_or_default(),
            }
        };
        Self { id: args.int(1), outcome }
    }

    fn name(&self) -> &'static str {
        "task_complete"
    }

    fn args(&self) -> Vec<Value> {
        let mut out = vec![Value::from(self.id)];
        match &self.outcome {
            TaskOutcome::Success { params } => {
                out.push(Value::Bool(true));
                out.extend(params.iter().cloned());
            }
            TaskOutcome::Failure { error } => {
                out.push(Value::Bool(false));
                out.push(Value::from(error.as_str()));
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedstoneEvent;

impl EventKind for RedstoneEvent {
    const TYPES: &'static [&'static str] = &["redstone"];

    fn shape() -> Shape {
        Shape::bare("redstone")
    }

    fn from_args(_args: Args<'_>) -> Self {
        RedstoneEvent
    }

    fn name(&self) -> &'static str {
        "redstone"
    }

    fn args(&self) -> Vec<Value> {
        Vec::new()
    }
}

/// Cooperative shutdown request. Loops act on it at their next pull point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerminateEvent;

impl EventKind for TerminateEvent {
    const TYPES: &'static [&'static str] = &["terminate"];

    fn shape() -> Shape {
        Shape::bare("terminate")
    }

    fn from_args(_args: Args<'_>) -> Self {
        TerminateEvent
    }

    fn name(&self) -> &'static str {
        "terminate"
    }

    fn args(&self) -> Vec<Value> {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskEvent {
    pub side: String,
    pub eject: bool,
}

impl EventKind for DiskEvent {
    const TYPES: &'static [&'static str] = &["disk", "disk_eject"];

    fn shape() -> Shape {
        Shape::union([
            Shape::event("disk", [Shape::String]),
            Shape::event("disk_eject", [Shape::String]),
        ])
    }

    fn from_args(args: Args<'_>) -> Self {
        Self {
            side: args.str(1).to_string(),
            eject: args.name() == "disk_eject",
        }
    }

    fn name(&self) -> &'static str {
        if self.eject {
            "disk_eject"
        } else {
            "disk"
        }
    }

    fn args(&self) -> Vec<Value> {
        vec![Value::from(self.side.as_str())]
    }
}

/// Attach or detach of a peripheral on `side`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeripheralEvent {
    pub side: String,
    pub detach: bool,
}

impl EventKind for PeripheralEvent {
    const TYPES: &'static [&'static str] = &["peripheral", "peripheral_detach"];

    fn shape() -> Shape {
        Shape::union([
            Shape::event("peripheral", [Shape::String]),
            Shape::event("peripheral_detach", [Shape::String]),
        ])
    }

    fn from_args(args: Args<'_>) -> Self {
        Self {
            side: args.str(1).to_string(),
            detach: args.name() == "peripheral_detach",
        }
    }

    fn name(&self) -> &'static str {
        if self.detach {
            "peripheral_detach"
        } else {
            "peripheral"
        }
    }

    fn args(&self) -> Vec<Value> {
        vec![Value::from(self.side.as_str())]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurtleInventoryEvent;

impl EventKind for TurtleInventoryEvent {
    const TYPES: &'static [&'static str] = &["turtle_inventory"];

    fn shape() -> Shape {
        Shape::bare("turtle_inventory")
    }

    fn from_args(_args: Args<'_>) -> Self {
        TurtleInventoryEvent
    }

    fn name(&self) -> &'static str {
        "turtle_inventory"
    }

    fn args(&self) -> Vec<Value> {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeakerAudioEmptyEvent {
    pub side: String,
}

impl EventKind for SpeakerAudioEmptyEvent {
    const TYPES: &'static [&'static str] = &["speaker_audio_empty"];

    fn shape() -> Shape {
        Shape::event("speaker_audio_empty", [Shape::String])
    }

    fn from_args(args: Args<'_>) -> Self {
        Self { side: args.str(1).to_string() }
    }

    fn name(&self) -> &'static str {
        "speaker_audio_empty"
    }

    fn args(&self) -> Vec<Value> {
        vec![Value::from(self.side.as_str())]
    }
}

/// Wire level is the index into `[Debug, Info, Warning, Error]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    const ALL: [LogLevel; 4] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
    ];

    pub fn from_wire(level: i64) -> Option<Self> {
        usize::try_from(level).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn as_wire(&self) -> i64 {
        *self as i64
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
    /// Source location of the emitting call, as reported by the host.
    pub info: Option<Value>,
    /// Stack of source locations, innermost first.
    pub trace: Option<Vec<Value>>,
}

impl LogEvent {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            info: None,
            trace: None,
        }
    }
}

impl EventKind for LogEvent {
    const TYPES: &'static [&'static str] = &["log"];

    fn shape() -> Shape {
        let level = Shape::union(LogLevel::ALL.iter().map(|l| Shape::literal(l.as_wire())));
        Shape::event(
            "log",
            [
                level,
                Shape::String,
                Shape::Any,
                Shape::optional(Shape::array(Shape::Any)),
            ],
        )
    }

    fn from_args(args: Args<'_>) -> Self {
        Self {
            level: LogLevel::from_wire(args.int(1)).unwrap_or(LogLevel::Debug),
            message: args.str(2).to_string(),
            info: args.opt_value(3),
            trace: args.get(4).as_array().cloned(),
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }

    fn args(&self) -> Vec<Value> {
        vec![
            Value::from(self.level.as_wire()),
            Value::from(self.message.as_str()),
            self.info.clone().unwrap_or(Value::Null),
            self.trace.clone().map(Value::Array).unwrap_or(Value::Null),
        ]
    }
}
