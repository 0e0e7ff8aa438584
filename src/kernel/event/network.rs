//! Networking events: rednet/modem messages, HTTP requests and websockets.
//!
//! Handles returned by the host (HTTP responses, websocket objects) are opaque and
//! carried as raw values.

use serde_json::Value;

use super::{Args, EventKind};
use crate::kernel::schema::Shape;

#[derive(Debug, Clone, PartialEq)]
pub struct RednetMessageEvent {
    pub sender: i64,
    pub message: Value,
    pub protocol: Option<String>,
}

impl EventKind for RednetMessageEvent {
    const TYPES: &'static [&'static str] = &["rednet_message"];

    fn shape() -> Shape {
        Shape::event(
            "rednet_message",
            [Shape::Integer, Shape::Any, Shape::optional(Shape::String)],
        )
    }

    fn from_args(args: Args<'_>) -> Self {
        Self {
            sender: args.int(1),
            message: args.get(2).clone(),
            protocol: args.opt_str(3),
        }
    }

    fn name(&self) -> &'static str {
        "rednet_message"
    }

    fn args(&self) -> Vec<Value> {
        vec![
            Value::from(self.sender),
            self.message.clone(),
            self.protocol.as_deref().map(Value::from).unwrap_or(Value::Null),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModemMessageEvent {
    pub side: String,
    pub channel: i64,
    pub reply_channel: i64,
    pub message: Value,
    pub distance: f64,
}

impl EventKind for ModemMessageEvent {
    const TYPES: &'static [&'static str] = &["modem_message"];

    fn shape() -> Shape {
        Shape::event(
            "modem_message",
            [
                Shape::String,
                Shape::Integer,
                Shape::Integer,
                Shape::Any,
                Shape::Number,
            ],
        )
    }

    fn from_args(args: Args<'_>) -> Self {
        Self {
            side: args.str(1).to_string(),
            channel: args.int(2),
            reply_channel: args.int(3),
            message: args.get(4).clone(),
            distance: args.float(5),
        }
    }

    fn name(&self) -> &'static str {
        "modem_message"
    }

    fn args(&self) -> Vec<Value> {
        vec![
            Value::from(self.side.as_str()),
            Value::from(self.channel),
            Value::from(self.reply_channel),
            self.message.clone(),
            Value::from(self.distance),
        ]
    }
}

/// Result of an HTTP request. `error` is `None` exactly for `http_success`.
///
/// A failure without a message decodes with an empty error string.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpEvent {
    pub url: String,
    pub handle: Option<Value>,
    pub error: Option<String>,
}

impl EventKind for HttpEvent {
    const TYPES: &'static [&'static str] = &["http_success", "http_failure"];

    fn shape() -> Shape {
        Shape::union([
            Shape::event("http_success", [Shape::String, Shape::Any]),
            Shape::event(
                "http_failure",
                [Shape::String, Shape::optional(Shape::String), Shape::Any],
            ),
        ])
    }

    fn from_args(args: Args<'_>) -> Self {
        let url = args.str(1).to_string();
        if args.name() == "http_success" {
            Self { url, handle: args.opt_value(2), error: None }
        } else {
            Self {
                url,
                handle: args.opt_value(3),
                error: Some(args.opt_str(2).unwrap_or_default()),
            }
        }
    }

    fn name(&self) -> &'static str {
        match self.error {
            None => "http_success",
            Some(_) => "http_failure",
        }
    }

    fn args(&self) -> Vec<Value> {
        let handle = self.handle.clone().unwrap_or(Value::Null);
        match &self.error {
            None => vec![Value::from(self.url.as_str()), handle],
            Some(error) => vec![
                Value::from(self.url.as_str()),
                Value::from(error.as_str()),
                handle,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebSocketMessageEvent {
    pub url: String,
    pub content: String,
    pub is_binary: bool,
}

impl EventKind for WebSocketMessageEvent {
    const TYPES: &'static [&'static str] = &["websocket_message"];

    fn shape() -> Shape {
        Shape::event("websocket_message", [Shape::String, Shape::String, Shape::Boolean])
    }

    fn from_args(args: Args<'_>) -> Self {
        Self {
            url: args.str(1).to_string(),
            content: args.str(2).to_string(),
            is_binary: args.bool(3),
        }
    }

    fn name(&self) -> &'static str {
        "websocket_message"
    }

    fn args(&self) -> Vec<Value> {
        vec![
            Value::from(self.url.as_str()),
            Value::from(self.content.as_str()),
            Value::from(self.is_binary),
        ]
    }
}

/// `reason` and `code` stay `None` when the host omits them; `Some("")` is a real empty reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebSocketCloseEvent {
    pub url: String,
    pub reason: Option<String>,
    pub code: Option<i64>,
}

impl EventKind for WebSocketCloseEvent {
    const TYPES: &'static [&'static str] = &["websocket_closed"];

    fn shape() -> Shape {
        Shape::event(
            "websocket_closed",
            [
                Shape::String,
                Shape::optional(Shape::String),
                Shape::optional(Shape::Integer),
            ],
        )
    }

    fn from_args(args: Args<'_>) -> Self {
        Self {
            url: args.str(1).to_string(),
            reason: args.opt_str(2),
            code: args.opt_int(3),
        }
    }

    fn name(&self) -> &'static str {
        "websocket_closed"
    }

    fn args(&self) -> Vec<Value> {
        vec![
            Value::from(self.url.as_str()),
            self.reason.as_deref().map(Value::from).unwrap_or(Value::Null),
            self.code.map(Value::from).unwrap_or(Value::Null),
        ]
    }
}

/// Outcome of opening a websocket. `error` is `None` exactly for `websocket_success`.
#[derive(Debug, Clone, PartialEq)]
pub struct WebSocketConnectEvent {
    pub handle: Option<Value>,
    pub error: Option<String>,
}

impl EventKind for WebSocketConnectEvent {
    const TYPES: &'static [&'static str] = &["websocket_success", "websocket_failure"];

    fn shape() -> Shape {
        Shape::union([
            Shape::event("websocket_success", [Shape::Any]),
            Shape::event("websocket_failure", [Shape::optional(Shape::String)]),
        ])
    }

    fn from_args(args: Args<'_>) -> Self {
        if args.name() == "websocket_success" {
            Self { handle: args.opt_value(1), error: None }
        } else {
            Self {
                handle: None,
                error: Some(args.opt_str(1).unwrap_or_default()),
            }
        }
    }

    fn name(&self) -> &'static str {
        match self.error {
            None => "websocket_success",
            Some(_) => "websocket_failure",
        }
    }

    fn args(&self) -> Vec<Value> {
        match &self.error {
            Some(error) => vec![Value::from(error.as_str())],
            None => vec![self.handle.clone().unwrap_or(Value::Null)],
        }
    }
}
