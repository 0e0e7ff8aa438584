//! Terminal input: keyboard, pointer, paste, resize and shell command events.

use serde_json::Value;

use super::{Args, EventKind};
use crate::kernel::schema::Shape;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharEvent {
    pub character: String,
}

impl EventKind for CharEvent {
    const TYPES: &'static [&'static str] = &["char"];

    fn shape() -> Shape {
        Shape::event("char", [Shape::String])
    }

    fn from_args(args: Args<'_>) -> Self {
        Self { character: args.str(1).to_string() }
    }

    fn name(&self) -> &'static str {
        "char"
    }

    fn args(&self) -> Vec<Value> {
        vec![Value::from(self.character.as_str())]
    }
}

/// `key` carries a held flag that defaults to `false` when absent; `key_up` never does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: i64,
    pub is_held: bool,
    pub is_up: bool,
}

impl EventKind for KeyEvent {
    const TYPES: &'static [&'static str] = &["key", "key_up"];

    fn shape() -> Shape {
        Shape::union([
            Shape::event("key", [Shape::Integer, Shape::optional(Shape::Boolean)]),
            Shape::event("key_up", [Shape::Integer]),
        ])
    }

    fn from_args(args: Args<'_>) -> Self {
        let is_up = args.name() == "key_up";
        Self {
            key: args.int(1),
            is_held: !is_up && args.bool(2),
            is_up,
        }
    }

    fn name(&self) -> &'static str {
        if self.is_up {
            "key_up"
        } else {
            "key"
        }
    }

    fn args(&self) -> Vec<Value> {
        if self.is_up {
            vec![Value::from(self.key)]
        } else {
            vec![Value::from(self.key), Value::from(self.is_held)]
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteEvent {
    pub text: String,
}

impl EventKind for PasteEvent {
    const TYPES: &'static [&'static str] = &["paste"];

    fn shape() -> Shape {
        Shape::event("paste", [Shape::String])
    }

    fn from_args(args: Args<'_>) -> Self {
        Self { text: args.str(1).to_string() }
    }

    fn name(&self) -> &'static str {
        "paste"
    }

    fn args(&self) -> Vec<Value> {
        vec![Value::from(self.text.as_str())]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseKind {
    Click,
    Up,
    Scroll,
    Drag,
    Touch,
    Move,
}

impl MouseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MouseKind::Click => "mouse_click",
            MouseKind::Up => "mouse_up",
            MouseKind::Scroll => "mouse_scroll",
            MouseKind::Drag => "mouse_drag",
            MouseKind::Touch => "monitor_touch",
            MouseKind::Move => "mouse_move",
        }
    }

    fn from_name(name: &str) -> Self {
        match name {
            "mouse_up" => MouseKind::Up,
            "mouse_scroll" => MouseKind::Scroll,
            "mouse_drag" => MouseKind::Drag,
            "monitor_touch" => MouseKind::Touch,
            "mouse_move" => MouseKind::Move,
            _ => MouseKind::Click,
        }
    }
}

/// Pointer family. The first argument is a monitor side for [`MouseKind::Touch`]
/// and a button (or scroll direction) for every other kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MouseEvent {
    pub kind: MouseKind,
    pub button: i64,
    pub side: Option<String>,
    pub x: i64,
    pub y: i64,
}

impl EventKind for MouseEvent {
    const TYPES: &'static [&'static str] = &[
        "mouse_click",
        "mouse_up",
        "mouse_scroll",
        "mouse_drag",
        "monitor_touch",
        "mouse_move",
    ];

    fn shape() -> Shape {
        Shape::union(Self::TYPES.iter().map(|&name| {
            let first = if name == "monitor_touch" { Shape::String } else { Shape::Integer };
            Shape::event(name, [first, Shape::Integer, Shape::Integer])
        }))
    }

    fn from_args(args: Args<'_>) -> Self {
        let kind = MouseKind::from_name(args.name());
        let (button, side) = match kind {
            MouseKind::Touch => (0, Some(args.str(1).to_string())),
            _ => (args.int(1), None),
        };
        Self {
            kind,
            button,
            side,
            x: args.int(2),
            y: args.int(3),
        }
    }

    fn name(&self) -> &'static str {
        self.kind.as_str()
    }

    fn args(&self) -> Vec<Value> {
        let first = match self.kind {
            MouseKind::Touch => Value::from(self.side.clone().unwrap_or_default()),
            _ => Value::from(self.button),
        };
        vec![first, Value::from(self.x), Value::from(self.y)]
    }
}

/// `term_resize` has no side; `monitor_resize` names the monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeEvent {
    pub side: Option<String>,
}

impl EventKind for ResizeEvent {
    const TYPES: &'static [&'static str] = &["term_resize", "monitor_resize"];

    fn shape() -> Shape {
        Shape::union([
            Shape::bare("term_resize"),
            Shape::event("monitor_resize", [Shape::String]),
        ])
    }

    fn from_args(args: Args<'_>) -> Self {
        let side = match args.name() {
            "monitor_resize" => args.opt_str(1),
            _ => None,
        };
        Self { side }
    }

    fn name(&self) -> &'static str {
        match self.side {
            Some(_) => "monitor_resize",
            None => "term_resize",
        }
    }

    fn args(&self) -> Vec<Value> {
        match &self.side {
            Some(side) => vec![Value::from(side.as_str())],
            None => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputerCommandEvent {
    pub args: Vec<String>,
}

impl EventKind for ComputerCommandEvent {
    const TYPES: &'static [&'static str] = &["computer_command"];

    fn shape() -> Shape {
        Shape::bare("computer_command")
    }

    fn from_args(args: Args<'_>) -> Self {
        let args = args
            .rest(1)
            .into_iter()
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();
        Self { args }
    }

    fn name(&self) -> &'static str {
        "computer_command"
    }

    fn args(&self) -> Vec<Value> {
        self.args.iter().map(|a| Value::from(a.as_str())).collect()
    }
}
