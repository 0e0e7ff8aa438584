//! Shape validation for untyped signal payloads.
//!
//! A [`Shape`] describes what an untyped [`Value`] must look like. Validation never
//! stops at the first bad leaf: every failing position is reported as an [`Issue`]
//! carrying the path to it, so decode failures are diagnosable from a log line.
//!
//! Positions past the end of a tuple read as `null`, which is how the host
//! represents a trailing argument that was never sent.

use std::fmt;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(i) => write!(f, "[{i}]"),
            PathSegment::Key(k) => write!(f, ".{k}"),
        }
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub path: Vec<PathSegment>,
    pub message: String,
    pub expected: Option<&'static str>,
    pub received: Option<&'static str>,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "$")?;
        }
        for seg in &self.path {
            write!(f, "{seg}")?;
        }
        write!(f, ": {}", self.message)?;
        if let (Some(expected), Some(received)) = (self.expected, self.received) {
            write!(f, " (expected {expected}, received {received})")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Anything, including an absent value.
    Any,
    String,
    Number,
    /// A number with no fractional part.
    Integer,
    Boolean,
    Literal(Value),
    /// Accepts `null`/absent, otherwise defers to the inner shape.
    Optional(Box<Shape>),
    Array(Box<Shape>),
    Object(Vec<(&'static str, Shape)>),
    /// Positional elements. Elements beyond the declared ones are allowed.
    Tuple(Vec<Shape>),
    /// First matching option wins.
    Union(Vec<Shape>),
}

impl Shape {
    pub fn literal(value: impl Into<Value>) -> Self {
        Shape::Literal(value.into())
    }

    pub fn optional(inner: Shape) -> Self {
        Shape::Optional(Box::new(inner))
    }

    pub fn array(item: Shape) -> Self {
        Shape::Array(Box::new(item))
    }

    /// Tuple whose first element is the literal discriminator `name`.
    pub fn event(name: &'static str, args: impl IntoIterator<Item = Shape>) -> Self {
        let mut items = vec![Shape::literal(name)];
        items.extend(args);
        Shape::Tuple(items)
    }

    /// Tuple holding only the discriminator.
    pub fn bare(name: &'static str) -> Self {
        Shape::Tuple(vec![Shape::literal(name)])
    }

    pub fn union(options: impl IntoIterator<Item = Shape>) -> Self {
        Shape::Union(options.into_iter().collect())
    }
}

/// Validates a single value.
pub fn validate(shape: &Shape, value: &Value) -> Result<(), Vec<Issue>> {
    let mut checker = Checker::default();
    if checker.check(shape, value) {
        Ok(())
    } else {
        Err(checker.issues)
    }
}

/// Validates a positional tuple without first wrapping it in an array value.
pub fn validate_tuple(shape: &Shape, tuple: &[Value]) -> Result<(), Vec<Issue>> {
    let mut checker = Checker::default();
    if checker.check_seq(shape, tuple) {
        Ok(())
    } else {
        Err(checker.issues)
    }
}

pub fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            n.is_i64()
                || n.is_u64()
                || n.as_f64().is_some_and(|f| f.is_finite() && f.fract() == 0.0)
        }
        _ => false,
    }
}

#[derive(Default)]
struct Checker {
    path: Vec<PathSegment>,
    issues: Vec<Issue>,
}

impl Checker {
    fn issue(&mut self, message: &str, expected: &'static str, value: &Value) {
        self.issues.push(Issue {
            path: self.path.clone(),
            message: message.to_string(),
            expected: Some(expected),
            received: Some(type_of(value)),
        });
    }

    fn check(&mut self, shape: &Shape, value: &Value) -> bool {
        match shape {
            Shape::Any => true,
            Shape::String => self.expect(value.is_string(), "Expected string", "string", value),
            Shape::Number => self.expect(value.is_number(), "Expected number", "number", value),
            Shape::Integer => self.expect(is_integer(value), "Expected integer", "integer", value),
            Shape::Boolean => self.expect(value.is_boolean(), "Expected boolean", "boolean", value),
            Shape::Literal(lit) => self.expect(
                literal_eq(lit, value),
                "Expected literal value",
                "literal",
                value,
            ),
            Shape::Optional(inner) => value.is_null() || self.check(inner, value),
            Shape::Array(item) => match value {
                Value::Array(items) => {
                    let mut ok = true;
                    for (i, v) in items.iter().enumerate() {
                        self.path.push(PathSegment::Index(i));
                        ok &= self.check(item, v);
                        self.path.pop();
                    }
                    ok
                }
                _ => {
                    self.issue("Expected array", "array", value);
                    false
                }
            },
            Shape::Object(fields) => match value {
                Value::Object(map) => {
                    let mut ok = true;
                    for (key, field) in fields {
                        let v = map.get(*key).unwrap_or(&Value::Null);
                        self.path.push(PathSegment::Key((*key).to_string()));
                        ok &= self.check(field, v);
                        self.path.pop();
                    }
                    ok
                }
                _ => {
                    self.issue("Expected object", "object", value);
                    false
                }
            },
            Shape::Tuple(_) => match value {
                Value::Array(items) => self.check_seq(shape, items),
                _ => {
                    self.issue("Expected array", "array", value);
                    false
                }
            },
            Shape::Union(options) => {
                // Options are tried in isolation so a losing branch leaves no issues behind.
                if options.iter().any(|opt| validate(opt, value).is_ok()) {
                    return true;
                }
                self.issue("No union variant matched", "union", value);
                false
            }
        }
    }

    fn check_seq(&mut self, shape: &Shape, items: &[Value]) -> bool {
        match shape {
            Shape::Tuple(elems) => {
                let mut ok = true;
                for (i, elem) in elems.iter().enumerate() {
                    let v = items.get(i).unwrap_or(&Value::Null);
                    self.path.push(PathSegment::Index(i));
                    ok &= self.check(elem, v);
                    self.path.pop();
                }
                ok
            }
            Shape::Union(options) => {
                if options.iter().any(|opt| validate_tuple(opt, items).is_ok()) {
                    return true;
                }
                self.issues.push(Issue {
                    path: self.path.clone(),
                    message: "No union variant matched".to_string(),
                    expected: Some("union"),
                    received: Some("array"),
                });
                false
            }
            Shape::Any => true,
            Shape::Array(_) => self.check(shape, &Value::Array(items.to_vec())),
            other => {
                self.issues.push(Issue {
                    path: self.path.clone(),
                    message: format!("Shape {other:?} cannot describe a tuple"),
                    expected: None,
                    received: Some("array"),
                });
                false
            }
        }
    }

    fn expect(&mut self, ok: bool, message: &str, expected: &'static str, value: &Value) -> bool {
        if !ok {
            self.issue(message, expected, value);
        }
        ok
    }
}

// `1` and `1.0` are the same literal on the wire.
fn literal_eq(lit: &Value, value: &Value) -> bool {
    match (lit, value) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => lit == value,
    }
}
