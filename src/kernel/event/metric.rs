//! Scatter-gather telemetry signals.
//!
//! Samples travel as opaque values: the collector forwards them without
//! looking inside. See [`crate::kernel::telemetry::metrics`] for the typed model.

use serde_json::Value;

use super::{Args, EventKind};
use crate::kernel::schema::Shape;
use crate::kernel::telemetry::metrics::MetricsData;

/// Aggregated payload broadcast by a collector that has no flush callback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricEvent {
    pub data: MetricsData,
}

impl EventKind for MetricEvent {
    const TYPES: &'static [&'static str] = &["metric"];

    fn shape() -> Shape {
        Shape::event("metric", [Shape::optional(Shape::Object(vec![(
            "resource_metrics",
            Shape::optional(Shape::array(Shape::Any)),
        )]))])
    }

    fn from_args(args: Args<'_>) -> Self {
        let resource_metrics = args
            .get(1)
            .get("resource_metrics")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        Self { data: MetricsData { resource_metrics } }
    }

    fn name(&self) -> &'static str {
        "metric"
    }

    fn args(&self) -> Vec<Value> {
        vec![self.data.to_value()]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricRegisterEvent {
    pub publisher_id: String,
}

impl EventKind for MetricRegisterEvent {
    const TYPES: &'static [&'static str] = &["metric_register"];

    fn shape() -> Shape {
        Shape::event("metric_register", [Shape::String])
    }

    fn from_args(args: Args<'_>) -> Self {
        Self { publisher_id: args.str(1).to_string() }
    }

    fn name(&self) -> &'static str {
        "metric_register"
    }

    fn args(&self) -> Vec<Value> {
        vec![Value::from(self.publisher_id.as_str())]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricUnregisterEvent {
    pub publisher_id: String,
}

impl EventKind for MetricUnregisterEvent {
    const TYPES: &'static [&'static str] = &["metric_unregister"];

    fn shape() -> Shape {
        Shape::event("metric_unregister", [Shape::String])
    }

    fn from_args(args: Args<'_>) -> Self {
        Self { publisher_id: args.str(1).to_string() }
    }

    fn name(&self) -> &'static str {
        "metric_unregister"
    }

    fn args(&self) -> Vec<Value> {
        vec![Value::from(self.publisher_id.as_str())]
    }
}

/// Broadcast by the collector at the start of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetricCollectEvent {
    pub request_id: u64,
    pub collection_time_unix_nano: u64,
}

impl EventKind for MetricCollectEvent {
    const TYPES: &'static [&'static str] = &["metric_collect"];

    fn shape() -> Shape {
        Shape::event("metric_collect", [Shape::Integer, Shape::Integer])
    }

    fn from_args(args: Args<'_>) -> Self {
        Self {
            request_id: args.int(1).max(0) as u64,
            collection_time_unix_nano: args.int(2).max(0) as u64,
        }
    }

    fn name(&self) -> &'static str {
        "metric_collect"
    }

    fn args(&self) -> Vec<Value> {
        vec![
            Value::from(self.request_id),
            Value::from(self.collection_time_unix_nano),
        ]
    }
}

/// A publisher's answer to one collect request. An empty sample list is still an answer.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricResponseEvent {
    pub request_id: u64,
    pub publisher_id: String,
    pub resource_metrics: Vec<Value>,
}

impl EventKind for MetricResponseEvent {
    const TYPES: &'static [&'static str] = &["metric_response"];

    fn shape() -> Shape {
        Shape::event(
            "metric_response",
            [
                Shape::Integer,
                Shape::String,
                Shape::optional(Shape::array(Shape::Any)),
            ],
        )
    }

    fn from_args(args: Args<'_>) -> Self {
        Self {
            request_id: args.int(1).max(0) as u64,
            publisher_id: args.str(2).to_string(),
            resource_metrics: args.get(3).as_array().cloned().unwrap_or_default(),
        }
    }

    fn name(&self) -> &'static str {
        "metric_response"
    }

    fn args(&self) -> Vec<Value> {
        vec![
            Value::from(self.request_id),
            Value::from(self.publisher_id.as_str()),
            Value::Array(self.resource_metrics.clone()),
        ]
    }
}
