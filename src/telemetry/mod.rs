//! Telemetry
//!
//! Observability components for token operations.
//!
//! Log events and spans go through the `tracing` crate; this module holds the
//! metrics side.

pub mod metrics;

pub use metrics::{
    create_in_memory_metrics, no_op_metrics, InMemoryMetrics, MetricEntry, MetricLabels,
    NoOpMetrics, TokenMetrics,
};
