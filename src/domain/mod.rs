//! Domain Module
//!
//! Core types and traits: metric records, performance counter requests and
//! the ports the pipeline talks through.

pub mod counters;
pub mod metric;
pub mod ports;

pub use counters::PerformanceCounterRequest;
pub use metric::{Labels, MetricRecord};
pub use ports::{ArrayApi, ArraySession, Collector, SessionState};
