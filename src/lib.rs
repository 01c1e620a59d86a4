//! OceanStor Exporter
//!
//! Collects health, capacity and performance metrics from Huawei OceanStor
//! storage arrays over the DeviceManager REST API and renders them in
//! Prometheus exposition format.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │              Entry Point (one-shot stdout / hyper serve)             │
//! ├──────────────────────────────────────────────────────────────────────┤
//! │  ┌────────────────┐   ┌─────────────────────┐   ┌─────────────────┐  │
//! │  │  Target Config │──▶│   Pipeline Driver   │──▶│   Exposition    │  │
//! │  │  (YAML + CLI)  │   │ login/collect/logout│   │    Renderer     │  │
//! │  └────────────────┘   └──────────┬──────────┘   └─────────────────┘  │
//! │                                  │                                   │
//! │                    ┌─────────────┴─────────────┐                     │
//! │                    │    Collector Registry     │                     │
//! │                    │ chassis, disk, port, pool │                     │
//! │                    │ controller   + ValueMaps  │                     │
//! │                    └─────────────┬─────────────┘                     │
//! ├──────────────────────────────────┴───────────────────────────────────┤
//! │                 OceanStor Session Client (reqwest)                   │
//! │   POST sessions · GET <endpoint> · GET cur_statistic_data · DELETE   │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`oceanstor`]: session client and wire decoding
//! - [`collectors`]: one collector per component type, plus the registry
//! - [`valuemap`]: vendor code tables
//! - [`pipeline`]: ordered collector run over one session
//! - [`exposition`]: text rendering and exporter self-metrics
//! - [`config`]: target configuration file
//! - [`server`]: serve mode HTTP endpoint
//! - [`domain`]: metric records, counter requests and ports
//! - [`error`]: error types and exit codes

pub mod collectors;
pub mod config;
pub mod domain;
pub mod error;
pub mod exposition;
pub mod oceanstor;
pub mod pipeline;
pub mod server;
pub mod valuemap;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use collectors::CollectorRegistry;
pub use config::{ConfigFile, Target, TargetConfig};
pub use domain::{
    ArrayApi, ArraySession, Collector, Labels, MetricRecord, PerformanceCounterRequest,
    SessionState,
};
pub use error::{Error, Result};
pub use exposition::{render, SelfMetrics};
pub use oceanstor::{ClientConfig, OceanStorClient};
pub use pipeline::Pipeline;
pub use server::{ClientFactory, Exporter, SessionFactory};

/// Exporter version, reported on the duration metric
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exporter name
pub const NAME: &str = env!("CARGO_PKG_NAME");
