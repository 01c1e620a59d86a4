//! Controller Collector
//!
//! Controllers report CPU and memory figures in their entry and the widest
//! counter set of any component, including cache statistics.

use super::{collect_component, labels, Component, CounterSpec, Status};
use crate::domain::metric::{self, Labels, MetricRecord};
use crate::domain::ports::{ArrayApi, Collector};
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Counters queried per controller, in request order
pub const CONTROLLER_COUNTERS: &[&str] = &[
    "queue_length",
    "read_iops",
    "read_mbytes",
    "write_iops",
    "write_mbytes",
    "max_latency",
    "avg_read_latency",
    "avg_write_latency",
    "avg_cpu_usage",
    "avg_cache_usage",
    "read_cache_hits",
    "write_cache_hits",
    "read_cache_usage",
    "write_cache_usage",
    "cache_page_usage",
    "cache_chunk_usage",
    "max_read_kbytes",
    "max_write_kbytes",
];

#[derive(Debug, Deserialize)]
pub struct ControllerEntry {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "TYPE")]
    pub resource_type: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "LOCATION")]
    pub location: String,
    #[serde(rename = "CPUUSAGE")]
    pub cpu_usage: String,
    #[serde(rename = "MEMORYSIZE")]
    pub memory_size: String,
    #[serde(rename = "MEMORYUSAGE")]
    pub memory_usage: String,
    #[serde(flatten)]
    pub status: Status,
}

impl Component for ControllerEntry {
    fn labels(&self) -> Result<Labels> {
        Ok(labels(&[
            ("type", "controller"),
            ("id", &self.id),
            ("name", &self.name),
            ("location", &self.location),
        ]))
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn fixed_records(&self, labels: &Labels) -> Vec<MetricRecord> {
        vec![
            MetricRecord::new(metric::CONTROLLER_CPU_USAGE, self.cpu_usage.as_str(), labels),
            MetricRecord::new(metric::CONTROLLER_MEMORY_SIZE, self.memory_size.as_str(), labels),
            MetricRecord::new(metric::CONTROLLER_MEMORY_USAGE, self.memory_usage.as_str(), labels),
        ]
    }

    fn counters(&self) -> Result<Option<CounterSpec<'_>>> {
        Ok(Some(CounterSpec {
            resource_type: &self.resource_type,
            resource_id: &self.id,
            names: CONTROLLER_COUNTERS,
        }))
    }
}

/// Storage controllers (`controller`)
#[derive(Debug, Default, Clone, Copy)]
pub struct ControllerCollector;

#[async_trait]
impl Collector for ControllerCollector {
    fn name(&self) -> &'static str {
        "controller"
    }

    fn endpoint(&self) -> &'static str {
        "controller"
    }

    async fn collect(&self, api: &dyn ArrayApi) -> Result<Vec<MetricRecord>> {
        collect_component::<ControllerEntry>(api, self.name(), self.endpoint()).await
    }
}
