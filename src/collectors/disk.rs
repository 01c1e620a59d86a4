//! Disk Collector
//!
//! Member disks: status, temperature, remaining life, capacity usage and
//! per-disk I/O counters.

use super::{collect_component, labels, Component, CounterSpec, Status};
use crate::domain::metric::{self, Labels, MetricRecord};
use crate::domain::ports::{ArrayApi, Collector};
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Counters queried per disk, in request order
pub const DISK_COUNTERS: &[&str] = &[
    "read_iops",
    "read_mbytes",
    "write_iops",
    "write_mbytes",
    "avg_read_latency",
    "avg_write_latency",
    "queue_length",
];

#[derive(Debug, Deserialize)]
pub struct DiskEntry {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "TYPE")]
    pub resource_type: String,
    #[serde(rename = "SERIALNUMBER")]
    pub serial: String,
    pub barcode: String,
    #[serde(rename = "MODEL")]
    pub model: String,
    #[serde(rename = "LOCATION")]
    pub location: String,
    #[serde(rename = "TEMPERATURE")]
    pub temperature: String,
    #[serde(rename = "REMAINLIFE")]
    pub remain_life: String,
    #[serde(rename = "CAPACITYUSAGE")]
    pub capacity_usage: String,
    #[serde(flatten)]
    pub status: Status,
}

impl Component for DiskEntry {
    fn labels(&self) -> Result<Labels> {
        Ok(labels(&[
            ("type", "disk"),
            ("serial", &self.serial),
            ("barcode", &self.barcode),
            ("model", &self.model),
            ("location", &self.location),
            ("id", &self.id),
        ]))
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn fixed_records(&self, labels: &Labels) -> Vec<MetricRecord> {
        vec![
            MetricRecord::new(metric::TEMPERATURE, self.temperature.as_str(), labels),
            MetricRecord::new(metric::REMAIN_LIFE, self.remain_life.as_str(), labels),
            MetricRecord::new(metric::USAGE, self.capacity_usage.as_str(), labels),
        ]
    }

    fn counters(&self) -> Result<Option<CounterSpec<'_>>> {
        Ok(Some(CounterSpec {
            resource_type: &self.resource_type,
            resource_id: &self.id,
            names: DISK_COUNTERS,
        }))
    }
}

/// Member disks (`disk`)
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskCollector;

#[async_trait]
impl Collector for DiskCollector {
    fn name(&self) -> &'static str {
        "disk"
    }

    fn endpoint(&self) -> &'static str {
        "disk"
    }

    async fn collect(&self, api: &dyn ArrayApi) -> Result<Vec<MetricRecord>> {
        collect_component::<DiskEntry>(api, self.name(), self.endpoint()).await
    }
}
