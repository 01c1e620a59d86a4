//! Pool Collectors
//!
//! LUNs, disk pools and storage pools: status, capacity and I/O counters.

use super::{collect_component, labels, Component, CounterSpec, Status};
use crate::domain::metric::{self, Labels, MetricRecord};
use crate::domain::ports::{ArrayApi, Collector};
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Counters queried per LUN, in request order
pub const LUN_COUNTERS: &[&str] = &[
    "queue_length",
    "read_iops",
    "read_mbytes",
    "write_iops",
    "write_mbytes",
    "max_latency",
    "avg_read_latency",
    "avg_write_latency",
    "read_cache_hits",
    "write_cache_hits",
];

/// Counters queried per disk pool or storage pool, in request order
pub const POOL_COUNTERS: &[&str] = &[
    "queue_length",
    "read_iops",
    "read_mbytes",
    "write_iops",
    "write_mbytes",
    "max_latency",
    "avg_read_latency",
    "avg_write_latency",
];

fn capacity_records(labels: &Labels, total: &str, allocated: &str) -> Vec<MetricRecord> {
    vec![
        MetricRecord::new(metric::CAPACITY_TOTAL, total, labels),
        MetricRecord::new(metric::CAPACITY_ALLOCATED, allocated, labels),
    ]
}

// =============================================================================
// LUN
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct LunEntry {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "TYPE")]
    pub resource_type: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "WWN")]
    pub wwn: String,
    #[serde(rename = "CAPACITY")]
    pub capacity: String,
    #[serde(rename = "ALLOCCAPACITY")]
    pub allocated_capacity: String,
    #[serde(flatten)]
    pub status: Status,
}

impl Component for LunEntry {
    fn labels(&self) -> Result<Labels> {
        Ok(labels(&[
            ("type", "lun"),
            ("id", &self.id),
            ("name", &self.name),
            ("wwn", &self.wwn),
        ]))
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn fixed_records(&self, labels: &Labels) -> Vec<MetricRecord> {
        capacity_records(labels, &self.capacity, &self.allocated_capacity)
    }

    fn counters(&self) -> Result<Option<CounterSpec<'_>>> {
        Ok(Some(CounterSpec {
            resource_type: &self.resource_type,
            resource_id: &self.id,
            names: LUN_COUNTERS,
        }))
    }
}

/// LUNs (`lun`)
#[derive(Debug, Default, Clone, Copy)]
pub struct LunCollector;

#[async_trait]
impl Collector for LunCollector {
    fn name(&self) -> &'static str {
        "lun"
    }

    fn endpoint(&self) -> &'static str {
        "lun"
    }

    async fn collect(&self, api: &dyn ArrayApi) -> Result<Vec<MetricRecord>> {
        collect_component::<LunEntry>(api, self.name(), self.endpoint()).await
    }
}

// =============================================================================
// Disk Pool
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct DiskPoolEntry {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "TYPE")]
    pub resource_type: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "TOTALCAPACITY")]
    pub total_capacity: String,
    #[serde(rename = "USEDCAPACITY")]
    pub used_capacity: String,
    #[serde(rename = "remainLife")]
    pub remain_life: String,
    #[serde(flatten)]
    pub status: Status,
}

impl Component for DiskPoolEntry {
    fn labels(&self) -> Result<Labels> {
        Ok(labels(&[
            ("type", "disk_pool"),
            ("id", &self.id),
            ("name", &self.name),
        ]))
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn fixed_records(&self, labels: &Labels) -> Vec<MetricRecord> {
        let mut records = capacity_records(labels, &self.total_capacity, &self.used_capacity);
        records.push(MetricRecord::new(
            metric::REMAIN_LIFE,
            self.remain_life.as_str(),
            labels,
        ));
        records
    }

    fn counters(&self) -> Result<Option<CounterSpec<'_>>> {
        Ok(Some(CounterSpec {
            resource_type: &self.resource_type,
            resource_id: &self.id,
            names: POOL_COUNTERS,
        }))
    }
}

/// Disk domains' disk pools (`diskpool`)
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskPoolCollector;

#[async_trait]
impl Collector for DiskPoolCollector {
    fn name(&self) -> &'static str {
        "disk_pool"
    }

    fn endpoint(&self) -> &'static str {
        "diskpool"
    }

    async fn collect(&self, api: &dyn ArrayApi) -> Result<Vec<MetricRecord>> {
        collect_component::<DiskPoolEntry>(api, self.name(), self.endpoint()).await
    }
}

// =============================================================================
// Storage Pool
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct StoragePoolEntry {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "TYPE")]
    pub resource_type: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "USERTOTALCAPACITY")]
    pub user_total_capacity: String,
    #[serde(rename = "USERWRITEALLOCCAPACITY")]
    pub user_write_alloc_capacity: String,
    #[serde(flatten)]
    pub status: Status,
}

impl Component for StoragePoolEntry {
    fn labels(&self) -> Result<Labels> {
        Ok(labels(&[
            ("type", "storage_pool"),
            ("id", &self.id),
            ("name", &self.name),
        ]))
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn fixed_records(&self, labels: &Labels) -> Vec<MetricRecord> {
        capacity_records(
            labels,
            &self.user_total_capacity,
            &self.user_write_alloc_capacity,
        )
    }

    fn counters(&self) -> Result<Option<CounterSpec<'_>>> {
        Ok(Some(CounterSpec {
            resource_type: &self.resource_type,
            resource_id: &self.id,
            names: POOL_COUNTERS,
        }))
    }
}

/// Storage pools (`storagepool`)
#[derive(Debug, Default, Clone, Copy)]
pub struct StoragePoolCollector;

#[async_trait]
impl Collector for StoragePoolCollector {
    fn name(&self) -> &'static str {
        "storage_pool"
    }

    fn endpoint(&self) -> &'static str {
        "storagepool"
    }

    async fn collect(&self, api: &dyn ArrayApi) -> Result<Vec<MetricRecord>> {
        collect_component::<StoragePoolEntry>(api, self.name(), self.endpoint()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeArray};
    use serde_json::json;

    #[tokio::test]
    async fn test_lun_records() {
        let api = FakeArray::new()
            .authenticated()
            .with_collection(
                "lun",
                json!([{
                    "ID": "12", "TYPE": "11", "NAME": "vmfs01", "WWN": "6a8ffba1005d5e6e0000000c",
                    "HEALTHSTATUS": "1", "RUNNINGSTATUS": "27",
                    "CAPACITY": "2147483648", "ALLOCCAPACITY": "1073741824"
                }]),
            )
            .with_counters("11:12", "0,10,20,30,40,50,60,70,80,90");

        let records = LunCollector.collect(&api).await.unwrap();
        assert_eq!(records.len(), 4 + LUN_COUNTERS.len());
        assert_eq!(records[0].label("wwn"), Some("6a8ffba1005d5e6e0000000c"));
        assert_eq!(records[2].key, metric::CAPACITY_TOTAL);
        assert_eq!(records[2].value, "2147483648");
        assert_eq!(records[3].key, metric::CAPACITY_ALLOCATED);
        assert_eq!(records[13].key, "huawei_storage_metrics_write_cache_hits");
        assert_eq!(records[13].value, "90");
    }

    #[tokio::test]
    async fn test_disk_pool_records() {
        let api = FakeArray::new()
            .authenticated()
            .with_collection(
                "diskpool",
                json!([{
                    "ID": "0", "TYPE": "266", "NAME": "DD0", "HEALTHSTATUS": "1",
                    "RUNNINGSTATUS": "27", "TOTALCAPACITY": "100", "USEDCAPACITY": "40",
                    "remainLife": "97"
                }]),
            )
            .with_counters("266:0", "1,2,3,4,5,6,7,8");

        let records = DiskPoolCollector.collect(&api).await.unwrap();
        assert_eq!(records.len(), 5 + POOL_COUNTERS.len());
        assert_eq!(records[4].key, metric::REMAIN_LIFE);
        assert_eq!(records[4].value, "97");
        assert_eq!(records[5].key, "huawei_storage_metrics_queue_length");
        assert_eq!(records[12].key, "huawei_storage_metrics_avg_write_latency");
        assert_eq!(records[12].value, "8");
    }

    #[tokio::test]
    async fn test_storage_pool_records() {
        let api = FakeArray::new()
            .authenticated()
            .with_collection(
                "storagepool",
                json!([
                    {"ID": "0", "TYPE": "216", "NAME": "SP0", "HEALTHSTATUS": "1", "RUNNINGSTATUS": "27",
                     "USERTOTALCAPACITY": "500", "USERWRITEALLOCCAPACITY": "120"},
                    {"ID": "1", "TYPE": "216", "NAME": "SP1", "HEALTHSTATUS": "5", "RUNNINGSTATUS": "53",
                     "USERTOTALCAPACITY": "600", "USERWRITEALLOCCAPACITY": "0"}
                ]),
            )
            .with_counters("216:0", "1,2,3,4,5,6,7,8")
            .with_counters("216:1", "9,9,9,9,9,9,9,9");

        let records = StoragePoolCollector.collect(&api).await.unwrap();
        let per_entry = 4 + POOL_COUNTERS.len();
        assert_eq!(records.len(), 2 * per_entry);
        assert_eq!(records[per_entry].label("status_text"), Some("degraded"));
        assert_eq!(records[per_entry + 1].label("status_text"), Some("initializing"));
        assert_eq!(records[3].value, "120");
        assert_eq!(
            api.calls(),
            vec![
                Call::Collection("storagepool".into()),
                Call::Counters { stats_uid: "216:0".into(), ids: "19,22,23,28,26,371,384,385".into() },
                Call::Counters { stats_uid: "216:1".into(), ids: "19,22,23,28,26,371,384,385".into() },
            ]
        );
    }
}
