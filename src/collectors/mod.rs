//! Resource Collectors
//!
//! One collector per OceanStor component type:
//! - Chassis: power supplies, BBUs, enclosures, interface modules, fans
//! - Disks
//! - Ports: ethernet, SAS
//! - Pools: LUNs, disk pools, storage pools
//! - Controllers
//!
//! Every collector runs the same template: fetch the collection, decode each
//! entry into its typed form, emit the health/running status records, the
//! type's fixed records, and finally its performance counters if it has any.
//! A malformed entry aborts the collector; nothing partial is returned.

pub mod chassis;
pub mod controller;
pub mod disk;
pub mod pool;
pub mod port;
pub mod registry;

pub use chassis::*;
pub use controller::*;
pub use disk::*;
pub use pool::*;
pub use port::*;
pub use registry::*;

use crate::domain::counters::PerformanceCounterRequest;
use crate::domain::metric::{self, Labels, MetricRecord};
use crate::domain::ports::ArrayApi;
use crate::error::{Error, Result};
use crate::valuemap;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

// =============================================================================
// Component Model
// =============================================================================

/// Status fields shared by every component
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    #[serde(rename = "HEALTHSTATUS")]
    pub health: String,
    #[serde(rename = "RUNNINGSTATUS")]
    pub running: String,
}

/// Performance counter query of one entry
#[derive(Debug, Clone, Copy)]
pub struct CounterSpec<'a> {
    /// `TYPE` field of the entry
    pub resource_type: &'a str,
    /// `ID` field of the entry
    pub resource_id: &'a str,
    /// Counter names, in request order
    pub names: &'static [&'static str],
}

/// A typed resource entry
pub trait Component: DeserializeOwned + Send + Sync {
    /// Structural labels, in exposition order
    fn labels(&self) -> Result<Labels>;

    /// Health and running status codes
    fn status(&self) -> &Status;

    /// Records following the two status records
    fn fixed_records(&self, _labels: &Labels) -> Vec<MetricRecord> {
        Vec::new()
    }

    /// Counter query, if this entry reports performance data
    fn counters(&self) -> Result<Option<CounterSpec<'_>>> {
        Ok(None)
    }
}

/// Build a label set from borrowed pairs
pub fn labels(pairs: &[(&str, &str)]) -> Labels {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

// =============================================================================
// Collection Template
// =============================================================================

/// Fetch `endpoint` and turn every entry into metric records
pub async fn collect_component<T: Component>(
    api: &dyn ArrayApi,
    name: &str,
    endpoint: &str,
) -> Result<Vec<MetricRecord>> {
    let entries = api.fetch_collection(endpoint).await?;
    let count = entries.len();
    let mut records = Vec::new();

    for (index, raw) in entries.into_iter().enumerate() {
        let entry: T = decode_entry(name, index, raw)?;
        records.extend(entry_records(api, &entry).await?);
    }

    debug!("{}: {} entries, {} records", name, count, records.len());
    Ok(records)
}

/// Decode one raw entry, naming the entry and field on failure
pub fn decode_entry<T: DeserializeOwned>(name: &str, index: usize, raw: Value) -> Result<T> {
    let id = raw
        .get("ID")
        .and_then(Value::as_str)
        .unwrap_or("<no ID>")
        .to_string();

    serde_json::from_value(raw).map_err(|e| {
        debug!(
            "Aborting {} collector: entry {} (ID {}) is malformed: {}",
            name, index, id, e
        );
        Error::malformed(format!("{} entry {} (ID {})", name, index, id), e.to_string())
    })
}

/// Records for one decoded entry
pub async fn entry_records<T: Component>(
    api: &dyn ArrayApi,
    entry: &T,
) -> Result<Vec<MetricRecord>> {
    let labels = entry.labels()?;
    let status = entry.status();

    let mut records = vec![
        MetricRecord::new(metric::HEALTH_STATUS, status.health.as_str(), &labels)
            .with_custom_label("status_text", valuemap::health_status(&status.health)?),
        MetricRecord::new(metric::RUNNING_STATUS, status.running.as_str(), &labels)
            .with_custom_label("status_text", valuemap::running_status(&status.running)?),
    ];
    records.extend(entry.fixed_records(&labels));

    if let Some(spec) = entry.counters()? {
        records.extend(counter_records(api, &labels, spec).await?);
    }

    Ok(records)
}

/// Query and pair the counters of one entry
pub async fn counter_records(
    api: &dyn ArrayApi,
    labels: &Labels,
    spec: CounterSpec<'_>,
) -> Result<Vec<MetricRecord>> {
    let request = PerformanceCounterRequest::new(spec.resource_type, spec.resource_id, spec.names)?;
    let raw = api.fetch_performance_counters(&request).await?;

    Ok(request
        .pair(&raw)?
        .into_iter()
        .map(|(name, value)| MetricRecord::new(metric::counter_key(name), value, labels))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeArray;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_decode_entry_names_missing_field() {
        let err = decode_entry::<Status>("fan", 3, json!({"ID": "CTE0.A.FAN1", "HEALTHSTATUS": "1"}))
            .unwrap_err();
        let message = err.to_string();
        assert_matches!(err, Error::MalformedResponse { .. });
        assert!(message.contains("RUNNINGSTATUS"), "{}", message);
        assert!(message.contains("entry 3"), "{}", message);
        assert!(message.contains("CTE0.A.FAN1"), "{}", message);
    }

    #[tokio::test]
    async fn test_counter_records_follow_request_order() {
        let api = FakeArray::new()
            .authenticated()
            .with_counters("11:7", "5,6,7");
        let labels = labels(&[("type", "lun"), ("id", "7")]);
        let spec = CounterSpec {
            resource_type: "11",
            resource_id: "7",
            names: &["write_iops", "usage", "read_iops"],
        };

        let records = counter_records(&api, &labels, spec).await.unwrap();
        let pairs: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.key.as_str(), r.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("huawei_storage_metrics_write_iops", "5"),
                ("huawei_storage_metrics_usage", "6"),
                ("huawei_storage_metrics_read_iops", "7"),
            ]
        );
        assert!(records.iter().all(|r| r.labels == labels && r.custom_labels.is_empty()));
    }

    #[tokio::test]
    async fn test_short_counter_response_fails() {
        let api = FakeArray::new().authenticated().with_counters("11:7", "5,6");
        let spec = CounterSpec {
            resource_type: "11",
            resource_id: "7",
            names: &["write_iops", "usage", "read_iops"],
        };
        assert_matches!(
            counter_records(&api, &Labels::new(), spec).await,
            Err(Error::MalformedResponse { .. })
        );
    }
}
