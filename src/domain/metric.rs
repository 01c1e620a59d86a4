//! Metric Records
//!
//! The uniform record every collector emits and the renderer consumes.

use serde::{Deserialize, Serialize};

// =============================================================================
// Metric Keys
// =============================================================================

pub const HEALTH_STATUS: &str = "huawei_storage_component_health_status";
pub const RUNNING_STATUS: &str = "huawei_storage_component_running_status";
pub const TEMPERATURE: &str = "huawei_storage_component_temperature";
pub const REMAIN_LIFE: &str = "huawei_storage_remainlife";
pub const USAGE: &str = "huawei_storage_usage";
pub const CAPACITY_TOTAL: &str = "huawei_storage_capacity_total";
pub const CAPACITY_ALLOCATED: &str = "huawei_storage_capacity_allocated";
pub const PORT_ERRORS: &str = "huawei_storage_port_errors";
pub const CONTROLLER_CPU_USAGE: &str = "huawei_storage_controller_cpuusage";
pub const CONTROLLER_MEMORY_SIZE: &str = "huawei_storage_controller_memorysize";
pub const CONTROLLER_MEMORY_USAGE: &str = "huawei_storage_controller_memoryusage";
pub const EXPORTER_DURATION: &str = "huawei_storage_exporter_duration";

/// Prefix of every performance counter key
pub const COUNTER_PREFIX: &str = "huawei_storage_metrics_";

/// Key for a performance counter record
pub fn counter_key(name: &str) -> String {
    format!("{}{}", COUNTER_PREFIX, name)
}

/// Ordered `(name, value)` label pairs
pub type Labels = Vec<(String, String)>;

// =============================================================================
// Metric Record
// =============================================================================

/// One exposition sample
///
/// `value` is the array's numeric text, passed through unconverted.
/// `labels` identify the instance, `custom_labels` annotate the sample
/// (decoded status text, error type tags).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub key: String,
    pub value: String,
    pub labels: Labels,
    pub custom_labels: Labels,
}

impl MetricRecord {
    /// Create a record with the given structural labels
    pub fn new(key: impl Into<String>, value: impl Into<String>, labels: &Labels) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            labels: labels.clone(),
            custom_labels: Vec::new(),
        }
    }

    /// Attach a custom label
    pub fn with_custom_label(mut self, name: &str, value: impl Into<String>) -> Self {
        debug_assert!(
            !self.has_label(name),
            "duplicate label {} on {}",
            name,
            self.key
        );
        self.custom_labels.push((name.to_string(), value.into()));
        self
    }

    /// Whether a structural or custom label with this name exists
    pub fn has_label(&self, name: &str) -> bool {
        self.all_labels().any(|(n, _)| n == name)
    }

    /// Value of a structural or custom label
    pub fn label(&self, name: &str) -> Option<&str> {
        self.all_labels()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Structural labels followed by custom labels
    pub fn all_labels(&self) -> impl Iterator<Item = &(String, String)> {
        self.labels.iter().chain(self.custom_labels.iter())
    }

    /// Check that no label name repeats across both sets
    pub fn has_unique_label_names(&self) -> bool {
        let mut names: Vec<&str> = self.all_labels().map(|(n, _)| n.as_str()).collect();
        let len = names.len();
        names.sort_unstable();
        names.dedup();
        names.len() == len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_labels() {
        let labels = vec![
            ("type".to_string(), "disk".to_string()),
            ("id".to_string(), "0".to_string()),
        ];
        let record =
            MetricRecord::new(HEALTH_STATUS, "1", &labels).with_custom_label("status_text", "normal");

        assert_eq!(record.label("type"), Some("disk"));
        assert_eq!(record.label("status_text"), Some("normal"));
        assert_eq!(record.label("serial"), None);
        assert!(record.has_unique_label_names());

        let order: Vec<&str> = record.all_labels().map(|(n, _)| n.as_str()).collect();
        assert_eq!(order, vec!["type", "id", "status_text"]);
    }

    #[test]
    fn test_counter_key() {
        assert_eq!(counter_key("read_iops"), "huawei_storage_metrics_read_iops");
    }
}
