//! Chassis Collectors
//!
//! Power supplies, backup battery units, enclosures, interface modules and
//! fans. None of these report performance counters.

use super::{collect_component, labels, Component, Status};
use crate::domain::metric::{self, Labels, MetricRecord};
use crate::domain::ports::{ArrayApi, Collector};
use crate::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

// =============================================================================
// Power Supply
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct PowerEntry {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "SERIALNUMBER")]
    pub serial: String,
    #[serde(rename = "MODEL")]
    pub model: String,
    #[serde(rename = "LOCATION")]
    pub location: String,
    #[serde(flatten)]
    pub status: Status,
}

impl Component for PowerEntry {
    fn labels(&self) -> Result<Labels> {
        Ok(labels(&[
            ("type", "PSU"),
            ("serial", &self.serial),
            ("id", &self.id),
            ("model", &self.model),
            ("name", &self.name),
            ("location", &self.location),
        ]))
    }

    fn status(&self) -> &Status {
        &self.status
    }
}

/// Power supply units (`power`)
#[derive(Debug, Default, Clone, Copy)]
pub struct PowerCollector;

#[async_trait]
impl Collector for PowerCollector {
    fn name(&self) -> &'static str {
        "power"
    }

    fn endpoint(&self) -> &'static str {
        "power"
    }

    async fn collect(&self, api: &dyn ArrayApi) -> Result<Vec<MetricRecord>> {
        collect_component::<PowerEntry>(api, self.name(), self.endpoint()).await
    }
}

// =============================================================================
// Backup Battery Unit
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct BbuEntry {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "LOCATION")]
    pub location: String,
    #[serde(rename = "REMAINLIFEDAYS")]
    pub remain_life_days: String,
    #[serde(flatten)]
    pub status: Status,
}

impl Component for BbuEntry {
    fn labels(&self) -> Result<Labels> {
        Ok(labels(&[
            ("type", "bbu"),
            ("id", &self.id),
            ("name", &self.name),
            ("location", &self.location),
        ]))
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn fixed_records(&self, labels: &Labels) -> Vec<MetricRecord> {
        vec![MetricRecord::new(
            metric::REMAIN_LIFE,
            self.remain_life_days.as_str(),
            labels,
        )]
    }
}

/// Backup battery units (`backup_power`)
#[derive(Debug, Default, Clone, Copy)]
pub struct BbuCollector;

#[async_trait]
impl Collector for BbuCollector {
    fn name(&self) -> &'static str {
        "bbu"
    }

    fn endpoint(&self) -> &'static str {
        "backup_power"
    }

    async fn collect(&self, api: &dyn ArrayApi) -> Result<Vec<MetricRecord>> {
        collect_component::<BbuEntry>(api, self.name(), self.endpoint()).await
    }
}

// =============================================================================
// Enclosure
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct EnclosureEntry {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "SERIALNUM")]
    pub serial: String,
    #[serde(rename = "MODEL")]
    pub model: String,
    #[serde(rename = "TEMPERATURE")]
    pub temperature: String,
    #[serde(flatten)]
    pub status: Status,
}

impl Component for EnclosureEntry {
    fn labels(&self) -> Result<Labels> {
        Ok(labels(&[
            ("type", "enclosure"),
            ("serial", &self.serial),
            ("id", &self.id),
            ("name", &self.name),
            ("model", &self.model),
        ]))
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn fixed_records(&self, labels: &Labels) -> Vec<MetricRecord> {
        vec![MetricRecord::new(
            metric::TEMPERATURE,
            self.temperature.as_str(),
            labels,
        )]
    }
}

/// Disk and controller enclosures (`enclosure`)
#[derive(Debug, Default, Clone, Copy)]
pub struct EnclosureCollector;

#[async_trait]
impl Collector for EnclosureCollector {
    fn name(&self) -> &'static str {
        "enclosure"
    }

    fn endpoint(&self) -> &'static str {
        "enclosure"
    }

    async fn collect(&self, api: &dyn ArrayApi) -> Result<Vec<MetricRecord>> {
        collect_component::<EnclosureEntry>(api, self.name(), self.endpoint()).await
    }
}

// =============================================================================
// Interface Module
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct IntfModuleEntry {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "MODEL")]
    pub model: String,
    #[serde(rename = "LOCATION")]
    pub location: String,
    #[serde(flatten)]
    pub status: Status,
}

impl Component for IntfModuleEntry {
    fn labels(&self) -> Result<Labels> {
        Ok(labels(&[
            ("type", "intf_module"),
            ("id", &self.id),
            ("name", &self.name),
            ("model", &self.model),
            ("location", &self.location),
        ]))
    }

    fn status(&self) -> &Status {
        &self.status
    }
}

/// Interface modules (`intf_module`)
#[derive(Debug, Default, Clone, Copy)]
pub struct IntfModuleCollector;

#[async_trait]
impl Collector for IntfModuleCollector {
    fn name(&self) -> &'static str {
        "intf_module"
    }

    fn endpoint(&self) -> &'static str {
        "intf_module"
    }

    async fn collect(&self, api: &dyn ArrayApi) -> Result<Vec<MetricRecord>> {
        collect_component::<IntfModuleEntry>(api, self.name(), self.endpoint()).await
    }
}

// =============================================================================
// Fan
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct FanEntry {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "LOCATION")]
    pub location: String,
    #[serde(flatten)]
    pub status: Status,
}

impl Component for FanEntry {
    fn labels(&self) -> Result<Labels> {
        Ok(labels(&[
            ("type", "fan"),
            ("id", &self.id),
            ("name", &self.name),
            ("location", &self.location),
        ]))
    }

    fn status(&self) -> &Status {
        &self.status
    }
}

/// Fan modules (`fan`)
#[derive(Debug, Default, Clone, Copy)]
pub struct FanCollector;

#[async_trait]
impl Collector for FanCollector {
    fn name(&self) -> &'static str {
        "fan"
    }

    fn endpoint(&self) -> &'static str {
        "fan"
    }

    async fn collect(&self, api: &dyn ArrayApi) -> Result<Vec<MetricRecord>> {
        collect_component::<FanEntry>(api, self.name(), self.endpoint()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::{Call, FakeArray};
    use assert_matches::assert_matches;
    use serde_json::json;

    #[tokio::test]
    async fn test_power_records() {
        let api = FakeArray::new().authenticated().with_collection(
            "power",
            json!([{
                "ID": "0A.PSU0", "NAME": "PSU0", "SERIALNUMBER": "2102311", "MODEL": "PAC900S12",
                "LOCATION": "CTE0.PSU0", "HEALTHSTATUS": "1", "RUNNINGSTATUS": "2", "TYPE": "209"
            }]),
        );

        let records = PowerCollector.collect(&api).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].key, metric::HEALTH_STATUS);
        assert_eq!(records[0].label("status_text"), Some("normal"));
        assert_eq!(records[1].key, metric::RUNNING_STATUS);
        assert_eq!(records[1].label("status_text"), Some("running"));

        let names: Vec<&str> = records[0].labels.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["type", "serial", "id", "model", "name", "location"]);
        assert_eq!(records[0].label("type"), Some("PSU"));
        // No counters for chassis parts
        assert_eq!(api.calls(), vec![Call::Collection("power".into())]);
    }

    #[tokio::test]
    async fn test_bbu_remain_life() {
        let api = FakeArray::new().authenticated().with_collection(
            "backup_power",
            json!([{
                "ID": "0A.BBU0", "NAME": "BBU0", "LOCATION": "CTE0.A.BBU0",
                "HEALTHSTATUS": "1", "RUNNINGSTATUS": "48", "REMAINLIFEDAYS": "1020"
            }]),
        );

        let records = BbuCollector.collect(&api).await.unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].label("status_text"), Some("charging"));
        assert_eq!(records[2].key, metric::REMAIN_LIFE);
        assert_eq!(records[2].value, "1020");
        assert!(records[2].custom_labels.is_empty());
    }

    #[tokio::test]
    async fn test_enclosure_temperature() {
        let api = FakeArray::new().authenticated().with_collection(
            "enclosure",
            json!([
                {"ID": "0", "NAME": "CTE0", "SERIALNUM": "SN0", "MODEL": "2U", "TEMPERATURE": "31",
                 "HEALTHSTATUS": "1", "RUNNINGSTATUS": "27"},
                {"ID": "1", "NAME": "DAE010", "SERIALNUM": "SN1", "MODEL": "2U", "TEMPERATURE": "29",
                 "HEALTHSTATUS": "2", "RUNNINGSTATUS": "28"}
            ]),
        );

        let records = EnclosureCollector.collect(&api).await.unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[2].key, metric::TEMPERATURE);
        assert_eq!(records[2].value, "31");
        assert_eq!(records[3].label("status_text"), Some("faulty"));
        assert_eq!(records[5].label("name"), Some("DAE010"));
    }

    #[tokio::test]
    async fn test_intf_module_and_fan() {
        let api = FakeArray::new()
            .authenticated()
            .with_collection(
                "intf_module",
                json!([{"ID": "1", "NAME": "IOM0", "MODEL": "SmartIO", "LOCATION": "CTE0.A.IOM0",
                        "HEALTHSTATUS": "1", "RUNNINGSTATUS": "10"}]),
            )
            .with_collection(
                "fan",
                json!([{"ID": "0", "NAME": "FAN0", "LOCATION": "CTE0.FAN0",
                        "HEALTHSTATUS": "1", "RUNNINGSTATUS": "2"}]),
            );

        let modules = IntfModuleCollector.collect(&api).await.unwrap();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[1].label("status_text"), Some("link_up"));

        let fans = FanCollector.collect(&api).await.unwrap();
        assert_eq!(fans.len(), 2);
        assert_eq!(fans[0].label("type"), Some("fan"));
    }

    #[tokio::test]
    async fn test_unknown_status_code_aborts() {
        let api = FakeArray::new().authenticated().with_collection(
            "fan",
            json!([{"ID": "0", "NAME": "FAN0", "LOCATION": "CTE0.FAN0",
                    "HEALTHSTATUS": "4", "RUNNINGSTATUS": "2"}]),
        );
        assert_matches!(
            FanCollector.collect(&api).await,
            Err(Error::UnknownCode { namespace: "health_status", .. })
        );
    }

    #[tokio::test]
    async fn test_missing_field_aborts() {
        let api = FakeArray::new().authenticated().with_collection(
            "power",
            json!([
                {"ID": "0A.PSU0", "NAME": "PSU0", "SERIALNUMBER": "1", "MODEL": "M",
                 "LOCATION": "L", "HEALTHSTATUS": "1", "RUNNINGSTATUS": "2"},
                {"ID": "0A.PSU1", "NAME": "PSU1", "MODEL": "M",
                 "LOCATION": "L", "HEALTHSTATUS": "1", "RUNNINGSTATUS": "2"}
            ]),
        );
        let err = PowerCollector.collect(&api).await.unwrap_err();
        assert!(err.to_string().contains("SERIALNUMBER"));
    }
}
