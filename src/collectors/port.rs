//! Port Collectors
//!
//! Ethernet and SAS ports: status, link error counts and I/O counters.
//! Only host/service ethernet ports report counters; management and other
//! port roles still get status and error records.

use super::{collect_component, labels, Component, CounterSpec, Status};
use crate::domain::metric::{self, Labels, MetricRecord};
use crate::domain::ports::{ArrayApi, Collector};
use crate::error::{Error, Result};
use crate::valuemap::{self, ETH_PORT_HOST_SERVICE};
use async_trait::async_trait;
use serde::Deserialize;

/// Counters queried per host/service ethernet port, in request order
pub const ETH_PORT_COUNTERS: &[&str] = &[
    "usage",
    "queue_length",
    "read_iops",
    "read_mbytes",
    "write_iops",
    "write_mbytes",
    "max_latency",
    "avg_read_latency",
    "avg_write_latency",
];

/// Counters queried per SAS port, in request order
pub const SAS_PORT_COUNTERS: &[&str] = &[
    "read_iops",
    "read_mbytes",
    "write_iops",
    "write_mbytes",
    "max_latency",
    "max_read_latency",
    "max_write_latency",
    "avg_read_latency",
    "avg_write_latency",
];

fn port_error(labels: &Labels, value: &str, error_type: &str, port_type: &str) -> MetricRecord {
    MetricRecord::new(metric::PORT_ERRORS, value, labels)
        .with_custom_label("error_type", error_type)
        .with_custom_label("port_type", port_type)
}

// =============================================================================
// Ethernet Port
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct EthPortEntry {
    #[serde(rename = "ID")]
    pub id: String,
    /// Only host/service ports are required to report it
    #[serde(rename = "TYPE", default)]
    pub resource_type: Option<String>,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "MACADDRESS")]
    pub mac: String,
    #[serde(rename = "IPV4ADDR")]
    pub ipv4: String,
    #[serde(rename = "IPV4MASK")]
    pub ipv4_mask: String,
    #[serde(rename = "LOCATION")]
    pub location: String,
    #[serde(rename = "LOGICTYPE")]
    pub logic_type: String,
    #[serde(rename = "crcErrors")]
    pub crc_errors: String,
    #[serde(rename = "frameErrors")]
    pub frame_errors: String,
    #[serde(rename = "frameLengthErrors")]
    pub frame_length_errors: String,
    #[serde(flatten)]
    pub status: Status,
}

impl Component for EthPortEntry {
    fn labels(&self) -> Result<Labels> {
        let port_type_text = valuemap::eth_port_type(&self.logic_type)?;
        Ok(labels(&[
            ("type", "eth_port"),
            ("id", &self.id),
            ("name", &self.name),
            ("mac", &self.mac),
            ("ipv4", &self.ipv4),
            ("v4mask", &self.ipv4_mask),
            ("location", &self.location),
            ("port_type_id", &self.logic_type),
            ("port_type_text", port_type_text),
        ]))
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn fixed_records(&self, labels: &Labels) -> Vec<MetricRecord> {
        vec![
            port_error(labels, &self.crc_errors, "crc", "eth"),
            port_error(labels, &self.frame_errors, "frame", "eth"),
            port_error(labels, &self.frame_length_errors, "frame_length", "eth"),
        ]
    }

    fn counters(&self) -> Result<Option<CounterSpec<'_>>> {
        // Management and other roles carry no statistics on the array.
        if self.logic_type != ETH_PORT_HOST_SERVICE {
            return Ok(None);
        }
        let resource_type = self.resource_type.as_deref().ok_or_else(|| {
            Error::malformed(
                format!("eth_port entry (ID {})", self.id),
                "missing field `TYPE` on a host/service port",
            )
        })?;
        Ok(Some(CounterSpec {
            resource_type,
            resource_id: &self.id,
            names: ETH_PORT_COUNTERS,
        }))
    }
}

/// Ethernet ports (`eth_port`)
#[derive(Debug, Default, Clone, Copy)]
pub struct EthPortCollector;

#[async_trait]
impl Collector for EthPortCollector {
    fn name(&self) -> &'static str {
        "eth_port"
    }

    fn endpoint(&self) -> &'static str {
        "eth_port"
    }

    async fn collect(&self, api: &dyn ArrayApi) -> Result<Vec<MetricRecord>> {
        collect_component::<EthPortEntry>(api, self.name(), self.endpoint()).await
    }
}

// =============================================================================
// SAS Port
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SasPortEntry {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "TYPE")]
    pub resource_type: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "LOCATION")]
    pub location: String,
    #[serde(rename = "DISPARITYERROR")]
    pub disparity_errors: String,
    #[serde(rename = "PHYRESETERRORS")]
    pub phy_reset_errors: String,
    #[serde(flatten)]
    pub status: Status,
}

impl Component for SasPortEntry {
    fn labels(&self) -> Result<Labels> {
        Ok(labels(&[
            ("type", "sas_port"),
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
            port_error(labels, &self.disparity_errors, "disparity", "sas"),
            port_error(labels, &self.phy_reset_errors, "phy_reset", "sas"),
        ]
    }

    fn counters(&self) -> Result<Option<CounterSpec<'_>>> {
        Ok(Some(CounterSpec {
            resource_type: &self.resource_type,
            resource_id: &self.id,
            names: SAS_PORT_COUNTERS,
        }))
    }
}

/// SAS back-end ports (`sas_port`)
#[derive(Debug, Default, Clone, Copy)]
pub struct SasPortCollector;

#[async_trait]
impl Collector for SasPortCollector {
    fn name(&self) -> &'static str {
        "sas_port"
    }

    fn endpoint(&self) -> &'static str {
        "sas_port"
    }

    async fn collect(&self, api: &dyn ArrayApi) -> Result<Vec<MetricRecord>> {
        collect_component::<SasPortEntry>(api, self.name(), self.endpoint()).await
    }
}
