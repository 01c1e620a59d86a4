//! Value Maps
//!
//! Static tables translating OceanStor status and type codes to text, and
//! logical performance metric names to the array's counter IDs.

use crate::error::{Error, Result};

// =============================================================================
// Namespaces
// =============================================================================

/// Lookup namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// `HEALTHSTATUS` codes
    HealthStatus,
    /// `RUNNINGSTATUS` codes
    RunningStatus,
    /// Logical metric name to performance counter ID
    DataIds,
    /// Ethernet port `LOGICTYPE` codes
    EthPortTypes,
}

impl Namespace {
    /// Name used in diagnostics
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::HealthStatus => "health_status",
            Namespace::RunningStatus => "running_status",
            Namespace::DataIds => "data_ids",
            Namespace::EthPortTypes => "eth_port_types",
        }
    }

    fn table(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Namespace::HealthStatus => HEALTH_STATUS,
            Namespace::RunningStatus => RUNNING_STATUS,
            Namespace::DataIds => DATA_IDS,
            Namespace::EthPortTypes => ETH_PORT_TYPES,
        }
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Tables
// =============================================================================

const HEALTH_STATUS: &[(&str, &str)] = &[
    ("0", "unknown"),
    ("1", "normal"),
    ("2", "faulty"),
    ("3", "about_to_fail"),
    ("5", "degraded"),
    ("9", "inconsistent"),
    ("11", "no input"),
    ("12", "low_battery"),
];

const RUNNING_STATUS: &[(&str, &str)] = &[
    ("0", "unknown"),
    ("1", "normal"),
    ("2", "running"),
    ("3", "not_running"),
    ("5", "sleep_in_high_temperature"),
    ("8", "spin_down"),
    ("10", "link_up"),
    ("11", "link_down"),
    ("12", "powering_on"),
    ("13", "powering_off"),
    ("14", "pre-copy"),
    ("16", "reconstruction"),
    ("27", "online"),
    ("28", "offline"),
    ("32", "balancing"),
    ("48", "charging"),
    ("49", "charging_completed"),
    ("50", "discharging"),
    ("53", "initializing"),
    ("103", "power_on_failed"),
    ("106", "deleting"),
];

const DATA_IDS: &[(&str, &str)] = &[
    ("read_iops", "22"),
    ("read_mbytes", "23"),
    ("write_iops", "28"),
    ("write_mbytes", "26"),
    ("max_read_latency", "382"),
    ("max_write_latency", "383"),
    ("avg_read_latency", "384"),
    ("avg_write_latency", "385"),
    ("max_latency", "371"),
    ("failed_reads", "532"),
    ("failed_writes", "533"),
    ("usage", "18"),
    ("queue_length", "19"),
    ("avg_cpu_usage", "68"),
    ("avg_cache_usage", "69"),
    ("read_cache_hits", "93"),
    ("write_cache_hits", "95"),
    ("read_cache_usage", "110"),
    ("write_cache_usage", "120"),
    ("cache_page_usage", "1055"),
    ("cache_chunk_usage", "1056"),
    ("max_read_kbytes", "802"),
    ("max_write_kbytes", "803"),
];

/// `LOGICTYPE` of a host/service ethernet port, the only kind with counters
pub const ETH_PORT_HOST_SERVICE: &str = "0";

const ETH_PORT_TYPES: &[(&str, &str)] = &[
    (ETH_PORT_HOST_SERVICE, "host_port/service_port"),
    ("1", "expansion_port"),
    ("2", "management_port"),
    ("3", "internal_port"),
    ("4", "maintenance_port"),
    ("5", "management/service_port"),
    ("6", "maintenance/service_port"),
    ("11", "cluster_port"),
];

// =============================================================================
// Lookup
// =============================================================================

/// Translate `code` within `namespace`
///
/// There is no fallback: an absent code in a status namespace is
/// [`Error::UnknownCode`], an absent metric name in [`Namespace::DataIds`] is
/// [`Error::InternalMapping`] since those names never come from the array.
pub fn lookup(namespace: Namespace, code: &str) -> Result<&'static str> {
    namespace
        .table()
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, text)| *text)
        .ok_or_else(|| match namespace {
            Namespace::DataIds => Error::InternalMapping(format!(
                "no performance counter id for metric {:?}",
                code
            )),
            _ => Error::UnknownCode {
                namespace: namespace.as_str(),
                code: code.to_string(),
            },
        })
}

/// Decode a `HEALTHSTATUS` code
pub fn health_status(code: &str) -> Result<&'static str> {
    lookup(Namespace::HealthStatus, code)
}

/// Decode a `RUNNINGSTATUS` code
pub fn running_status(code: &str) -> Result<&'static str> {
    lookup(Namespace::RunningStatus, code)
}

/// Decode an ethernet port `LOGICTYPE` code
pub fn eth_port_type(code: &str) -> Result<&'static str> {
    lookup(Namespace::EthPortTypes, code)
}

/// Performance counter ID for a logical metric name
pub fn counter_id(name: &str) -> Result<&'static str> {
    lookup(Namespace::DataIds, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_health_status_table() {
        let expected = [
            ("0", "unknown"),
            ("1", "normal"),
            ("2", "faulty"),
            ("3", "about_to_fail"),
            ("5", "degraded"),
            ("9", "inconsistent"),
            ("11", "no input"),
            ("12", "low_battery"),
        ];
        for (code, text) in expected {
            assert_eq!(health_status(code).unwrap(), text);
        }
    }

    #[test]
    fn test_running_status_table() {
        assert_eq!(running_status("27").unwrap(), "online");
        assert_eq!(running_status("28").unwrap(), "offline");
        assert_eq!(running_status("14").unwrap(), "pre-copy");
        assert_eq!(running_status("32").unwrap(), "balancing");
        assert_eq!(running_status("106").unwrap(), "deleting");
        assert_eq!(RUNNING_STATUS.len(), 21);
    }

    #[test]
    fn test_unknown_codes_fail() {
        for code in ["4", "6", "13", "", "normal", " 1"] {
            assert_matches!(
                health_status(code),
                Err(Error::UnknownCode { namespace: "health_status", .. })
            );
        }
        assert_matches!(
            running_status("4"),
            Err(Error::UnknownCode { namespace: "running_status", .. })
        );
        assert_matches!(
            eth_port_type("7"),
            Err(Error::UnknownCode { namespace: "eth_port_types", .. })
        );
    }

    #[test]
    fn test_counter_ids() {
        assert_eq!(counter_id("read_iops").unwrap(), "22");
        assert_eq!(counter_id("write_mbytes").unwrap(), "26");
        assert_eq!(counter_id("cache_chunk_usage").unwrap(), "1056");
        assert_matches!(counter_id("bogus"), Err(Error::InternalMapping(_)));
    }

    #[test]
    fn test_eth_port_types() {
        assert_eq!(
            eth_port_type(ETH_PORT_HOST_SERVICE).unwrap(),
            "host_port/service_port"
        );
        assert_eq!(eth_port_type("11").unwrap(), "cluster_port");
    }

    #[test]
    fn test_tables_have_unique_keys() {
        for ns in [
            Namespace::HealthStatus,
            Namespace::RunningStatus,
            Namespace::DataIds,
            Namespace::EthPortTypes,
        ] {
            let mut keys: Vec<&str> = ns.table().iter().map(|(k, _)| *k).collect();
            let len = keys.len();
            keys.sort_unstable();
            keys.dedup();
            assert_eq!(keys.len(), len, "duplicate key in {}", ns);
        }
    }
}
