//! Exposition Renderer
//!
//! Turns pipeline records into Prometheus text format. The same key is
//! produced by many collectors (every component has a health status), so
//! records are grouped into families: `# HELP` and `# TYPE` are written once
//! per key, at the position the key first appeared.

use crate::domain::metric::{self, MetricRecord};
use crate::error::{Error, Result};
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use std::collections::HashMap;

/// Render records as exposition text
pub fn render(records: &[MetricRecord]) -> String {
    let mut order: Vec<&str> = Vec::new();
    let mut families: HashMap<&str, Vec<&MetricRecord>> = HashMap::new();

    for record in records {
        families
            .entry(record.key.as_str())
            .or_insert_with(|| {
                order.push(record.key.as_str());
                Vec::new()
            })
            .push(record);
    }

    let mut out = String::new();
    for key in order {
        out.push_str(&format!("# HELP {} {}\n", key, escape_help(&help_text(key))));
        out.push_str(&format!("# TYPE {} gauge\n", key));
        for record in &families[key] {
            out.push_str(&sample_line(record));
            out.push('\n');
        }
    }
    out
}

/// One `key{labels} value` line
pub fn sample_line(record: &MetricRecord) -> String {
    let labels: Vec<String> = record
        .all_labels()
        .map(|(name, value)| format!("{}=\"{}\"", name, escape_label_value(value)))
        .collect();

    if labels.is_empty() {
        format!("{} {}", record.key, record.value)
    } else {
        format!("{}{{{}}} {}", record.key, labels.join(","), record.value)
    }
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn escape_help(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\n', "\\n")
}

fn help_text(key: &str) -> String {
    let text = match key {
        metric::HEALTH_STATUS => "Component health status code (see status_text)",
        metric::RUNNING_STATUS => "Component running status code (see status_text)",
        metric::TEMPERATURE => "Component temperature in degrees Celsius",
        metric::REMAIN_LIFE => "Remaining life reported by the component",
        metric::USAGE => "Disk capacity usage in percent",
        metric::CAPACITY_TOTAL => "Total capacity in sectors",
        metric::CAPACITY_ALLOCATED => "Allocated capacity in sectors",
        metric::PORT_ERRORS => "Port link error count by error_type",
        metric::CONTROLLER_CPU_USAGE => "Controller CPU usage in percent",
        metric::CONTROLLER_MEMORY_SIZE => "Controller memory size in MB",
        metric::CONTROLLER_MEMORY_USAGE => "Controller memory usage in percent",
        metric::EXPORTER_DURATION => "Duration of the last scrape in milliseconds",
        _ => {
            return match key.strip_prefix(metric::COUNTER_PREFIX) {
                Some(counter) => format!("Performance counter {}", counter),
                None => format!("OceanStor metric {}", key),
            }
        }
    };
    text.to_string()
}

// =============================================================================
// Exporter Self-Metrics
// =============================================================================

/// Counters describing the exporter itself in serve mode
#[derive(Clone)]
pub struct SelfMetrics {
    registry: Registry,
    scrapes: IntCounter,
    scrape_errors: IntCounter,
}

impl SelfMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let scrapes = IntCounter::new(
            "huawei_storage_exporter_scrapes_total",
            "Scrapes attempted against the array",
        )
        .map_err(metrics_error)?;
        let scrape_errors = IntCounter::new(
            "huawei_storage_exporter_scrape_errors_total",
            "Scrapes that ended in an error",
        )
        .map_err(metrics_error)?;

        registry
            .register(Box::new(scrapes.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(scrape_errors.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            registry,
            scrapes,
            scrape_errors,
        })
    }

    /// Count one scrape and whether it failed
    pub fn observe(&self, succeeded: bool) {
        self.scrapes.inc();
        if !succeeded {
            self.scrape_errors.inc();
        }
    }

    pub fn scrapes(&self) -> u64 {
        self.scrapes.get()
    }

    pub fn scrape_errors(&self) -> u64 {
        self.scrape_errors.get()
    }

    /// Encode the counters in text format
    pub fn encode(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(metrics_error)?;
        String::from_utf8(buffer).map_err(|e| Error::Internal(format!("metrics encoding: {}", e)))
    }
}

impl std::fmt::Debug for SelfMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelfMetrics")
            .field("scrapes", &self.scrapes())
            .field("scrape_errors", &self.scrape_errors())
            .finish()
    }
}

fn metrics_error(e: prometheus::Error) -> Error {
    Error::Internal(format!("metrics registry: {}", e))
}
