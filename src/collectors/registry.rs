//! Collector Registry
//!
//! Maps configured module names to collectors. Names resolve either by their
//! canonical form (`disk`) or by the `get_<name>_data` spelling older
//! configuration files use.

use super::{
    BbuCollector, ControllerCollector, DiskCollector, DiskPoolCollector, EnclosureCollector,
    EthPortCollector, FanCollector, IntfModuleCollector, LunCollector, PowerCollector,
    SasPortCollector, StoragePoolCollector,
};
use crate::domain::ports::Collector;
use crate::error::{Error, Result};
use std::sync::Arc;

/// Name to collector table
#[derive(Clone)]
pub struct CollectorRegistry {
    collectors: Vec<Arc<dyn Collector>>,
}

impl Default for CollectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectorRegistry {
    /// Registry holding every built-in collector
    pub fn new() -> Self {
        Self {
            collectors: vec![
                Arc::new(PowerCollector),
                Arc::new(BbuCollector),
                Arc::new(EnclosureCollector),
                Arc::new(IntfModuleCollector),
                Arc::new(FanCollector),
                Arc::new(DiskCollector),
                Arc::new(EthPortCollector),
                Arc::new(SasPortCollector),
                Arc::new(LunCollector),
                Arc::new(DiskPoolCollector),
                Arc::new(StoragePoolCollector),
                Arc::new(ControllerCollector),
            ],
        }
    }

    /// Registry holding only `collectors`
    pub fn with_collectors(collectors: Vec<Arc<dyn Collector>>) -> Self {
        Self { collectors }
    }

    /// Canonical names of all registered collectors
    pub fn names(&self) -> Vec<&'static str> {
        self.collectors.iter().map(|c| c.name()).collect()
    }

    /// Look up a collector by canonical or legacy name
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn Collector>> {
        let wanted = canonical_name(name);
        self.collectors
            .iter()
            .find(|c| c.name() == wanted)
            .cloned()
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "unknown module {:?} (known: {})",
                    name,
                    self.names().join(", ")
                ))
            })
    }

    /// Resolve every name up front, returning canonical names in order
    pub fn validate<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<String>> {
        if names.is_empty() {
            return Err(Error::Configuration("module list is empty".into()));
        }
        names
            .iter()
            .map(|name| self.resolve(name.as_ref()).map(|c| c.name().to_string()))
            .collect()
    }
}

impl std::fmt::Debug for CollectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Strip the legacy `get_..._data` wrapper and normalize case
fn canonical_name(name: &str) -> String {
    let name = name.trim().to_ascii_lowercase();
    match name
        .strip_prefix("get_")
        .and_then(|rest| rest.strip_suffix("_data"))
    {
        Some(inner) => inner.to_string(),
        None => name,
    }
}
