//! Performance Counter Requests
//!
//! The array answers a counter query with a bare comma-separated value list.
//! Values are matched to names purely by position, so the request keeps the
//! names and IDs in one order and [`PerformanceCounterRequest::pair`] zips
//! the response against that same order.

use crate::error::{Error, Result};
use crate::valuemap;
use tracing::debug;

/// Counter query for one component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceCounterRequest {
    stats_uid: String,
    counter_names: Vec<&'static str>,
    counter_ids: Vec<&'static str>,
}

impl PerformanceCounterRequest {
    /// Build a request for the component `<resource_type>:<resource_id>`
    ///
    /// Counter IDs are resolved from `names` in order. An unmapped name is
    /// [`Error::InternalMapping`].
    pub fn new(resource_type: &str, resource_id: &str, names: &[&'static str]) -> Result<Self> {
        let counter_ids = names
            .iter()
            .map(|name| valuemap::counter_id(name))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            stats_uid: format!("{}:{}", resource_type, resource_id),
            counter_names: names.to_vec(),
            counter_ids,
        })
    }

    /// `CMO_STATISTIC_UUID` value
    pub fn stats_uid(&self) -> &str {
        &self.stats_uid
    }

    /// Logical names in request order
    pub fn counter_names(&self) -> &[&'static str] {
        &self.counter_names
    }

    /// Vendor counter IDs in request order
    pub fn counter_ids(&self) -> &[&'static str] {
        &self.counter_ids
    }

    /// `CMO_STATISTIC_DATA_ID_LIST` value
    pub fn joined_ids(&self) -> String {
        self.counter_ids.join(",")
    }

    /// Pair a raw `CMO_STATISTIC_DATA_LIST` string with the requested names
    ///
    /// Value `i` belongs to name `i`. Fewer values than names is a
    /// [`Error::MalformedResponse`]; trailing extra values are dropped.
    pub fn pair(&self, raw: &str) -> Result<Vec<(&'static str, String)>> {
        let values: Vec<&str> = raw.split(',').collect();

        if values.len() < self.counter_names.len() {
            return Err(Error::malformed(
                format!("performance counters for {}", self.stats_uid),
                format!(
                    "expected {} values, got {} ({:?})",
                    self.counter_names.len(),
                    values.len(),
                    raw
                ),
            ));
        }

        if values.len() > self.counter_names.len() {
            debug!(
                "Ignoring {} surplus counter values for {}",
                values.len() - self.counter_names.len(),
                self.stats_uid
            );
        }

        Ok(self
            .counter_names
            .iter()
            .zip(values)
            .map(|(name, value)| (*name, value.to_string()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const DISK: &[&str] = &[
        "read_iops",
        "read_mbytes",
        "write_iops",
        "write_mbytes",
        "avg_read_latency",
        "avg_write_latency",
        "queue_length",
    ];

    #[test]
    fn test_request_ids_follow_names() {
        let req = PerformanceCounterRequest::new("10", "0.3", DISK).unwrap();
        assert_eq!(req.stats_uid(), "10:0.3");
        assert_eq!(req.joined_ids(), "22,23,28,26,384,385,19");
        assert_eq!(req.counter_names(), DISK);
    }

    #[test]
    fn test_pair_positional() {
        let req = PerformanceCounterRequest::new("10", "1", DISK).unwrap();
        let pairs = req.pair("100,5000,80,4000,2,3,10").unwrap();
        assert_eq!(
            pairs,
            vec![
                ("read_iops", "100".to_string()),
                ("read_mbytes", "5000".to_string()),
                ("write_iops", "80".to_string()),
                ("write_mbytes", "4000".to_string()),
                ("avg_read_latency", "2".to_string()),
                ("avg_write_latency", "3".to_string()),
                ("queue_length", "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_permuted_request_permutes_pairing() {
        let forward = PerformanceCounterRequest::new("10", "1", &["read_iops", "write_iops", "usage"]).unwrap();
        let reversed = PerformanceCounterRequest::new("10", "1", &["usage", "write_iops", "read_iops"]).unwrap();
        assert_eq!(forward.joined_ids(), "22,28,18");
        assert_eq!(reversed.joined_ids(), "18,28,22");

        // The array answers in the order asked, so the same counters come
        // back reversed and must land on the same names.
        let a = forward.pair("1,2,3").unwrap();
        let mut b = reversed.pair("3,2,1").unwrap();
        b.reverse();
        assert_eq!(a, b);
    }

    #[test]
    fn test_short_response_is_malformed() {
        let req = PerformanceCounterRequest::new("10", "1", DISK).unwrap();
        assert_matches!(
            req.pair("100,5000,80"),
            Err(Error::MalformedResponse { .. })
        );
    }

    #[test]
    fn test_surplus_values_ignored() {
        let req = PerformanceCounterRequest::new("212", "1", &["usage", "queue_length"]).unwrap();
        let pairs = req.pair("7,8,9,10").unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1], ("queue_length", "8".to_string()));
    }

    #[test]
    fn test_unknown_counter_name() {
        assert_matches!(
            PerformanceCounterRequest::new("10", "1", &["read_iops", "not_a_counter"]),
            Err(Error::InternalMapping(_))
        );
    }
}
