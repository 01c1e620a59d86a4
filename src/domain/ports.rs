//! Domain Ports - Core trait definitions for the exporter
//!
//! These traits define the boundaries between the collection pipeline and
//! the storage array. The OceanStor session client implements them against
//! the real REST API; tests implement them with canned payloads.

use crate::domain::counters::PerformanceCounterRequest;
use crate::domain::metric::MetricRecord;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

// =============================================================================
// Session State
// =============================================================================

/// Lifecycle of an array session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No login attempted yet, or login failed
    Unauthenticated,
    /// Device ID and token held
    Authenticated,
    /// Logged out; the session cannot be reused
    Closed,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Unauthenticated => write!(f, "unauthenticated"),
            SessionState::Authenticated => write!(f, "authenticated"),
            SessionState::Closed => write!(f, "closed"),
        }
    }
}

// =============================================================================
// Array API Port
// =============================================================================

/// Read access to an authenticated array
#[async_trait]
pub trait ArrayApi: Send + Sync {
    /// Fetch the `data` array of `GET /<deviceID>/<endpoint>`
    ///
    /// Entries are returned as raw JSON objects, untouched.
    async fn fetch_collection(&self, endpoint: &str) -> Result<Vec<Value>>;

    /// Fetch the raw `CMO_STATISTIC_DATA_LIST` string for one component
    async fn fetch_performance_counters(&self, request: &PerformanceCounterRequest)
        -> Result<String>;
}

// =============================================================================
// Session Port
// =============================================================================

/// Login/logout lifecycle on top of [`ArrayApi`]
#[async_trait]
pub trait ArraySession: ArrayApi {
    /// Authenticate; `Unauthenticated -> Authenticated`
    async fn login(&mut self) -> Result<()>;

    /// Close the session; best-effort, never fails
    async fn logout(&mut self);

    /// Current lifecycle state
    fn state(&self) -> SessionState;
}

// =============================================================================
// Collector Port
// =============================================================================

/// One resource type's collector
#[async_trait]
pub trait Collector: Send + Sync {
    /// Module name used in configuration
    fn name(&self) -> &'static str;

    /// REST endpoint under `/<deviceID>/`
    fn endpoint(&self) -> &'static str;

    /// Fetch and normalize every entry of this resource type
    async fn collect(&self, api: &dyn ArrayApi) -> Result<Vec<MetricRecord>>;
}
