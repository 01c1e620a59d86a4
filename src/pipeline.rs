//! Metric Pipeline Driver
//!
//! Runs the configured collectors, in order, against one array session and
//! concatenates their records. A scrape wraps this in the session lifecycle:
//! login, collect, then exactly one logout whatever the collectors did.

use crate::collectors::{labels, CollectorRegistry};
use crate::domain::metric::{self, MetricRecord};
use crate::domain::ports::{ArrayApi, ArraySession};
use crate::error::Result;
use std::time::{Duration, Instant};
use tracing::instrument::WithSubscriber;
use tracing::{debug, info, Dispatch};

/// Ordered collector run over one session
#[derive(Debug, Clone)]
pub struct Pipeline {
    registry: CollectorRegistry,
    modules: Vec<String>,
    diagnostics: Dispatch,
}

impl Pipeline {
    /// Create a pipeline running `modules` in order
    ///
    /// Names are resolved as the run reaches them; use
    /// [`CollectorRegistry::validate`] to reject bad names before any I/O.
    pub fn new(registry: CollectorRegistry, modules: Vec<String>) -> Self {
        Self {
            registry,
            modules,
            diagnostics: tracing::dispatcher::get_default(|d| d.clone()),
        }
    }

    /// Send diagnostics to `dispatch`
    pub fn with_diagnostics(mut self, dispatch: Dispatch) -> Self {
        self.diagnostics = dispatch;
        self
    }

    /// Modules this pipeline runs
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Run every module against an already authenticated array
    ///
    /// The duration record covers the collectors only.
    pub async fn collect(&self, api: &dyn ArrayApi) -> Result<Vec<MetricRecord>> {
        let dispatch = self.diagnostics.clone();
        async {
            let started = Instant::now();
            let mut records = self.run_collectors(api).await?;
            records.push(duration_record(started.elapsed()));
            Ok(records)
        }
        .with_subscriber(dispatch)
        .await
    }

    /// Log in, run every module, log out
    ///
    /// Logout is attempted exactly once after a successful login, also when
    /// a collector fails or a module name is unknown. A failed login returns
    /// immediately: nothing was opened, so nothing is closed.
    ///
    /// Dropping the future before it completes skips logout. Callers that can
    /// be cancelled run it on a spawned task, as [`crate::server::Exporter`] does.
    pub async fn scrape<S: ArraySession>(&self, session: &mut S) -> Result<Vec<MetricRecord>> {
        let dispatch = self.diagnostics.clone();
        self.scrape_inner(session).with_subscriber(dispatch).await
    }

    async fn scrape_inner<S: ArraySession>(&self, session: &mut S) -> Result<Vec<MetricRecord>> {
        let started = Instant::now();
        session.login().await?;

        let result = self.run_collectors(&*session).await.map(|mut records| {
            records.push(duration_record(started.elapsed()));
            records
        });

        session.logout().await;

        if let Ok(records) = &result {
            info!(
                "Scrape complete: {} records in {} ms",
                records.len(),
                started.elapsed().as_millis()
            );
        }
        result
    }

    async fn run_collectors(&self, api: &dyn ArrayApi) -> Result<Vec<MetricRecord>> {
        let mut records = Vec::new();

        for module in &self.modules {
            let collector = self.registry.resolve(module)?;
            debug!("Collecting {}", collector.name());

            let collected = collector.collect(api).await.map_err(|e| {
                debug!("Collector {} failed: {}", collector.name(), e);
                e
            })?;
            debug!("Collector {} produced {} records", collector.name(), collected.len());
            records.extend(collected);
        }

        Ok(records)
    }
}

/// Self-observability record: pipeline wall time in milliseconds
pub fn duration_record(elapsed: Duration) -> MetricRecord {
    MetricRecord::new(
        metric::EXPORTER_DURATION,
        elapsed.as_millis().to_string(),
        &labels(&[("version", crate::VERSION)]),
    )
}
