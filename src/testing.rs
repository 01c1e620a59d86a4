//! Test support: an in-memory array and a capturing diagnostics sink.

use crate::domain::counters::PerformanceCounterRequest;
use crate::domain::ports::{ArrayApi, ArraySession, SessionState};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{Dispatch, Level};

// =============================================================================
// Fake Array
// =============================================================================

/// Calls observed by a [`FakeArray`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Login,
    Collection(String),
    Counters { stats_uid: String, ids: String },
    Logout,
}

/// Array double serving canned collections and counter strings
///
/// Clones share one call log, so a clone handed to a spawned task can still
/// be inspected from the test.
#[derive(Default, Clone)]
pub struct FakeArray {
    collections: HashMap<String, Vec<Value>>,
    counters: HashMap<String, String>,
    reject_login: bool,
    fetch_delay: Option<Duration>,
    state: Option<SessionState>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl FakeArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `entries` for `GET /<endpoint>`
    pub fn with_collection(mut self, endpoint: &str, entries: Value) -> Self {
        let entries = match entries {
            Value::Array(entries) => entries,
            other => vec![other],
        };
        self.collections.insert(endpoint.to_string(), entries);
        self
    }

    /// Serve `raw` as the counter list for `stats_uid`
    pub fn with_counters(mut self, stats_uid: &str, raw: &str) -> Self {
        self.counters.insert(stats_uid.to_string(), raw.to_string());
        self
    }

    /// Answer login with a vendor rejection
    pub fn rejecting_login(mut self) -> Self {
        self.reject_login = true;
        self
    }

    /// Stall every collection fetch for `delay`
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    /// Start out already authenticated
    pub fn authenticated(mut self) -> Self {
        self.state = Some(SessionState::Authenticated);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn logout_count(&self) -> usize {
        self.count(&Call::Logout)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn require_session(&self) -> Result<()> {
        if self.state() == SessionState::Authenticated {
            Ok(())
        } else {
            Err(Error::Configuration("fake array: not logged in".into()))
        }
    }
}

#[async_trait]
impl ArrayApi for FakeArray {
    async fn fetch_collection(&self, endpoint: &str) -> Result<Vec<Value>> {
        self.record(Call::Collection(endpoint.to_string()));
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        self.require_session()?;
        self.collections
            .get(endpoint)
            .cloned()
            .ok_or_else(|| Error::malformed(endpoint, "missing `data` key"))
    }

    async fn fetch_performance_counters(
        &self,
        request: &PerformanceCounterRequest,
    ) -> Result<String> {
        self.record(Call::Counters {
            stats_uid: request.stats_uid().to_string(),
            ids: request.joined_ids(),
        });
        self.require_session()?;
        self.counters.get(request.stats_uid()).cloned().ok_or_else(|| {
            Error::malformed(
                format!("performance counters for {}", request.stats_uid()),
                "empty `data` array",
            )
        })
    }
}

#[async_trait]
impl ArraySession for FakeArray {
    async fn login(&mut self) -> Result<()> {
        self.record(Call::Login);
        if self.reject_login {
            return Err(Error::Authentication {
                code: 1,
                description: "bad credentials".into(),
                suggestion: "retry".into(),
            });
        }
        self.state = Some(SessionState::Authenticated);
        Ok(())
    }

    async fn logout(&mut self) {
        self.record(Call::Logout);
        if self.state() == SessionState::Authenticated {
            self.state = Some(SessionState::Closed);
        }
    }

    fn state(&self) -> SessionState {
        self.state.unwrap_or(SessionState::Unauthenticated)
    }
}

// =============================================================================
// Diagnostics Capture
// =============================================================================

/// Text written by a capturing dispatcher
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A dispatcher that records formatted events at `level` and above
pub fn capture_diagnostics(level: Level) -> (Dispatch, Captured) {
    let captured = Captured::default();
    let sink = captured.0.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .with_writer(move || CaptureWriter(sink.clone()))
        .finish();
    (Dispatch::new(subscriber), captured)
}
