//! OceanStor Session Client
//!
//! Owns the authenticated DeviceManager session: login, resource collection
//! fetches, performance counter fetches and logout.

use crate::domain::counters::PerformanceCounterRequest;
use crate::domain::ports::{ArrayApi, ArraySession, SessionState};
use crate::error::{Error, Result};
use crate::oceanstor::wire;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;
use tracing::instrument::WithSubscriber;
use tracing::{debug, info, warn, Dispatch};

/// Header carrying the session token
pub const TOKEN_HEADER: &str = "iBaseToken";

/// Default DeviceManager REST port
pub const DEFAULT_PORT: u16 = 8088;

/// Path of the performance statistic endpoint (vendor spelling)
const CUR_STATISTIC_PATH: &str = "performace_statistic/cur_statistic_data";

// =============================================================================
// Configuration
// =============================================================================

/// Connection settings for one array
#[derive(Clone)]
pub struct ClientConfig {
    /// Management address of the array
    pub host: String,
    /// DeviceManager REST port
    pub port: u16,
    /// Login name
    pub username: String,
    /// Login password
    pub password: String,
    /// Per-request timeout, connect included
    pub timeout: Duration,
    /// Verify the array's TLS certificate (arrays ship self-signed)
    pub verify_tls: bool,
}

impl ClientConfig {
    /// Base URL of the DeviceManager REST API
    pub fn base_url(&self) -> String {
        format!("https://{}:{}/deviceManager/rest", self.host, self.port)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

// =============================================================================
// Session
// =============================================================================

enum Session {
    Unauthenticated,
    Authenticated { device_id: String, token: String },
    Closed,
}

/// Client for the OceanStor DeviceManager REST API
///
/// One client carries one session: `login` once, share it across every
/// collector of a run, then `logout`. A closed client cannot log in again.
pub struct OceanStorClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    session: Session,
    diagnostics: Dispatch,
}

impl OceanStorClient {
    /// Create a client for the array described by `config`
    ///
    /// Diagnostics go to the dispatcher that is current at construction.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .cookie_store(true)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| Error::transport("client setup", e))?;

        Ok(Self {
            http,
            base_url: config.base_url(),
            username: config.username.clone(),
            password: config.password.clone(),
            session: Session::Unauthenticated,
            diagnostics: tracing::dispatcher::get_default(|d| d.clone()),
        })
    }

    /// Point the client at a different REST root (proxies, test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Send diagnostics to `dispatch` instead of the construction-time default
    pub fn with_diagnostics(mut self, dispatch: Dispatch) -> Self {
        self.diagnostics = dispatch;
        self
    }

    /// REST root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn credentials(&self, operation: &str) -> Result<(&str, &str)> {
        match &self.session {
            Session::Authenticated { device_id, token } => Ok((device_id, token)),
            Session::Unauthenticated => Err(Error::Configuration(format!(
                "{} requires an authenticated session",
                operation
            ))),
            Session::Closed => Err(Error::Configuration(format!(
                "{} on a closed session",
                operation
            ))),
        }
    }

    async fn read_json(response: reqwest::Response, context: &str) -> Result<Value> {
        let response = response
            .error_for_status()
            .map_err(|e| Error::transport(context, e))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::transport(context, e))?;
        serde_json::from_slice(&body)
            .map_err(|e| Error::malformed(context, format!("invalid JSON: {}", e)))
    }

    async fn login_inner(&mut self) -> Result<()> {
        match self.session {
            Session::Authenticated { .. } => {
                debug!("Session already authenticated");
                return Ok(());
            }
            Session::Closed => {
                return Err(Error::Configuration(
                    "cannot log in on a closed session".into(),
                ))
            }
            Session::Unauthenticated => {}
        }

        debug!("Logging in to {} as {}", self.base_url, self.username);

        let url = format!("{}/xxxxx/sessions", self.base_url);
        let body = serde_json::json!({
            "scope": 0,
            "username": self.username,
            "password": self.password,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::transport("login", e))?;
        let payload = Self::read_json(response, "login").await?;

        let data = match wire::parse_login(payload) {
            Ok(data) => data,
            Err(e) => {
                debug!("Login failed: {}", e);
                return Err(e);
            }
        };

        debug!("Session established: deviceid={} token={}", data.device_id, data.token);
        info!("Logged in to {}", self.base_url);

        self.session = Session::Authenticated {
            device_id: data.device_id,
            token: data.token,
        };
        Ok(())
    }

    async fn fetch_collection_inner(&self, endpoint: &str) -> Result<Vec<Value>> {
        let (device_id, token) = self.credentials("fetch collection")?;
        let url = format!("{}/{}/{}", self.base_url, device_id, endpoint);

        debug!("Fetching collection {}", endpoint);

        let response = self
            .http
            .get(&url)
            .header(TOKEN_HEADER, token)
            .send()
            .await
            .map_err(|e| Error::transport(endpoint, e))?;
        let payload = Self::read_json(response, endpoint).await?;

        let entries = wire::parse_collection(endpoint, payload)?;
        debug!("Fetched {} {} entries", entries.len(), endpoint);
        Ok(entries)
    }

    async fn fetch_counters_inner(&self, request: &PerformanceCounterRequest) -> Result<String> {
        let (device_id, token) = self.credentials("fetch performance counters")?;
        let url = format!("{}/{}/{}", self.base_url, device_id, CUR_STATISTIC_PATH);
        let ids = request.joined_ids();

        debug!("Fetching counters {} for {}", ids, request.stats_uid());

        let context = format!("performance counters for {}", request.stats_uid());
        let response = self
            .http
            .get(&url)
            .header(TOKEN_HEADER, token)
            .query(&[
                ("CMO_STATISTIC_UUID", request.stats_uid()),
                ("CMO_STATISTIC_DATA_ID_LIST", ids.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::transport(context.as_str(), e))?;
        let payload = Self::read_json(response, &context).await?;

        wire::parse_counters(request.stats_uid(), payload)
    }

    async fn logout_inner(&mut self) {
        let (device_id, token) = match std::mem::replace(&mut self.session, Session::Closed) {
            Session::Authenticated { device_id, token } => (device_id, token),
            Session::Closed => {
                debug!("Session already closed");
                return;
            }
            Session::Unauthenticated => {
                self.session = Session::Unauthenticated;
                debug!("No session to close");
                return;
            }
        };

        debug!("Logging out of {}", self.base_url);

        let url = format!("{}/{}/sessions", self.base_url, device_id);
        match self.http.delete(&url).header(TOKEN_HEADER, token).send().await {
            Ok(response) if response.status().is_success() => {
                match response.text().await {
                    Ok(body) => debug!("Logout response: {}", body),
                    Err(e) => debug!("Logout response unreadable: {}", e),
                }
            }
            Ok(response) => warn!("Logout returned HTTP {}", response.status()),
            Err(e) => warn!("Logout failed: {}", e),
        }
    }
}

impl std::fmt::Debug for OceanStorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OceanStorClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("state", &self.state())
            .finish()
    }
}

#[async_trait]
impl ArrayApi for OceanStorClient {
    async fn fetch_collection(&self, endpoint: &str) -> Result<Vec<Value>> {
        let dispatch = self.diagnostics.clone();
        self.fetch_collection_inner(endpoint)
            .with_subscriber(dispatch)
            .await
    }

    async fn fetch_performance_counters(
        &self,
        request: &PerformanceCounterRequest,
    ) -> Result<String> {
        let dispatch = self.diagnostics.clone();
        self.fetch_counters_inner(request)
            .with_subscriber(dispatch)
            .await
    }
}

#[async_trait]
impl ArraySession for OceanStorClient {
    async fn login(&mut self) -> Result<()> {
        let dispatch = self.diagnostics.clone();
        self.login_inner().with_subscriber(dispatch).await
    }

    async fn logout(&mut self) {
        let dispatch = self.diagnostics.clone();
        self.logout_inner().with_subscriber(dispatch).await
    }

    fn state(&self) -> SessionState {
        match self.session {
            Session::Unauthenticated => SessionState::Unauthenticated,
            Session::Authenticated { .. } => SessionState::Authenticated,
            Session::Closed => SessionState::Closed,
        }
    }
}
