//! Metrics Server
//!
//! Serve mode: an HTTP endpoint that scrapes the array on every
//! `GET /metrics`. Scrapes are serialized so the array never sees two
//! sessions from this exporter at once, and each scrape logs in afresh.
//!
//! A scrape runs on its own task. When the HTTP client goes away mid-scrape
//! the task still finishes and logs out, and the next scrape waits for it.

use crate::collectors::CollectorRegistry;
use crate::config::Target;
use crate::domain::{ArraySession, MetricRecord};
use crate::error::{Error, Result};
use crate::exposition::{render, SelfMetrics};
use crate::oceanstor::{ClientConfig, OceanStorClient};
use crate::pipeline::Pipeline;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, info_span, warn, Instrument};

const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

// =============================================================================
// Sessions
// =============================================================================

/// Opens a fresh, logged-out session for each scrape
pub trait SessionFactory: Send + Sync + 'static {
    type Session: ArraySession + 'static;

    fn connect(&self) -> Result<Self::Session>;
}

/// Sessions against the DeviceManager REST API
#[derive(Clone)]
pub struct ClientFactory {
    config: ClientConfig,
    base_url: Option<String>,
}

impl ClientFactory {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            base_url: None,
        }
    }
}

impl SessionFactory for ClientFactory {
    type Session = OceanStorClient;

    fn connect(&self) -> Result<OceanStorClient> {
        let client = OceanStorClient::new(&self.config)?;
        Ok(match &self.base_url {
            Some(base_url) => client.with_base_url(base_url.as_str()),
            None => client,
        })
    }
}

// =============================================================================
// Exporter
// =============================================================================

/// One target, scraped on demand
pub struct Exporter<F = ClientFactory> {
    target: Target,
    registry: CollectorRegistry,
    factory: F,
    self_metrics: SelfMetrics,
    scrape_lock: Arc<Mutex<()>>,
}

impl Exporter<ClientFactory> {
    pub fn new(target: Target, registry: CollectorRegistry) -> Result<Self> {
        let factory = ClientFactory::new(target.client.clone());
        Self::with_factory(target, registry, factory)
    }

    /// Talk to `base_url` instead of the target's DeviceManager address
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.factory.base_url = Some(base_url.into());
        self
    }
}

impl<F: SessionFactory> Exporter<F> {
    pub fn with_factory(target: Target, registry: CollectorRegistry, factory: F) -> Result<Self> {
        Ok(Self {
            target,
            registry,
            factory,
            self_metrics: SelfMetrics::new()?,
            scrape_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn self_metrics(&self) -> &SelfMetrics {
        &self.self_metrics
    }

    /// Run one full scrape and render it with the exporter's own counters
    ///
    /// The session work is spawned and holds the scrape lock until logout,
    /// so dropping the returned future does not abandon an open session.
    pub async fn scrape(self: Arc<Self>) -> Result<String> {
        let guard = self.scrape_lock.clone().lock_owned().await;

        let span = info_span!("target", host = %self.target.client.host);
        let exporter = self.clone();
        let task = tokio::spawn(
            async move {
                let _guard = guard;
                let result = exporter.run_pipeline().await;
                exporter.self_metrics.observe(result.is_ok());
                result
            }
            .instrument(span),
        );
        let records = task
            .await
            .map_err(|e| Error::Internal(format!("scrape task failed: {}", e)))??;

        let mut body = render(&records);
        body.push_str(&self.self_metrics.encode()?);
        Ok(body)
    }

    async fn run_pipeline(&self) -> Result<Vec<MetricRecord>> {
        let mut session = self.factory.connect()?;
        Pipeline::new(self.registry.clone(), self.target.modules.clone())
            .scrape(&mut session)
            .await
    }
}

// =============================================================================
// HTTP Routing
// =============================================================================

/// Answer one HTTP request
pub async fn route<F: SessionFactory>(
    exporter: Arc<Exporter<F>>,
    req: Request<Body>,
) -> Response<Body> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => match exporter.clone().scrape().await {
            Ok(body) => text_response(StatusCode::OK, body),
            Err(e) => {
                error!("Scrape of {} failed: {}", exporter.target.name, e);
                text_response(StatusCode::INTERNAL_SERVER_ERROR, format!("{}\n", e))
            }
        },
        (_, "/healthz") => text_response(StatusCode::OK, "ok"),
        _ => text_response(StatusCode::NOT_FOUND, "not found"),
    }
}

fn text_response(status: StatusCode, body: impl Into<Body>) -> Response<Body> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_FORMAT));
    response
}

/// Serve `exporter` on `addr` until the process is interrupted
pub async fn run_metrics_server<F: SessionFactory>(
    addr: SocketAddr,
    exporter: Arc<Exporter<F>>,
) -> Result<()> {
    let make_svc = make_service_fn(move |_conn| {
        let exporter = exporter.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req: Request<Body>| {
                let exporter = exporter.clone();
                async move { Ok::<_, Infallible>(route(exporter, req).await) }
            }))
        }
    });

    let server = Server::try_bind(&addr)
        .map_err(|e| Error::Configuration(format!("cannot listen on {}: {}", addr, e)))?
        .serve(make_svc);
    info!("Metrics server listening on {}", addr);

    server
        .with_graceful_shutdown(shutdown_signal(tokio::signal::ctrl_c()))
        .await
        .map_err(|e| Error::Internal(format!("Metrics server error: {}", e)))
}

/// Resolve once `signal` fires; never resolve if it cannot be listened for
async fn shutdown_signal<S>(signal: S)
where
    S: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutting down metrics server"),
        Err(e) => {
            warn!("Cannot listen for shutdown signal, serving until killed: {}", e);
            std::future::pending::<()>().await
        }
    }
}
