//! Prometheus-backed metrics and HTTP exporter.
//!
//! This module defines a [`MetricsRegistry`] that owns a Prometheus
//! registry and a set of strongly-typed node metrics, and an async HTTP
//! exporter that serves `/metrics` using `hyper`.

use std::{convert::Infallible, net::SocketAddr, sync::Arc};

use bytes::Bytes;
use http_body_util::Full;
use hyper::{
    Method, Request, Response, StatusCode, body::Incoming, header, server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use prometheus::{self, Encoder, IntCounter, Opts, Registry, TextEncoder};

/// Node-level Prometheus metrics.
///
/// These are registered into a [`Registry`] and updated from the engine
/// and from the HTTP facade as requests are served.
#[derive(Clone)]
pub struct NodeMetrics {
    /// Transactions accepted into the open-transaction pool.
    pub transactions_admitted: IntCounter,
    /// Transactions rejected (bad signature, insufficient funds).
    pub transactions_rejected: IntCounter,
    /// Blocks this node mined itself.
    pub blocks_mined: IntCounter,
    /// Blocks accepted from a peer broadcast.
    pub blocks_received: IntCounter,
    /// Outbound broadcasts (transaction or block) that failed.
    pub broadcasts_failed: IntCounter,
    /// Conflict resolutions performed.
    pub resolutions_performed: IntCounter,
    /// Conflict resolutions that replaced the local chain.
    pub resolutions_adopted: IntCounter,
}

impl NodeMetrics {
    /// Registers node metrics into the given `Registry`.
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let transactions_admitted = IntCounter::with_opts(Opts::new(
            "node_transactions_admitted_total",
            "Total number of transactions admitted into the open-transaction pool",
        ))?;
        registry.register(Box::new(transactions_admitted.clone()))?;

        let transactions_rejected = IntCounter::with_opts(Opts::new(
            "node_transactions_rejected_total",
            "Total number of transactions rejected",
        ))?;
        registry.register(Box::new(transactions_rejected.clone()))?;

        let blocks_mined = IntCounter::with_opts(Opts::new(
            "node_blocks_mined_total",
            "Total number of blocks mined by this node",
        ))?;
        registry.register(Box::new(blocks_mined.clone()))?;

        let blocks_received = IntCounter::with_opts(Opts::new(
            "node_blocks_received_total",
            "Total number of blocks accepted from peer broadcasts",
        ))?;
        registry.register(Box::new(blocks_received.clone()))?;

        let broadcasts_failed = IntCounter::with_opts(Opts::new(
            "node_broadcasts_failed_total",
            "Total number of outbound broadcasts that failed",
        ))?;
        registry.register(Box::new(broadcasts_failed.clone()))?;

        let resolutions_performed = IntCounter::with_opts(Opts::new(
            "node_resolutions_performed_total",
            "Total number of conflict resolutions performed",
        ))?;
        registry.register(Box::new(resolutions_performed.clone()))?;

        let resolutions_adopted = IntCounter::with_opts(Opts::new(
            "node_resolutions_adopted_total",
            "Total number of conflict resolutions that replaced the local chain",
        ))?;
        registry.register(Box::new(resolutions_adopted.clone()))?;

        Ok(Self {
            transactions_admitted,
            transactions_rejected,
            blocks_mined,
            blocks_received,
            broadcasts_failed,
            resolutions_performed,
            resolutions_adopted,
        })
    }
}

/// Wrapper around a Prometheus registry and the node metrics.
///
/// This is the main handle passed around in the node. It can be wrapped
/// in an [`Arc`] and shared across threads/tasks.
#[derive(Clone)]
pub struct MetricsRegistry {
    registry: Registry,
    pub node: NodeMetrics,
}

impl MetricsRegistry {
    /// Creates a new `MetricsRegistry` with a fresh underlying `Registry`
    /// and registers the node metrics.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new_custom(Some("chain".to_string()), None)?;
        let node = NodeMetrics::register(&registry)?;
        Ok(Self { registry, node })
    }

    /// Encodes all metrics in this registry into the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            eprintln!("failed to encode Prometheus metrics: {e}");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Runs an HTTP server that exposes Prometheus metrics.
///
/// The server listens on `addr` and serves `GET /metrics` with the
/// Prometheus text exposition format. All other paths return 404.
///
/// This function is `async` and is intended to be spawned onto a Tokio
/// runtime, e.g.:
///
/// ```ignore
/// let registry = Arc::new(MetricsRegistry::new()?);
/// let addr: SocketAddr = "127.0.0.1:6001".parse()?;
/// tokio::spawn(run_prometheus_http_server(registry.clone(), addr));
/// ```
pub async fn run_prometheus_http_server(
    metrics: Arc<MetricsRegistry>,
    addr: SocketAddr,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let listener = TcpListener::bind(addr).await?;

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let metrics = metrics.clone();

        tokio::spawn(async move {
            let svc = service_fn(move |req| {
                let metrics = metrics.clone();
                handle_request(req, metrics)
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, svc).await {
                eprintln!("prometheus HTTP server error: {err}");
            }
        });
    }
}

async fn handle_request(
    req: Request<Incoming>,
    metrics: Arc<MetricsRegistry>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/metrics") => {
            let body = metrics.gather_text();
            Ok(Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/plain; version=0.0.4")
                .body(Full::new(Bytes::from(body)))
                .unwrap())
        }
        _ => Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Full::new(Bytes::from("not found")))
            .unwrap()),
    }
}
