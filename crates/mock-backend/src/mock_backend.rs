// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::sync::Arc;
use std::time::Instant;

use hyper::service::service_fn;
use hyper::{http, Method, StatusCode};
use serde_json::json;
use tracing::{debug, error};

use crate::config::Config;
use crate::fault_injector::FaultInjector;
use crate::http_utils::{
    self, json_response, log_and_create_error_response, HttpRequest, HttpResponse,
};
use crate::log_processor::LogProcessor;
use crate::stats_aggregator::StatsAggregator;

const LOGS_ENDPOINT_PATH: &str = "/v1/logs";
const HEALTH_ENDPOINT_PATH: &str = "/health";
const STATS_ENDPOINT_PATH: &str = "/stats";

pub const MOCK_BACKEND_VERSION: &str = "mock-1.0.0";

/// The mock intake server. Submissions go through the log processor; health
/// and statistics queries bypass it and read the aggregator directly.
pub struct MockBackend {
    pub config: Arc<Config>,
    pub log_processor: Arc<dyn LogProcessor + Send + Sync>,
    pub fault_injector: Arc<dyn FaultInjector + Send + Sync>,
    pub stats: Arc<StatsAggregator>,
}

impl MockBackend {
    /// Binds the listener and serves until the process is stopped.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let listener =
            tokio::net::TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        let addr = listener.local_addr()?;
        let start_time = Instant::now();

        // each http request lands in endpoint_handler with its own clones of
        // the shared components
        let log_processor = self.log_processor.clone();
        let fault_injector = self.fault_injector.clone();
        let stats = self.stats.clone();
        let endpoint_config = self.config.clone();

        let service = service_fn(move |req| {
            let log_processor = log_processor.clone();
            let fault_injector = fault_injector.clone();
            let stats = stats.clone();
            let endpoint_config = endpoint_config.clone();

            MockBackend::endpoint_handler(
                endpoint_config,
                req.map(http_utils::incoming_body),
                log_processor,
                fault_injector,
                stats,
                start_time,
            )
        });

        debug!("Mock backend started: listening on {addr}");
        Self::serve_tcp(listener, service).await
    }

    async fn serve_tcp<S>(
        listener: tokio::net::TcpListener,
        service: S,
    ) -> Result<(), Box<dyn std::error::Error>>
    where
        S: hyper::service::Service<hyper::Request<hyper::body::Incoming>, Response = HttpResponse>
            + Clone
            + Send
            + 'static,
        S::Future: Send,
        S::Error: std::error::Error + Send + Sync + 'static,
    {
        let server = hyper::server::conn::http1::Builder::new();
        let mut joinset = tokio::task::JoinSet::new();

        loop {
            let conn = tokio::select! {
                con_res = listener.accept() => match con_res {
                    Err(e)
                        if matches!(
                            e.kind(),
                            io::ErrorKind::ConnectionAborted
                                | io::ErrorKind::ConnectionReset
                                | io::ErrorKind::ConnectionRefused
                        ) =>
                    {
                        continue;
                    }
                    Err(e) => {
                        error!("Server error: {e}");
                        return Err(e.into());
                    }
                    Ok((conn, _)) => conn,
                },
                finished = async {
                    match joinset.join_next().await {
                        Some(finished) => finished,
                        None => std::future::pending().await,
                    }
                } => match finished {
                    Err(e) if e.is_panic() => {
                        // Don't kill server on panic - log and continue
                        error!("Connection handler panicked: {:?}", e);
                        continue;
                    },
                    Ok(()) | Err(_) => continue,
                },
            };
            let conn = hyper_util::rt::TokioIo::new(conn);
            let server = server.clone();
            let service = service.clone();
            joinset.spawn(async move {
                if let Err(e) = server.serve_connection(conn, service).await {
                    error!("Connection error: {e}");
                }
            });
        }
    }

    async fn endpoint_handler(
        config: Arc<Config>,
        req: HttpRequest,
        log_processor: Arc<dyn LogProcessor + Send + Sync>,
        fault_injector: Arc<dyn FaultInjector + Send + Sync>,
        stats: Arc<StatsAggregator>,
        start_time: Instant,
    ) -> http::Result<HttpResponse> {
        match (req.method(), req.uri().path()) {
            (&Method::POST, LOGS_ENDPOINT_PATH) => {
                match log_processor
                    .process_logs(config, req, stats.clone(), fault_injector)
                    .await
                {
                    Ok(res) => Ok(res),
                    Err(err) => {
                        error!("Error processing log submission: {err}");
                        stats.record_error().await;
                        log_and_create_error_response(
                            "Internal server error",
                            StatusCode::INTERNAL_SERVER_ERROR,
                        )
                    }
                }
            }
            (&Method::GET, HEALTH_ENDPOINT_PATH) => Self::health_handler(start_time),
            (&Method::GET, STATS_ENDPOINT_PATH) => Self::stats_handler(&stats).await,
            _ => {
                stats.record_error().await;
                log_and_create_error_response("Not Found", StatusCode::NOT_FOUND)
            }
        }
    }

    fn health_handler(start_time: Instant) -> http::Result<HttpResponse> {
        let body = json!({
            "status": "healthy",
            "timestamp": http_utils::now_rfc3339(),
            "uptime": start_time.elapsed().as_secs_f64(),
            "version": MOCK_BACKEND_VERSION,
        });
        json_response(StatusCode::OK, &body)
    }

    async fn stats_handler(stats: &StatsAggregator) -> http::Result<HttpResponse> {
        let body = json!({
            "statistics": stats.snapshot().await,
            "timestamp": http_utils::now_rfc3339(),
        });
        json_response(StatusCode::OK, &body)
    }
}
