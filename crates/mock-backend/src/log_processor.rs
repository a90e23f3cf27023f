// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use async_trait::async_trait;
use http_body_util::BodyExt;
use hyper::StatusCode;
use serde_json::json;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::fault_injector::FaultInjector;
use crate::http_utils::{
    self, log_and_create_error_response, HttpRequest, HttpResponse,
};
use crate::log_validator::LogBatch;
use crate::stats_aggregator::StatsAggregator;

const MAX_LOGGED_MESSAGE_CHARS: usize = 100;

#[async_trait]
pub trait LogProcessor {
    /// Runs one submission through the whole pipeline: body checks, JSON
    /// decoding, validation, fault injection, statistics update, response.
    /// An Err here means something unexpected broke; the server boundary
    /// turns it into a 500.
    async fn process_logs(
        &self,
        config: Arc<Config>,
        req: HttpRequest,
        stats: Arc<StatsAggregator>,
        fault_injector: Arc<dyn FaultInjector + Send + Sync>,
    ) -> Result<HttpResponse, Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Clone)]
pub struct CollectorLogProcessor {}

#[async_trait]
impl LogProcessor for CollectorLogProcessor {
    async fn process_logs(
        &self,
        config: Arc<Config>,
        req: HttpRequest,
        stats: Arc<StatsAggregator>,
        fault_injector: Arc<dyn FaultInjector + Send + Sync>,
    ) -> Result<HttpResponse, Box<dyn std::error::Error + Send + Sync>> {
        debug!("Received log submission");
        let (parts, body) = req.into_parts();

        if let Some(response) = http_utils::verify_request_content_length(
            &parts.headers,
            config.max_request_content_length,
        ) {
            stats.record_error().await;
            return Ok(response?);
        }

        let body_bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                stats.record_error().await;
                return Ok(log_and_create_error_response(
                    &format!("Error reading request body: {e}"),
                    StatusCode::BAD_REQUEST,
                )?);
            }
        };
        if body_bytes.is_empty() {
            stats.record_error().await;
            return Ok(log_and_create_error_response(
                "Empty request body",
                StatusCode::BAD_REQUEST,
            )?);
        }

        let payload: serde_json::Value = match serde_json::from_slice(&body_bytes) {
            Ok(payload) => payload,
            Err(e) => {
                stats.record_error().await;
                return Ok(log_and_create_error_response(
                    &format!("Invalid JSON: {e}"),
                    StatusCode::BAD_REQUEST,
                )?);
            }
        };

        let batch = match LogBatch::validate(&payload) {
            Ok(batch) => batch,
            Err(reason) => {
                // The reason stays in the log; clients only see the generic
                // rejection and must not branch on the detail.
                error!("Rejected log batch: {reason}");
                stats.record_error().await;
                return Ok(log_and_create_error_response(
                    "Invalid log data structure",
                    StatusCode::BAD_REQUEST,
                )?);
            }
        };

        let decision = fault_injector.evaluate(&config);
        if let Some(delay) = decision.delay {
            debug!("Delaying response by {:.3}s", delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }
        if decision.inject_failure {
            stats.record_error().await;
            return Ok(log_and_create_error_response(
                "Simulated server error",
                StatusCode::INTERNAL_SERVER_ERROR,
            )?);
        }

        log_received_batch(&config, &batch);
        stats.record_success(batch.advisory_log_count()).await;

        let response = json!({
            "status": "success",
            "received_count": batch.count,
            "timestamp": http_utils::now_rfc3339(),
            "message": "Logs processed successfully",
        });
        Ok(http_utils::json_response(StatusCode::OK, &response)?)
    }
}

fn log_received_batch(config: &Config, batch: &LogBatch) {
    info!(
        "Received batch: {} logs from collector v{}",
        batch.count, batch.collector_version
    );
    if config.verbose {
        for (i, entry) in batch.logs.iter().enumerate() {
            let message: String = entry
                .message
                .chars()
                .take(MAX_LOGGED_MESSAGE_CHARS)
                .collect();
            debug!(
                "  [{}] {}.{}.{}: {}",
                i + 1,
                entry.program,
                entry.facility.as_deref().unwrap_or(""),
                entry.priority.as_deref().unwrap_or(""),
                message
            );
        }
    }
}
