// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Common helpers for integration tests: server spawning and a
//! deterministic fault injector.

use std::sync::Arc;
use std::time::Duration;

use mock_backend::config::Config;
use mock_backend::fault_injector::{FaultDecision, FaultInjector, RandomFaultInjector};
use mock_backend::log_processor::CollectorLogProcessor;
use mock_backend::mock_backend::MockBackend;
use mock_backend::stats_aggregator::StatsAggregator;

pub fn test_config(port: u16) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port,
        verbose: false,
        simulate_delay: false,
        simulate_failures: false,
        failure_rate: 0.0,
        max_request_content_length: 10_000_000,
    }
}

/// Always returns the same decision, so tests control disruption without a
/// random draw.
pub struct FixedFaultInjector(pub FaultDecision);

impl FaultInjector for FixedFaultInjector {
    fn evaluate(&self, _config: &Config) -> FaultDecision {
        self.0
    }
}

pub async fn spawn_backend(config: Config) -> Arc<StatsAggregator> {
    spawn_backend_with_injector(config, Arc::new(RandomFaultInjector)).await
}

/// Starts a backend in the background and waits until it is accepting
/// connections. The returned aggregator is the one the server records into.
pub async fn spawn_backend_with_injector(
    config: Config,
    fault_injector: Arc<dyn FaultInjector + Send + Sync>,
) -> Arc<StatsAggregator> {
    let stats = Arc::new(StatsAggregator::new());
    let backend = MockBackend {
        config: Arc::new(config),
        log_processor: Arc::new(CollectorLogProcessor {}),
        fault_injector,
        stats: stats.clone(),
    };

    tokio::spawn(async move {
        if let Err(e) = backend.start().await {
            panic!("mock backend failed to start: {e}");
        }
    });

    // Give the server time to bind
    tokio::time::sleep(Duration::from_millis(100)).await;
    stats
}

pub fn valid_batch(count: i64) -> serde_json::Value {
    serde_json::json!({
        "logs": [
            {"program": "sshd", "message": "session opened", "timestamp": 1700000000},
        ],
        "count": count,
        "collector_version": "1.4.2",
    })
}
