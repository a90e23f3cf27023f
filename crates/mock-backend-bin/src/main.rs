// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::{env, sync::Arc, time::Instant};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use mock_backend::{
    config, fault_injector::RandomFaultInjector, log_processor::CollectorLogProcessor,
    mock_backend::MockBackend, stats_aggregator::StatsAggregator,
};

#[tokio::main]
pub async fn main() {
    let log_level = env::var("MOCK_BACKEND_LOG_LEVEL")
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("hyper=off,{}", log_level);

    #[allow(clippy::expect_used)]
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(env_filter).expect("could not parse log level in configuration"),
        )
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    #[allow(clippy::expect_used)]
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("Logging subsystem enabled");

    let config = match config::Config::new() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!("Error creating config on mock backend startup: {e}");
            return;
        }
    };

    let stats = Arc::new(StatsAggregator::new());

    let backend = MockBackend {
        config: Arc::clone(&config),
        log_processor: Arc::new(CollectorLogProcessor {}),
        fault_injector: Arc::new(RandomFaultInjector),
        stats: Arc::clone(&stats),
    };

    info!(
        "Mock backend server: http://{}:{}",
        config.host, config.port
    );
    info!(
        "Logs endpoint: http://{}:{}/v1/logs",
        config.host, config.port
    );
    info!("Health check: http://{}:{}/health", config.host, config.port);
    info!("Statistics: http://{}:{}/stats", config.host, config.port);
    if config.simulate_failures {
        info!(
            "Simulating failures at a rate of {:.1}%",
            config.failure_rate * 100.0
        );
    }
    if config.simulate_delay {
        info!("Simulating processing delays");
    }

    let start_time = Instant::now();
    tokio::spawn(async move {
        if let Err(e) = backend.start().await {
            error!("Error when starting mock backend server: {e:?}");
        }
    });

    #[allow(clippy::expect_used)]
    tokio::signal::ctrl_c()
        .await
        .expect("failed to listen for shutdown signal");

    let final_stats = stats.snapshot().await;
    info!(
        "Shutting down after {:.1}s: {} requests, {} logs processed, {} errors",
        start_time.elapsed().as_secs_f64(),
        final_stats.total_requests,
        final_stats.total_logs,
        final_stats.errors
    );
    if final_stats.total_requests > 0 {
        info!(
            "Average logs per request: {:.1}",
            final_stats.total_logs as f64 / final_stats.total_requests as f64
        );
    }
}
