// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Process-wide request counters.
//!
//! The aggregator is the only state shared between in-flight requests. It is
//! initialized to zero at startup, mutated exactly once per completed
//! request, and never reset while the process lives.

use serde::Serialize;
use tokio::sync::Mutex;

/// Running totals exposed by the statistics endpoint.
///
/// Successful submissions increment `total_requests` and `total_logs`;
/// failed requests increment only `errors`. The split is intentional and
/// mirrors what the collector-side tooling expects to read, even though it
/// means `total_requests` is not "all requests seen".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ServerStats {
    pub total_requests: u64,
    pub total_logs: u64,
    pub errors: u64,
}

/// Serialized access to [`ServerStats`] for arbitrary concurrent callers.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    stats: Mutex<ServerStats>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an accepted batch. `log_count` is the batch's advisory count
    /// field, not the number of entries actually present.
    pub async fn record_success(&self, log_count: u64) {
        let mut stats = self.stats.lock().await;
        stats.total_requests += 1;
        stats.total_logs += log_count;
    }

    pub async fn record_error(&self) {
        self.stats.lock().await.errors += 1;
    }

    /// A consistent copy of all three counters.
    pub async fn snapshot(&self) -> ServerStats {
        *self.stats.lock().await
    }
}
