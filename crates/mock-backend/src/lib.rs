// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Mock backend server for testing collector log submission.
//!
//! Accepts batched log submissions over HTTP, validates their structure, and
//! can inject artificial latency and failures so a collector's retry and
//! backoff behavior can be exercised without a real intake. Nothing is
//! persisted; the server keeps only running counters, exposed through its
//! health and statistics endpoints.

pub mod config;
pub mod fault_injector;
pub mod http_utils;
pub mod log_processor;
pub mod log_validator;
pub mod mock_backend;
pub mod stats_aggregator;
