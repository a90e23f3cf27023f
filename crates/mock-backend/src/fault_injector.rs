// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Artificial latency and failure injection for valid submissions.

use std::time::Duration;

use crate::config::Config;

const MIN_DELAY_SECS: f64 = 0.1;
const MAX_DELAY_SECS: f64 = 2.0;

/// What to do to an otherwise-valid request before responding.
///
/// Delay and failure are decided independently; a request may be delayed and
/// then failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultDecision {
    pub delay: Option<Duration>,
    pub inject_failure: bool,
}

/// Decides per-request disruption. The trait is the seam for tests, which
/// swap in a fixed decision instead of a random draw.
pub trait FaultInjector {
    fn evaluate(&self, config: &Config) -> FaultDecision;
}

/// Production policy: uniform random delay and failure draws. No seeding,
/// no reproducibility guarantee.
#[derive(Debug, Clone, Default)]
pub struct RandomFaultInjector;

impl FaultInjector for RandomFaultInjector {
    fn evaluate(&self, config: &Config) -> FaultDecision {
        let delay = if config.simulate_delay {
            let secs = MIN_DELAY_SECS + fastrand::f64() * (MAX_DELAY_SECS - MIN_DELAY_SECS);
            Some(Duration::from_secs_f64(secs))
        } else {
            None
        };

        // fastrand::f64() is in [0, 1), so a rate of 1.0 always fails and a
        // rate of 0.0 never does.
        let inject_failure = config.simulate_failures && fastrand::f64() < config.failure_rate;

        FaultDecision {
            delay,
            inject_failure,
        }
    }
}
