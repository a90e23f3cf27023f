// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FAILURE_RATE: f64 = 0.1;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// log every entry of every accepted batch
    pub verbose: bool,
    /// suspend each valid submission for a random interval before responding
    pub simulate_delay: bool,
    /// fail a fraction of valid submissions with a 500
    pub simulate_failures: bool,
    /// probability in [0, 1] that a valid submission is failed on purpose
    pub failure_rate: f64,
    pub max_request_content_length: usize,
}

impl Config {
    pub fn new() -> Result<Config, Box<dyn std::error::Error>> {
        let host = env::var("MOCK_BACKEND_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        if host.is_empty() {
            return Err(anyhow::anyhow!("MOCK_BACKEND_HOST must not be empty").into());
        }

        let port: u16 = env::var("MOCK_BACKEND_PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let failure_rate = env::var("MOCK_BACKEND_FAILURE_RATE")
            .ok()
            .and_then(|rate| rate.parse::<f64>().ok())
            .filter(|rate| !rate.is_nan())
            .unwrap_or(DEFAULT_FAILURE_RATE);

        Ok(Config {
            host,
            port,
            verbose: env_flag("MOCK_BACKEND_VERBOSE"),
            simulate_delay: env_flag("MOCK_BACKEND_SIMULATE_DELAY"),
            simulate_failures: env_flag("MOCK_BACKEND_SIMULATE_FAILURES"),
            failure_rate: failure_rate.clamp(0.0, 1.0),
            max_request_content_length: 10 * 1024 * 1024, // 10MB in Bytes
        })
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|val| val.to_lowercase() == "true")
        .unwrap_or(false)
}
