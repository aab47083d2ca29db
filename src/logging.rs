// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tracing subscriber setup.
//!
//! Logs go to stderr so that stdout only carries the plugin's own status
//! lines. `RUST_LOG` selects the filter, `LOG_FORMAT=json` switches to JSON
//! output for log shippers. Both are read from the captured [`Environment`],
//! never from the live process environment.

use tracing_subscriber::EnvFilter;

use crate::config::{Environment, LOG_FORMAT_ENV, RUST_LOG_ENV};

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_environment(env: &Environment) -> Self {
        match env.optional(LOG_FORMAT_ENV).as_deref() {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Filter built from the snapshot's `RUST_LOG`, falling back to `info` when
/// it is unset or does not parse.
pub fn env_filter(env: &Environment) -> EnvFilter {
    env.optional(RUST_LOG_ENV)
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init_tracing(env: &Environment) {
    let filter = env_filter(env);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = match LogFormat::from_environment(env) {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
}
