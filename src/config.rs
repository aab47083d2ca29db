// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines the environment variable names the plugin reads and
//! the [`PluginConfig`] built from them. The process environment is captured
//! once at startup into an [`Environment`] snapshot; everything downstream
//! works from that snapshot.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PLUGIN_NEXTCLOUD_SERVER_URL` | Base URL of the Nextcloud instance | Required |
//! | `PLUGIN_BOT_SECRET` | Shared secret of the Talk bot (HMAC key) | Required |
//! | `PLUGIN_ROOM_ID` | Token of the target Talk room | Required |
//! | `PLUGIN_MESSAGE` | Handlebars template for the message | Build report |
//! | `PLUGIN_TIMEOUT` | HTTP timeout in seconds | `30` |
//! | `DRONE_*` | Build metadata used by the default report | Empty |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |
//!
//! Settings are trimmed and a blank value counts as unset. Two exceptions
//! keep their raw value: the bot secret is the HMAC key and is used byte
//! for byte, and the message template is only absent when unset or empty.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::error::NotifyError;

/// Environment variable name for the Nextcloud base URL.
pub const SERVER_URL_ENV: &str = "PLUGIN_NEXTCLOUD_SERVER_URL";

/// Environment variable name for the bot secret.
pub const BOT_SECRET_ENV: &str = "PLUGIN_BOT_SECRET";

/// Environment variable name for the room token.
pub const ROOM_ID_ENV: &str = "PLUGIN_ROOM_ID";

/// Environment variable name for the optional message template.
pub const MESSAGE_ENV: &str = "PLUGIN_MESSAGE";

/// Environment variable name for the HTTP timeout, in whole seconds.
pub const TIMEOUT_ENV: &str = "PLUGIN_TIMEOUT";

pub const BUILD_STATUS_ENV: &str = "DRONE_BUILD_STATUS";
pub const BRANCH_ENV: &str = "DRONE_BRANCH";
pub const REPO_LINK_ENV: &str = "DRONE_REPO_LINK";
pub const COMMIT_MESSAGE_ENV: &str = "DRONE_COMMIT_MESSAGE";
pub const COMMIT_AUTHOR_ENV: &str = "DRONE_COMMIT_AUTHOR";
pub const COMMIT_SHA_ENV: &str = "DRONE_COMMIT_SHA";
pub const COMMIT_LINK_ENV: &str = "DRONE_COMMIT_LINK";
pub const BUILD_LINK_ENV: &str = "DRONE_BUILD_LINK";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Environment variable name for the tracing filter directives.
pub const RUST_LOG_ENV: &str = "RUST_LOG";

/// Timeout applied to the HTTP exchange when `PLUGIN_TIMEOUT` is unset.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Read-only snapshot of the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Capture the current process environment.
    ///
    /// Entries whose name or value is not valid UTF-8 are skipped.
    pub fn capture() -> Self {
        Self::from_vars(
            std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw value of a variable, exactly as it was set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Trimmed value of a variable, `None` when unset or blank.
    pub fn optional(&self, name: &str) -> Option<String> {
        self.get(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Trimmed value of a variable, empty when unset.
    pub fn or_empty(&self, name: &str) -> String {
        self.optional(name).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// CI metadata used to synthesize the default build report.
///
/// Every field is optional in the environment and defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildInfo {
    pub status: String,
    pub branch: String,
    pub repo_link: String,
    pub commit_message: String,
    pub commit_author: String,
    pub commit_sha: String,
    pub commit_link: String,
    pub build_link: String,
}

impl BuildInfo {
    pub fn from_environment(env: &Environment) -> Self {
        Self {
            status: env.or_empty(BUILD_STATUS_ENV),
            branch: env.or_empty(BRANCH_ENV),
            repo_link: env.or_empty(REPO_LINK_ENV),
            commit_message: env.or_empty(COMMIT_MESSAGE_ENV),
            commit_author: env.or_empty(COMMIT_AUTHOR_ENV),
            commit_sha: env.or_empty(COMMIT_SHA_ENV),
            commit_link: env.or_empty(COMMIT_LINK_ENV),
            build_link: env.or_empty(BUILD_LINK_ENV),
        }
    }
}

/// Validated plugin settings for one run.
#[derive(Debug, Clone)]
pub struct PluginConfig {
    pub server_url: String,
    pub secret: String,
    pub room_id: String,
    /// User template; `None` selects the default build report.
    pub template: Option<String>,
    pub build: BuildInfo,
    pub timeout: Duration,
}

impl PluginConfig {
    /// Build the configuration from an environment snapshot.
    ///
    /// Required settings are checked in a fixed order (server URL, secret,
    /// room id) and the first absent one is reported.
    pub fn from_environment(env: &Environment) -> Result<Self, NotifyError> {
        let server_url = required(env, SERVER_URL_ENV, "NEXTCLOUD_SERVER_URL")?;
        let secret = required_raw(env, BOT_SECRET_ENV, "BOT_SECRET")?;
        let room_id = required(env, ROOM_ID_ENV, "ROOM_ID")?;
        let template = env
            .get(MESSAGE_ENV)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let timeout = parse_timeout(env.optional(TIMEOUT_ENV))?;

        Ok(Self {
            server_url,
            secret,
            room_id,
            template,
            build: BuildInfo::from_environment(env),
            timeout,
        })
    }
}

fn required(env: &Environment, var: &str, label: &'static str) -> Result<String, NotifyError> {
    env.optional(var).ok_or(NotifyError::MissingParameter(label))
}

/// Like [`required`], but hands back the value untrimmed.
fn required_raw(env: &Environment, var: &str, label: &'static str) -> Result<String, NotifyError> {
    match env.get(var) {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => Err(NotifyError::MissingParameter(label)),
    }
}

fn parse_timeout(raw: Option<String>) -> Result<Duration, NotifyError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_TIMEOUT);
    };
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(NotifyError::InvalidParameter {
            name: "TIMEOUT",
            reason: format!("expected a positive number of seconds, got {raw:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_env() -> Vec<(&'static str, &'static str)> {
        vec![
            (SERVER_URL_ENV, "https://cloud.example"),
            (BOT_SECRET_ENV, "s3cret"),
            (ROOM_ID_ENV, "abc123"),
        ]
    }

    fn without(name: &str) -> Environment {
        Environment::from_vars(base_env().into_iter().filter(|(k, _)| *k != name))
    }

    #[test]
    fn loads_required_settings_and_defaults() {
        let config = PluginConfig::from_environment(&Environment::from_vars(base_env())).unwrap();
        assert_eq!(config.server_url, "https://cloud.example");
        assert_eq!(config.secret, "s3cret");
        assert_eq!(config.room_id, "abc123");
        assert_eq!(config.template, None);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.build, BuildInfo::default());
    }

    #[test]
    fn reports_each_missing_parameter_by_name() {
        let cases = [
            (SERVER_URL_ENV, "NEXTCLOUD_SERVER_URL"),
            (BOT_SECRET_ENV, "BOT_SECRET"),
            (ROOM_ID_ENV, "ROOM_ID"),
        ];
        for (var, label) in cases {
            let err = PluginConfig::from_environment(&without(var)).unwrap_err();
            assert_eq!(err.to_string(), format!("Missing required parameter {label}"));
        }
    }

    #[test]
    fn server_url_is_reported_before_the_others() {
        let err = PluginConfig::from_environment(&Environment::default()).unwrap_err();
        assert!(matches!(err, NotifyError::MissingParameter("NEXTCLOUD_SERVER_URL")));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let mut vars = base_env();
        vars.push((BOT_SECRET_ENV, "   "));
        let env = Environment::from_vars(vars);
        let err = PluginConfig::from_environment(&env).unwrap_err();
        assert!(matches!(err, NotifyError::MissingParameter("BOT_SECRET")));
    }

    #[test]
    fn empty_message_selects_default_report() {
        let mut vars = base_env();
        vars.push((MESSAGE_ENV, ""));
        let config = PluginConfig::from_environment(&Environment::from_vars(vars)).unwrap();
        assert_eq!(config.template, None);
    }

    #[test]
    fn whitespace_message_is_still_a_template() {
        let mut vars = base_env();
        vars.push((MESSAGE_ENV, "  \n"));
        let config = PluginConfig::from_environment(&Environment::from_vars(vars)).unwrap();
        assert_eq!(config.template.as_deref(), Some("  \n"));
    }

    #[test]
    fn secret_is_used_verbatim() {
        let mut vars = base_env();
        vars.push((BOT_SECRET_ENV, " k3y\n"));
        vars.push((ROOM_ID_ENV, "  abc123 "));
        let config = PluginConfig::from_environment(&Environment::from_vars(vars)).unwrap();
        assert_eq!(config.secret, " k3y\n");
        assert_eq!(config.room_id, "abc123");
    }

    #[test]
    fn timeout_is_configurable() {
        let mut vars = base_env();
        vars.push((TIMEOUT_ENV, "5"));
        let config = PluginConfig::from_environment(&Environment::from_vars(vars)).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_invalid_timeout() {
        for raw in ["0", "-1", "soon"] {
            let mut vars = base_env();
            vars.push((TIMEOUT_ENV, raw));
            let err = PluginConfig::from_environment(&Environment::from_vars(vars)).unwrap_err();
            assert_eq!(err.kind(), "invalid_parameter", "{raw}");
        }
    }

    #[test]
    fn build_info_reads_drone_metadata() {
        let env = Environment::from_vars([
            (BUILD_STATUS_ENV, "success"),
            (BRANCH_ENV, "main"),
            (COMMIT_MESSAGE_ENV, "  fix the thing\n"),
            (COMMIT_SHA_ENV, "deadbeef"),
        ]);
        let build = BuildInfo::from_environment(&env);
        assert_eq!(build.status, "success");
        assert_eq!(build.branch, "main");
        assert_eq!(build.commit_message, "fix the thing");
        assert_eq!(build.commit_sha, "deadbeef");
        assert!(build.build_link.is_empty());
    }
}
