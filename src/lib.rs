// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Drone Talk Notify - Drone CI plugin for Nextcloud Talk
//!
//! This crate posts a build notification to a Nextcloud Talk room through the
//! bot API. The message is either rendered from a user template or
//! synthesized from the Drone build metadata, then signed with the bot's
//! shared secret and delivered in a single HTTP request.
//!
//! ## Modules
//!
//! - `config` - Environment snapshot and plugin settings
//! - `error` - Failure taxonomy
//! - `logging` - Tracing subscriber setup
//! - `message` - Template rendering and the default build report
//! - `talk` - Request signing and delivery

pub mod config;
pub mod error;
pub mod logging;
pub mod message;
pub mod talk;

use reqwest::StatusCode;
use tracing::debug;

use config::{Environment, PluginConfig};
use error::NotifyError;
use message::{HandlebarsRenderer, TemplateContext};
use talk::{NotificationRequest, TalkClient};

/// Run one notification: validate settings, compose, sign and send.
///
/// Returns the HTTP status answered by the Talk server. Validation happens
/// before any network activity.
pub async fn notify(env: &Environment) -> Result<StatusCode, NotifyError> {
    let config = PluginConfig::from_environment(env)?;

    let context = match config.template {
        Some(_) => TemplateContext::from_environment(env),
        None => TemplateContext::default(),
    };
    let message = message::compose(
        &HandlebarsRenderer::new(),
        config.template.as_deref(),
        &context,
        &config.build,
    )?;
    debug!(chars = message.chars().count(), "Composed message");

    let client = TalkClient::new(config.timeout)?;
    client
        .send(&NotificationRequest::new(&config, message))
        .await
}
