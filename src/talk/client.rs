// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Nextcloud Talk bot API client.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use super::signing::BotSignature;
use crate::config::PluginConfig;
use crate::error::NotifyError;

pub const OCS_API_REQUEST_HEADER: &str = "OCS-APIRequest";
pub const RANDOM_HEADER: &str = "X-Nextcloud-Talk-Bot-Random";
pub const SIGNATURE_HEADER: &str = "X-Nextcloud-Talk-Bot-Signature";

/// Everything needed to post one message. All fields are required.
#[derive(Debug, Clone)]
pub struct NotificationRequest {
    pub server_url: String,
    pub room_id: String,
    pub secret: String,
    pub message: String,
}

impl NotificationRequest {
    pub fn new(config: &PluginConfig, message: String) -> Self {
        Self {
            server_url: config.server_url.clone(),
            room_id: config.room_id.clone(),
            secret: config.secret.clone(),
            message,
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    message: &'a str,
}

/// Serialize the request body, `{"message": <text>}`.
pub fn payload_body(message: &str) -> Result<Vec<u8>, NotifyError> {
    Ok(serde_json::to_vec(&MessagePayload { message })?)
}

/// Build `<server>/ocs/v2.php/apps/spreed/api/v1/bot/<room>/message`.
///
/// The room id becomes a single percent-encoded path segment.
pub fn message_endpoint(server_url: &str, room_id: &str) -> Result<Url, NotifyError> {
    let mut url = Url::parse(server_url.trim_end_matches('/'))
        .map_err(|e| NotifyError::RequestConstruction(format!("invalid server URL {server_url:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(NotifyError::RequestConstruction(format!(
            "server URL must use http or https, got {:?}",
            url.scheme()
        )));
    }

    url.path_segments_mut()
        .map_err(|_| {
            NotifyError::RequestConstruction(format!("server URL cannot be a base: {server_url:?}"))
        })?
        .pop_if_empty()
        .extend(["ocs", "v2.php", "apps", "spreed", "api", "v1", "bot"])
        .push(room_id)
        .push("message");

    Ok(url)
}

#[derive(Debug, Clone)]
pub struct TalkClient {
    http: Client,
}

impl TalkClient {
    pub fn new(timeout: Duration) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                NotifyError::RequestConstruction(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self { http })
    }

    /// Sign and post the message once.
    ///
    /// Any HTTP status counts as delivered and is returned to the caller;
    /// only failures to complete the exchange are errors.
    pub async fn send(&self, request: &NotificationRequest) -> Result<StatusCode, NotifyError> {
        let url = message_endpoint(&request.server_url, &request.room_id)?;
        let body = payload_body(&request.message)?;
        let signed = BotSignature::sign(&request.secret, &request.message);

        debug!(
            endpoint = %url,
            random = %signed.random.as_str(),
            body_len = body.len(),
            "Posting message to Talk"
        );

        let response = self
            .http
            .post(url)
            .header(OCS_API_REQUEST_HEADER, "true")
            .header(RANDOM_HEADER, signed.random.as_str())
            .header(SIGNATURE_HEADER, &signed.signature)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!(status = status.as_u16(), "Talk accepted the message");
        } else {
            let detail = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                response = %detail,
                "Talk answered with a non-success status"
            );
        }

        Ok(status)
    }
}
