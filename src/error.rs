// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Failure taxonomy for a single notification run.
//!
//! Every variant is terminal: the binary prints the error and exits with
//! [`NotifyError::exit_code`]. Nothing is retried or recovered locally.

/// Error raised while building, signing or delivering a notification.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// A required plugin setting is unset or blank.
    #[error("Missing required parameter {0}")]
    MissingParameter(&'static str),

    /// A plugin setting is present but cannot be used.
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// The user-supplied message template failed to render.
    #[error("Error rendering template: {0}")]
    TemplateRender(String),

    /// The JSON payload could not be encoded.
    #[error("Error marshalling JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The endpoint URL or the HTTP request could not be assembled.
    #[error("Error creating request: {0}")]
    RequestConstruction(String),

    /// The HTTP exchange did not complete (DNS, connect, timeout, ...).
    #[error("Error sending request: {0}")]
    Transport(String),
}

impl NotifyError {
    /// Process exit status reported for this error.
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Short machine-readable identifier, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            NotifyError::MissingParameter(_) => "missing_parameter",
            NotifyError::InvalidParameter { .. } => "invalid_parameter",
            NotifyError::TemplateRender(_) => "template_render",
            NotifyError::Serialization(_) => "serialization",
            NotifyError::RequestConstruction(_) => "request_construction",
            NotifyError::Transport(_) => "transport",
        }
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            NotifyError::RequestConstruction(err.to_string())
        } else {
            NotifyError::Transport(err.to_string())
        }
    }
}
