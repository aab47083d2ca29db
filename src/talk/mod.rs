// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed delivery to the Nextcloud Talk bot API.
//!
//! ## Modules
//!
//! - `signing` - Nonce generation and HMAC-SHA256 request signatures
//! - `client` - Endpoint construction and the single POST per run

pub mod client;
pub mod signing;

pub use client::{message_endpoint, payload_body, NotificationRequest, TalkClient};
pub use signing::{sign_message, verify_signature, BotSignature, Nonce};
