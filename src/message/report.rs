// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Default build report, used when no template is configured.

use crate::config::BuildInfo;

pub const SUCCESS_INDICATOR: &str = "✅ **Success**";
pub const FAILURE_INDICATOR: &str = "❌ **Failed**";

const LOG_LINK_TEXT: &str = "View full log here";

/// Map a Drone build status to its indicator. Only the exact string
/// `success` counts as a success.
pub fn status_indicator(status: &str) -> &'static str {
    if status == "success" {
        SUCCESS_INDICATOR
    } else {
        FAILURE_INDICATOR
    }
}

/// Render the six-line status report.
pub fn build_report(build: &BuildInfo) -> String {
    [
        format!("Status: {}", status_indicator(&build.status)),
        format!("Branch: {}", markdown_link(&build.branch, &build.repo_link)),
        format!("Commit: {}", build.commit_message.trim()),
        format!("Author: {}", build.commit_author),
        format!("Hash: {}", markdown_link(&build.commit_sha, &build.commit_link)),
        markdown_link(LOG_LINK_TEXT, &build.build_link),
    ]
    .join("\n")
}

fn markdown_link(text: &str, href: &str) -> String {
    if href.is_empty() {
        text.to_string()
    } else {
        format!("[{text}]({href})")
    }
}
