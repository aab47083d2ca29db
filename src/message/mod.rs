// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Message composition.
//!
//! A configured template is rendered against the typed environment context;
//! without one, the default build report is synthesized from the Drone
//! metadata. Composition never touches the network or the disk.

pub mod context;
pub mod helpers;
pub mod report;
pub mod template;

use tracing::debug;

pub use context::{ContextValue, TemplateContext};
pub use report::build_report;
pub use template::{HandlebarsRenderer, TemplateRenderer};

use crate::config::BuildInfo;
use crate::error::NotifyError;

/// Produce the final message text.
///
/// A missing or empty `template` selects the default report. Any other
/// template is rendered, so a whitespace-only one yields an empty message.
pub fn compose<R: TemplateRenderer + ?Sized>(
    renderer: &R,
    template: Option<&str>,
    context: &TemplateContext,
    build: &BuildInfo,
) -> Result<String, NotifyError> {
    match template.filter(|t| !t.is_empty()) {
        Some(template) => {
            debug!(variables = context.len(), "Rendering message template");
            renderer.render(template, context)
        }
        None => {
            debug!("No template configured, using build report");
            Ok(build_report(build))
        }
    }
}
