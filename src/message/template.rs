// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Rendering of user-supplied message templates.
//!
//! Templates use Handlebars syntax (`{{DRONE_BRANCH}}`). Rendering is strict:
//! a reference to a variable that is not in the context is an error, not an
//! empty substitution.

use handlebars::{no_escape, Handlebars};

use super::context::TemplateContext;
use super::helpers;
use crate::error::NotifyError;

/// Narrow seam over the templating engine.
pub trait TemplateRenderer {
    /// Render `template` against `context`, trimming surrounding whitespace.
    fn render(&self, template: &str, context: &TemplateContext) -> Result<String, NotifyError>;
}

/// Handlebars-backed renderer with the Drone helper set registered.
pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        // Output is chat markdown; HTML entities would show up literally.
        registry.register_escape_fn(no_escape);

        helpers::register(&mut registry);

        Self { registry }
    }
}

impl Default for HandlebarsRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer for HandlebarsRenderer {
    fn render(&self, template: &str, context: &TemplateContext) -> Result<String, NotifyError> {
        self.registry
            .render_template(template, context)
            .map(|rendered| rendered.trim().to_string())
            .map_err(|e| NotifyError::TemplateRender(e.to_string()))
    }
}
