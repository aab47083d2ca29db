// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Typed template context built from the environment.
//!
//! Each variable is coerced once, when the context is built: a finite float
//! wins first, then a boolean, otherwise the raw string is kept.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use crate::config::Environment;

/// Largest magnitude for which every integral `f64` is exactly an `i64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A coerced environment value.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Number(f64),
    Bool(bool),
    String(String),
}

impl ContextValue {
    /// Coerce a raw environment value.
    pub fn coerce(raw: &str) -> Self {
        if let Ok(n) = raw.parse::<f64>() {
            if n.is_finite() {
                return ContextValue::Number(n);
            }
        }
        if let Some(b) = parse_bool(raw) {
            return ContextValue::Bool(b);
        }
        ContextValue::String(raw.to_string())
    }
}

impl Serialize for ContextValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Integral numbers render as `3`, not `3.0`.
            ContextValue::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER => {
                serializer.serialize_i64(*n as i64)
            }
            ContextValue::Number(n) => serializer.serialize_f64(*n),
            ContextValue::Bool(b) => serializer.serialize_bool(*b),
            ContextValue::String(s) => serializer.serialize_str(s),
        }
    }
}

/// Accepts the same spellings as Go's `strconv.ParseBool`, which Drone
/// users' templates were written against.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Variables available to a user template, keyed by environment name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TemplateContext {
    values: BTreeMap<String, ContextValue>,
}

impl TemplateContext {
    pub fn from_environment(env: &Environment) -> Self {
        env.iter()
            .map(|(name, raw)| (name.to_string(), ContextValue::coerce(raw)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, ContextValue)> for TemplateContext {
    fn from_iter<I: IntoIterator<Item = (String, ContextValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
