// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Template helpers Drone users expect in notification templates.
//!
//! | Helper | Usage |
//! |--------|-------|
//! | `uppercase`, `lowercase`, `uppercasefirst`, `trim` | `{{uppercase DRONE_REPO_NAME}}` |
//! | `truncate` | `{{truncate DRONE_COMMIT_SHA 8}}`, negative keeps the tail |
//! | `urlencode` | `{{urlencode DRONE_BRANCH}}` |
//! | `success`, `failure` | `{{#success DRONE_BUILD_STATUS}}..{{else}}..{{/success}}` or as a subexpression |
//! | `duration` | `{{duration DRONE_BUILD_STARTED DRONE_BUILD_FINISHED}}` → `1m30s` |
//! | `since` | `{{since DRONE_BUILD_STARTED}}` |
//! | `datetime` | `{{datetime DRONE_BUILD_FINISHED "2006-01-02 15:04" "Europe/Berlin"}}` |
//! | `regexReplace` | `{{regexReplace "^refs/heads/" DRONE_COMMIT_REF ""}}` |

use std::fmt::{Display, Write as _};

use chrono::{DateTime, Local, TimeZone, Utc};
use chrono_tz::Tz;
use handlebars::{
    handlebars_helper, Context, Handlebars, Helper, HelperDef, HelperResult, JsonValue, Output,
    RenderContext, RenderError, RenderErrorReason, Renderable, ScopedJson,
};
use regex::Regex;
use tracing::warn;

handlebars_helper!(uppercase: |s: str| s.to_uppercase());
handlebars_helper!(lowercase: |s: str| s.to_lowercase());
handlebars_helper!(uppercasefirst: |s: str| {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    }
});
handlebars_helper!(trim: |s: str| s.trim().to_string());
handlebars_helper!(truncate: |s: str, len: i64| truncate_chars(s, len));
handlebars_helper!(urlencode: |s: str| {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect::<String>()
});

/// Register every helper on `registry`.
pub fn register(registry: &mut Handlebars<'_>) {
    registry.register_helper("uppercase", Box::new(uppercase));
    registry.register_helper("lowercase", Box::new(lowercase));
    registry.register_helper("uppercasefirst", Box::new(uppercasefirst));
    registry.register_helper("trim", Box::new(trim));
    registry.register_helper("truncate", Box::new(truncate));
    registry.register_helper("urlencode", Box::new(urlencode));
    registry.register_helper("success", Box::new(StatusBlock::SUCCESS));
    registry.register_helper("failure", Box::new(StatusBlock::FAILURE));
    registry.register_helper("duration", Box::new(duration));
    registry.register_helper("since", Box::new(since));
    registry.register_helper("datetime", Box::new(datetime));
    registry.register_helper("regexReplace", Box::new(regex_replace));
}

/// Keep the first `len` characters, or the last `-len` when negative.
fn truncate_chars(s: &str, len: i64) -> String {
    let count = s.chars().count();
    let keep = len.unsigned_abs() as usize;
    if count <= keep {
        return s.to_string();
    }
    if len < 0 {
        s.chars().skip(count - keep).collect()
    } else {
        s.chars().take(keep).collect()
    }
}

/// Conditional on a Drone build status.
///
/// As a block it renders its body when the status matches and the
/// `{{else}}` branch otherwise; inline or as a subexpression it yields a
/// boolean.
#[derive(Clone, Copy)]
pub struct StatusBlock {
    name: &'static str,
    matches: fn(&str) -> bool,
}

impl StatusBlock {
    pub const SUCCESS: StatusBlock = StatusBlock {
        name: "success",
        matches: is_success,
    };

    pub const FAILURE: StatusBlock = StatusBlock {
        name: "failure",
        matches: is_failure,
    };

    fn evaluate(&self, h: &Helper<'_>) -> Result<bool, RenderError> {
        let status = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex(self.name, 0))?;
        Ok(status.value().as_str().is_some_and(self.matches))
    }
}

fn is_success(status: &str) -> bool {
    status == "success"
}

fn is_failure(status: &str) -> bool {
    matches!(status, "failure" | "error" | "killed")
}

impl HelperDef for StatusBlock {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        Ok(ScopedJson::Derived(JsonValue::Bool(self.evaluate(h)?)))
    }

    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let matched = self.evaluate(h)?;
        if !h.is_block() {
            out.write(if matched { "true" } else { "false" })?;
            return Ok(());
        }
        let branch = if matched { h.template() } else { h.inverse() };
        match branch {
            Some(t) => t.render(r, ctx, rc, out),
            None => Ok(()),
        }
    }
}

fn duration(
    h: &Helper<'_>,
    _: &Handlebars<'_>,
    _: &Context,
    _: &mut RenderContext<'_, '_>,
    out: &mut dyn Output,
) -> HelperResult {
    let started = number_param(h, 0, "duration")?;
    let finished = number_param(h, 1, "duration")?;
    out.write(&format_seconds(finished as i64 - started as i64))?;
    Ok(())
}

fn since(
    h: &Helper<'_>,
    _: &Handlebars<'_>,
    _: &Context,
    _: &mut RenderContext<'_, '_>,
    out: &mut dyn Output,
) -> HelperResult {
    let started = number_param(h, 0, "since")?;
    out.write(&format_seconds(Utc::now().timestamp() - started as i64))?;
    Ok(())
}

fn datetime(
    h: &Helper<'_>,
    _: &Handlebars<'_>,
    _: &Context,
    _: &mut RenderContext<'_, '_>,
    out: &mut dyn Output,
) -> HelperResult {
    let timestamp = number_param(h, 0, "datetime")? as i64;
    let layout = text_param(h, 1, "datetime")?;
    let zone = h.param(2).map(|p| json_text(p.value())).unwrap_or_default();

    let instant = DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or_else(|| {
        RenderErrorReason::Other(format!("datetime: timestamp {timestamp} is out of range"))
    })?;
    let pattern = strftime_pattern(&layout);

    let rendered = match zone.trim() {
        "" | "Local" => format_in(instant.with_timezone(&Local), &pattern)?,
        "UTC" => format_in(instant, &pattern)?,
        name => match name.parse::<Tz>() {
            Ok(tz) => format_in(instant.with_timezone(&tz), &pattern)?,
            Err(_) => {
                warn!(zone = %name, "Unknown time zone in datetime helper, using local time");
                format_in(instant.with_timezone(&Local), &pattern)?
            }
        },
    };
    out.write(&rendered)?;
    Ok(())
}

fn regex_replace(
    h: &Helper<'_>,
    _: &Handlebars<'_>,
    _: &Context,
    _: &mut RenderContext<'_, '_>,
    out: &mut dyn Output,
) -> HelperResult {
    let pattern = text_param(h, 0, "regexReplace")?;
    let input = text_param(h, 1, "regexReplace")?;
    let replacement = text_param(h, 2, "regexReplace")?;

    let re = Regex::new(&pattern)
        .map_err(|e| RenderErrorReason::Other(format!("regexReplace: invalid pattern: {e}")))?;
    out.write(&re.replace_all(&input, replacement.as_str()))?;
    Ok(())
}

fn number_param(h: &Helper<'_>, index: usize, helper: &'static str) -> Result<f64, RenderError> {
    let value = h
        .param(index)
        .ok_or(RenderErrorReason::ParamNotFoundForIndex(helper, index))?
        .value();
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| {
            RenderErrorReason::Other(format!("{helper}: parameter {index} is not a number")).into()
        })
}

fn text_param(h: &Helper<'_>, index: usize, helper: &'static str) -> Result<String, RenderError> {
    h.param(index)
        .map(|p| json_text(p.value()))
        .ok_or_else(|| RenderErrorReason::ParamNotFoundForIndex(helper, index).into())
}

/// Render a context value the way it would print in the template.
fn json_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Format whole seconds the way Go prints a `time.Duration` (`1h2m5s`).
fn format_seconds(total: i64) -> String {
    if total == 0 {
        return "0s".to_string();
    }
    let sign = if total < 0 { "-" } else { "" };
    let secs = total.unsigned_abs();
    let (hours, minutes, seconds) = (secs / 3600, secs % 3600 / 60, secs % 60);
    if hours > 0 {
        format!("{sign}{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m{seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}

fn format_in<Z: TimeZone>(instant: DateTime<Z>, pattern: &str) -> Result<String, RenderError>
where
    Z::Offset: Display,
{
    let mut rendered = String::new();
    write!(rendered, "{}", instant.format(pattern)).map_err(|_| {
        RenderErrorReason::Other(format!("datetime: invalid layout {pattern:?}"))
    })?;
    Ok(rendered)
}

/// Go reference-time tokens, longest first so `2006` wins over `2`.
const GO_LAYOUT_TOKENS: &[(&str, &str)] = &[
    ("January", "%B"),
    ("Monday", "%A"),
    ("-07:00", "%:z"),
    ("-0700", "%z"),
    ("2006", "%Y"),
    (".000", "%.3f"),
    ("Jan", "%b"),
    ("Mon", "%a"),
    ("MST", "%Z"),
    ("01", "%m"),
    ("02", "%d"),
    ("_2", "%e"),
    ("15", "%H"),
    ("03", "%I"),
    ("04", "%M"),
    ("05", "%S"),
    ("06", "%y"),
    ("PM", "%p"),
    ("pm", "%P"),
    ("1", "%-m"),
    ("2", "%-d"),
    ("3", "%-I"),
    ("4", "%-M"),
    ("5", "%-S"),
];

/// Accept either a strftime pattern (contains `%`) or a Go reference layout
/// such as `2006-01-02 15:04`, which existing Drone templates use.
fn strftime_pattern(layout: &str) -> String {
    if layout.contains('%') {
        return layout.to_string();
    }
    let mut pattern = String::with_capacity(layout.len() * 2);
    let mut rest = layout;
    'scan: while !rest.is_empty() {
        for (token, spec) in GO_LAYOUT_TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                pattern.push_str(spec);
                rest = tail;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            pattern.push(c);
        }
        rest = chars.as_str();
    }
    pattern
}
