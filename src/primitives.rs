//! Shared checks used by several validation rules.

use std::sync::LazyLock;

use regex::Regex;

use crate::enums::TimeGranularity;
use crate::error::{ValidationContext, ValidationIssue, WindowParseError};
use crate::naming::{DUNDER, ENGINE_RESERVED_NAMES};

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]([a-z0-9_])*[a-z0-9]$").unwrap());

static GRANULARITY_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").unwrap());

// ─── Time windows ───────────────────────────────────────────────────────────

/// A window string split into count and granularity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedMetricTimeWindow {
    pub count: u64,
    /// Lowercased, with a plural `s` removed.
    pub granularity: String,
}

/// Parse a `<count> <granularity>` window such as `28 days` or `1 martian_week`.
///
/// The granularity may be plural and must name a standard granularity or one
/// of `custom_granularity_names`.
pub fn parse_window(
    window: &str,
    custom_granularity_names: &[String],
) -> Result<ParsedMetricTimeWindow, WindowParseError> {
    let parts: Vec<&str> = window.split_whitespace().collect();
    let [count, granularity] = parts.as_slice() else {
        return Err(WindowParseError {
            message: format!(
                "Invalid window ({}) in cumulative metric. Should be of the form `<count> <granularity>`, e.g., `28 days`",
                window
            ),
        });
    };

    let lowered = granularity.to_lowercase();
    let singular = lowered.strip_suffix('s').unwrap_or(&lowered);
    let granularity = if is_known_granularity_name(&lowered, custom_granularity_names) {
        lowered.clone()
    } else if is_known_granularity_name(singular, custom_granularity_names) {
        singular.to_string()
    } else {
        return Err(WindowParseError {
            message: format!(
                "Invalid time granularity {} in cumulative metric window string: ({})",
                singular, window
            ),
        });
    };

    let count = count.parse::<u64>().map_err(|_| WindowParseError {
        message: format!(
            "Invalid count ({}) in cumulative metric window string: ({})",
            count, window
        ),
    })?;

    Ok(ParsedMetricTimeWindow { count, granularity })
}

// ─── Names ──────────────────────────────────────────────────────────────────

/// True for a standard granularity name or one of `custom_granularity_names`,
/// compared case-insensitively.
pub fn is_known_granularity_name(name: &str, custom_granularity_names: &[String]) -> bool {
    let lowered = name.to_lowercase();
    TimeGranularity::from_name(&lowered).is_some()
        || custom_granularity_names
            .iter()
            .any(|c| c.eq_ignore_ascii_case(&lowered))
}

/// True when `name` could be declared as a custom granularity.
pub fn is_valid_granularity_name(name: &str) -> bool {
    GRANULARITY_NAME_RE.is_match(name)
}

/// Name checks shared by every named manifest element.
///
/// Names must be lower-case snake case of at least two characters, without
/// dunders, and may not collide with granularity keywords or engine-reserved
/// names.
pub fn check_valid_name(name: &str, context: Option<&ValidationContext>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !NAME_RE.is_match(name) || name.contains(DUNDER) {
        issues.push(ValidationIssue::error(
            context.cloned(),
            format!(
                "Invalid name `{}` - names may only contain lower case letters, numbers, and underscores. Additionally, names must start with a lower case letter, cannot end with an underscore, cannot contain dunders (double underscores, or __), and must be at least 2 characters long.",
                name
            ),
        ));
    }

    if TimeGranularity::from_name(&name.to_lowercase()).is_some() {
        issues.push(ValidationIssue::error(
            context.cloned(),
            format!(
                "Invalid name `{}` - names cannot match reserved time granularity keywords ({})",
                name,
                TimeGranularity::names().join(", ")
            ),
        ));
    }

    if ENGINE_RESERVED_NAMES.contains(&name.to_lowercase().as_str()) {
        issues.push(ValidationIssue::error(
            context.cloned(),
            format!("Invalid name `{}` - this name is reserved by the query engine", name),
        ));
    }

    issues
}
