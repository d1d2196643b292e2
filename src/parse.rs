use serde_json::error::Category;

use crate::error::{ParseError, ParseErrorKind};
use crate::types::SemanticManifest;

const TOP_LEVEL_FIELDS: &[&str] = &[
    "semantic_models",
    "metrics",
    "saved_queries",
    "project_configuration",
    "interfaces_version",
];

/// Parse a YAML (or JSON) string into an unvalidated [`SemanticManifest`].
///
/// Performs deserialization and type mapping only. Does NOT validate the
/// manifest or apply transforms.
pub fn parse(input: &str) -> Result<SemanticManifest, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::new(ParseErrorKind::Syntax, "empty input"));
    }

    check_multi_document(input)?;

    // YAML goes through a serde_json::Value so both inputs share one error path
    let value: serde_json::Value = serde_saphyr::from_str(input).map_err(|e| {
        let message = e.to_string();
        ParseError::new(yaml_error_kind(&message), message)
    })?;

    let Some(root) = value.as_object() else {
        return Err(ParseError::new(
            ParseErrorKind::TypeMismatch,
            "manifest root must be a YAML mapping",
        ));
    };

    if let Some(unknown) = root.keys().find(|k| !TOP_LEVEL_FIELDS.contains(&k.as_str())) {
        return Err(ParseError::new(
            ParseErrorKind::TypeMismatch,
            format!(
                "unknown top-level field: {} (expected one of {})",
                unknown,
                TOP_LEVEL_FIELDS.join(", ")
            ),
        ));
    }

    serde_json::from_value(value).map_err(|e| manifest_shape_error(&e))
}

/// Only matches `---` at column 0 to avoid false positives inside block scalars.
fn check_multi_document(input: &str) -> Result<(), ParseError> {
    let mut separators = input
        .lines()
        .enumerate()
        .filter(|(_, line)| line.strip_prefix("---").is_some_and(|rest| rest.trim().is_empty()));

    match (separators.next(), separators.next()) {
        (Some(_), Some((line_index, _))) => Err(ParseError::new(
            ParseErrorKind::Syntax,
            "a manifest is a single YAML document; found a second `---` separator",
        )
        .at(line_index + 1, 1)),
        _ => Ok(()),
    }
}

/// Messages from serde's own data errors, shared by both deserializers.
fn data_error_kind(message: &str) -> Option<ParseErrorKind> {
    if message.contains("unknown variant") || message.contains("unknown field") {
        Some(ParseErrorKind::UnknownVariant)
    } else if ["invalid type", "invalid value", "invalid length", "missing field"]
        .iter()
        .any(|marker| message.contains(marker))
    {
        Some(ParseErrorKind::TypeMismatch)
    } else {
        None
    }
}

fn yaml_error_kind(message: &str) -> ParseErrorKind {
    data_error_kind(&message.to_lowercase()).unwrap_or(ParseErrorKind::Syntax)
}

/// Failure mapping the YAML value onto the manifest types. Data errors are
/// split by their serde message; anything else is reported as syntax.
fn manifest_shape_error(error: &serde_json::Error) -> ParseError {
    let message = error.to_string();
    let kind = match error.classify() {
        Category::Data => data_error_kind(&message).unwrap_or(ParseErrorKind::TypeMismatch),
        Category::Syntax | Category::Eof | Category::Io => ParseErrorKind::Syntax,
    };
    ParseError::new(kind, message)
}
