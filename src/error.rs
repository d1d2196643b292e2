use crate::enums::{SavedQueryElementType, SemanticModelElementType};
use crate::references::{MetricReference, SavedQueryReference, SemanticModelReference};
use crate::types::{Metadata, Metric, SavedQuery, SemanticModel};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ─── Where-filter parsing ───────────────────────────────────────────────────

/// What went wrong while parsing a where-filter or group-by template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhereFilterParseErrorKind {
    /// Unbalanced markers, bad tokens, malformed call expressions.
    Syntax,
    /// A name other than the four bound call names.
    UnboundIdentifier,
    /// A dundered name with the wrong number of entity links.
    IncorrectFormat,
    InvalidGranularity,
    InvalidDatePart,
    /// `metric_time` referenced in a way it cannot be.
    ReservedName,
    /// Missing, duplicated or mistyped call arguments.
    InvalidArgument,
}

/// Produced when a where-filter or group-by template cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("Error parsing where filter template `{template}`: {cause}")]
pub struct WhereFilterParseError {
    pub kind: WhereFilterParseErrorKind,
    pub template: String,
    pub cause: String,
}

/// A metric time window string such as `28 days` that doesn't parse.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct WindowParseError {
    pub message: String,
}

// ─── Hydration ──────────────────────────────────────────────────────────────

/// Error kind for parse failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    Syntax,
    TypeMismatch,
    UnknownVariant,
}

/// Produced by `parse` when YAML deserialization fails.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{}{message}", location_prefix(.line, .column))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Attach a 1-based position.
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

fn location_prefix(line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(line), Some(column)) => format!("{}:{}: ", line, column),
        _ => String::new(),
    }
}

/// Produced by `transform` when a manifest is configured in a way that can't
/// be defaulted.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ModelTransformError {
    pub message: String,
}

/// Produced by `serialize` when a manifest can't be rendered as JSON.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SerializeError {
    pub message: String,
}

// ─── Validator configuration ────────────────────────────────────────────────

/// Raised while building a validator, never while running one.
#[derive(Debug, Error)]
pub enum ValidatorConfigError {
    #[error("no validation rules supplied; a validator needs at least one rule")]
    EmptyRuleSet,
    #[error("could not build validation worker pool: {0}")]
    WorkerPool(String),
}

// ─── Validation issues ──────────────────────────────────────────────────────

/// Issue severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationIssueLevel {
    /// Blocking.
    Error,
    /// Advisory.
    Warning,
    /// Advisory today, blocking in a later schema version.
    FutureError,
}

impl ValidationIssueLevel {
    pub fn is_blocking(&self) -> bool {
        matches!(self, ValidationIssueLevel::Error)
    }
}

impl fmt::Display for ValidationIssueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValidationIssueLevel::Error => "ERROR",
            ValidationIssueLevel::Warning => "WARNING",
            ValidationIssueLevel::FutureError => "FUTURE_ERROR",
        })
    }
}

/// Where in the YAML sources an object was defined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
}

impl FileContext {
    pub fn from_metadata(metadata: Option<&Metadata>) -> Option<FileContext> {
        metadata.map(|m| FileContext {
            file_name: Some(m.file_slice.filename.clone()),
            line_number: Some(m.file_slice.start_line_number),
        })
    }
}

impl fmt::Display for FileContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file_name, self.line_number) {
            (Some(file), Some(line)) => write!(f, "in file `{}` on line #{}", file, line),
            (Some(file), None) => write!(f, "in file `{}`", file),
            (None, Some(line)) => write!(f, "on line #{}", line),
            (None, None) => Ok(()),
        }
    }
}

/// The manifest object an issue is about.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "object_type", rename_all = "snake_case")]
pub enum ContextObject {
    SemanticModel {
        semantic_model: SemanticModelReference,
    },
    SemanticModelElement {
        semantic_model: SemanticModelReference,
        element_name: String,
        element_type: SemanticModelElementType,
    },
    Metric {
        metric: MetricReference,
    },
    SavedQuery {
        saved_query: SavedQueryReference,
        #[serde(skip_serializing_if = "Option::is_none")]
        element_type: Option<SavedQueryElementType>,
        #[serde(skip_serializing_if = "Option::is_none")]
        element_value: Option<String>,
    },
}

impl fmt::Display for ContextObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextObject::SemanticModel { semantic_model } => {
                write!(f, "with semantic model `{}`", semantic_model)
            }
            ContextObject::SemanticModelElement {
                semantic_model,
                element_name,
                element_type,
            } => write!(
                f,
                "with {} `{}` in semantic model `{}`",
                element_type, element_name, semantic_model
            ),
            ContextObject::Metric { metric } => write!(f, "with metric `{}`", metric),
            ContextObject::SavedQuery {
                saved_query,
                element_type,
                element_value,
            } => {
                write!(f, "with saved query `{}`", saved_query)?;
                if let (Some(t), Some(v)) = (element_type, element_value) {
                    write!(f, " ({} `{}`)", t, v)?;
                }
                Ok(())
            }
        }
    }
}

/// Locates an issue: typed object plus source position when known.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationContext {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_context: Option<FileContext>,
    pub object: ContextObject,
}

impl ValidationContext {
    pub fn semantic_model(model: &SemanticModel) -> Self {
        Self {
            file_context: FileContext::from_metadata(model.metadata.as_ref()),
            object: ContextObject::SemanticModel {
                semantic_model: model.reference(),
            },
        }
    }

    pub fn semantic_model_element(
        model: &SemanticModel,
        element_name: &str,
        element_type: SemanticModelElementType,
    ) -> Self {
        Self {
            file_context: FileContext::from_metadata(model.metadata.as_ref()),
            object: ContextObject::SemanticModelElement {
                semantic_model: model.reference(),
                element_name: element_name.to_string(),
                element_type,
            },
        }
    }

    pub fn metric(metric: &Metric) -> Self {
        Self {
            file_context: FileContext::from_metadata(metric.metadata.as_ref()),
            object: ContextObject::Metric {
                metric: metric.reference(),
            },
        }
    }

    pub fn saved_query(saved_query: &SavedQuery) -> Self {
        Self {
            file_context: FileContext::from_metadata(saved_query.metadata.as_ref()),
            object: ContextObject::SavedQuery {
                saved_query: saved_query.reference(),
                element_type: None,
                element_value: None,
            },
        }
    }

    pub fn saved_query_element(
        saved_query: &SavedQuery,
        element_type: SavedQueryElementType,
        element_value: impl Into<String>,
    ) -> Self {
        Self {
            file_context: FileContext::from_metadata(saved_query.metadata.as_ref()),
            object: ContextObject::SavedQuery {
                saved_query: saved_query.reference(),
                element_type: Some(element_type),
                element_value: Some(element_value.into()),
            },
        }
    }
}

impl fmt::Display for ValidationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.object)?;
        if let Some(file) = &self.file_context {
            write!(f, " {}", file)?;
        }
        Ok(())
    }
}

/// A single finding from a validation rule.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub level: ValidationIssueLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ValidationContext>,
    /// Longer diagnostic text, e.g. a parser cause or a panic payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_detail: Option<String>,
}

impl ValidationIssue {
    fn new(
        level: ValidationIssueLevel,
        context: Option<ValidationContext>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level,
            message: message.into(),
            context,
            extra_detail: None,
        }
    }

    pub fn error(context: impl Into<Option<ValidationContext>>, message: impl Into<String>) -> Self {
        Self::new(ValidationIssueLevel::Error, context.into(), message)
    }

    pub fn warning(
        context: impl Into<Option<ValidationContext>>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ValidationIssueLevel::Warning, context.into(), message)
    }

    pub fn future_error(
        context: impl Into<Option<ValidationContext>>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ValidationIssueLevel::FutureError, context.into(), message)
    }

    pub fn with_context(mut self, context: ValidationContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn with_extra_detail(mut self, detail: impl Into<String>) -> Self {
        self.extra_detail = Some(detail.into());
        self
    }

    pub fn is_blocking(&self) -> bool {
        self.level.is_blocking()
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(f, "{}: {} - {}", self.level, ctx, self.message),
            None => write!(f, "{}: {}", self.level, self.message),
        }
    }
}

/// Error issue for a failure that interrupted a check.
pub fn generate_exception_issue(
    what_was_being_done: &str,
    cause: &dyn fmt::Display,
    context: Option<ValidationContext>,
) -> ValidationIssue {
    ValidationIssue::error(
        context,
        format!("An error occurred while {} - {}", what_was_being_done, cause),
    )
}

// ─── Results ────────────────────────────────────────────────────────────────

/// All issues from a validation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticManifestValidationResults {
    pub issues: Vec<ValidationIssue>,
}

impl SemanticManifestValidationResults {
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    fn at_level(&self, level: ValidationIssueLevel) -> Vec<&ValidationIssue> {
        self.issues.iter().filter(|i| i.level == level).collect()
    }

    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.at_level(ValidationIssueLevel::Error)
    }

    pub fn warnings(&self) -> Vec<&ValidationIssue> {
        self.at_level(ValidationIssueLevel::Warning)
    }

    pub fn future_errors(&self) -> Vec<&ValidationIssue> {
        self.at_level(ValidationIssueLevel::FutureError)
    }

    pub fn all_issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn has_blocking_issues(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_blocking)
    }

    /// Concatenate several result sets.
    pub fn merge(results: impl IntoIterator<Item = SemanticManifestValidationResults>) -> Self {
        Self {
            issues: results.into_iter().flat_map(|r| r.issues).collect(),
        }
    }

    /// Human-readable listing, one issue per line.
    pub fn summary(&self) -> String {
        self.issues
            .iter()
            .map(|i| format!("  • {}", i))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Produced by `checked_validate` when any blocking issue was found.
#[derive(Clone, Debug, Error)]
#[error("{}", describe_blocking(.results))]
pub struct SemanticManifestValidationError {
    pub results: SemanticManifestValidationResults,
}

impl SemanticManifestValidationError {
    pub fn errors(&self) -> Vec<&ValidationIssue> {
        self.results.errors()
    }
}

fn describe_blocking(results: &SemanticManifestValidationResults) -> String {
    let errors = results.errors();
    let mut out = format!(
        "semantic manifest validation found {} blocking issue(s):",
        errors.len()
    );
    for issue in errors {
        out.push_str(&format!("\n  • {}", issue));
    }
    out
}

/// Combined error type for the `load` entry point.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Transform error: {0}")]
    Transform(#[from] ModelTransformError),
    #[error("Validation error: {0}")]
    Validation(ValidationIssue),
}
