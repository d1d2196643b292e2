//! Typed semantic manifest model, where-filter parser and validation rule
//! engine for a metrics semantic layer.
//!
//! A semantic manifest describes semantic models (tables with entities,
//! dimensions and measures), the metrics computed from them and saved
//! queries over those metrics. This crate provides a complete pipeline for
//! working with manifests:
//!
//! ```text
//! parse(yaml) → SemanticManifest → transform(manifest) → SemanticManifest
//!             → validate(&manifest) → SemanticManifestValidationResults
//!             → serialize(&manifest) → json
//! ```
//!
//! Filter templates such as `{{ Dimension('booking__is_instant') }}` are
//! parsed by [`where_filter`] into [`call_parameter_sets`].
//!
//! # Quick Start
//!
//! ```rust
//! let yaml = r#"
//! semantic_models:
//!   - name: bookings
//!     node_relation:
//!       alias: bookings
//!       schema_name: main
//!     defaults:
//!       agg_time_dimension: ds
//!     entities:
//!       - name: booking
//!         type: primary
//!     dimensions:
//!       - name: ds
//!         type: time
//!         type_params:
//!           time_granularity: day
//!       - name: is_instant
//!         type: categorical
//!     measures:
//!       - name: booking_count
//!         agg: sum
//!         expr: "1"
//! metrics:
//!   - name: total_bookings
//!     type: simple
//!     type_params:
//!       measure: booking_count
//!     filter: "{{ Dimension('booking__is_instant') }}"
//! "#;
//!
//! let result = semantic_manifest::load(yaml).expect("valid manifest");
//! println!("Loaded {} metrics", result.manifest.metrics.len());
//! ```
//!
//! # Feature Flags
//!
//! | Feature    | Default | Description |
//! |------------|---------|-------------|
//! | `parallel` | yes     | Run validation rules on a `rayon` thread pool via [`validate::SemanticManifestValidator::with_max_workers`]. |

pub mod call_parameter_sets;
pub mod enums;
pub mod error;
pub mod naming;
pub mod parse;
pub mod primitives;
pub mod references;
pub mod rules;
pub mod serialize;
pub mod transform;
pub mod types;
pub mod validate;
pub mod where_filter;

pub use error::*;
pub use types::*;

// Re-export entry-point functions at the crate root for convenience.
pub use parse::parse;
pub use serialize::serialize;
pub use transform::transform;
pub use validate::{SemanticManifestValidator, validate};

/// Result of the [`load`] convenience entry point.
#[derive(Debug)]
pub struct LoadResult {
    /// The transformed, validated manifest.
    pub manifest: SemanticManifest,
    /// Non-blocking issues (warnings) produced during validation.
    pub issues: Vec<ValidationIssue>,
}

/// Convenience entry point composing parse → transform → checked validate.
///
/// # Errors
///
/// Returns every blocking problem: the parse or transform error, or each
/// validation error.
///
/// # Example
///
/// ```rust
/// match semantic_manifest::load("metrics: []") {
///     Ok(result) => println!("Loaded with {} warnings", result.issues.len()),
///     Err(errors) => eprintln!("{} errors", errors.len()),
/// }
/// ```
pub fn load(input: &str) -> Result<LoadResult, Vec<ManifestError>> {
    let manifest = parse::parse(input).map_err(|e| vec![ManifestError::Parse(e)])?;
    let manifest = transform::transform(manifest).map_err(|e| vec![ManifestError::Transform(e)])?;

    match SemanticManifestValidator::with_default_rules().checked_validate(&manifest) {
        Ok(results) => Ok(LoadResult {
            manifest,
            issues: results.issues,
        }),
        Err(failure) => Err(failure
            .results
            .issues
            .into_iter()
            .filter(ValidationIssue::is_blocking)
            .map(ManifestError::Validation)
            .collect()),
    }
}
