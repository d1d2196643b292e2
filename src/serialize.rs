//! [`SemanticManifest`] → JSON serialization.

use crate::error::SerializeError;
use crate::types::SemanticManifest;

/// Serialize a manifest to pretty-printed JSON in the
/// `semantic_manifest.json` shape.
///
/// Fields are emitted in declaration order; absent optional fields are
/// omitted.
pub fn serialize(manifest: &SemanticManifest) -> Result<String, SerializeError> {
    serde_json::to_string_pretty(manifest).map_err(|e| SerializeError {
        message: format!("failed to serialize manifest to JSON: {}", e),
    })
}
