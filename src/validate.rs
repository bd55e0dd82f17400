//! Protocol validation against the schema, reporting every violation in one pass.
//!
//! Each error reads `Path '<segments>': <message>`, where the segments (property names and
//! array indices from the document root) are joined with ` -> `, or `root` for the document
//! itself.

use crate::schema::Schema;
use serde_json::Value;

/// Compiled schema, reusable across documents.
pub struct SchemaValidator {
    /// `None` accepts every document.
    validator: Option<jsonschema::Validator>,
    warnings: Vec<String>,
}

impl SchemaValidator {
    /// Compile a schema. A schema that does not compile degrades to accepting everything.
    pub fn new(schema: &Schema) -> Self {
        let mut warnings = schema.warnings().to_vec();
        let validator = if schema.is_permissive() {
            None
        } else {
            match jsonschema::validator_for(schema.document()) {
                Ok(validator) => Some(validator),
                Err(e) => {
                    let warning = format!("Invalid schema: {}", e);
                    tracing::warn!("{}; validating against an empty schema", warning);
                    warnings.push(warning);
                    None
                }
            }
        };
        SchemaValidator {
            validator,
            warnings,
        }
    }

    /// Warnings from loading and compiling the schema.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Validate a document (a group, a list of groups, or JSON text of either).
    /// Returns `true` with no errors, or `false` with every violation found.
    pub fn validate_with_all_errors(&self, data: &Value) -> (bool, Vec<String>) {
        let parsed;
        let data = match data {
            Value::String(text) => match serde_json::from_str::<Value>(text) {
                Ok(v) => {
                    parsed = v;
                    &parsed
                }
                Err(e) => return (false, vec![format!("Path 'root': invalid JSON: {}", e)]),
            },
            other => other,
        };

        let errors: Vec<String> = match &self.validator {
            Some(validator) => validator
                .iter_errors(data)
                .map(|e| format!("Path '{}': {}", format_path(&e.instance_path.to_string()), e))
                .collect(),
            None => Vec::new(),
        };
        tracing::debug!(errors = errors.len(), "validated protocol");
        (errors.is_empty(), errors)
    }
}

/// Render a JSON pointer (`/0/detectors/1`) as `0 -> detectors -> 1`; empty is `root`.
pub fn format_path(pointer: &str) -> String {
    let segments = pointer_segments(pointer);
    if segments.is_empty() {
        "root".to_string()
    } else {
        segments.join(" -> ")
    }
}

fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Validate a protocol against a schema, collecting all errors.
pub fn validate(protocol: &Value, schema: &Schema) -> (bool, Vec<String>) {
    SchemaValidator::new(schema).validate_with_all_errors(protocol)
}
