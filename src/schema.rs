//! The protocol schema document (JSON Schema, 2020-12 dialect).
//!
//! A schema that cannot be read or parsed never fails the caller: it degrades to the empty
//! schema, which accepts every document, and the reason is kept in [`Schema::warnings`] and
//! logged.

use serde_json::{Map, Value};
use std::path::Path;

/// Schema shipped with the crate.
pub const BUNDLED_SCHEMA: &str = include_str!("../schema/protocol.schema.json");

#[derive(Debug, Clone)]
pub struct Schema {
    document: Value,
    warnings: Vec<String>,
}

impl Schema {
    pub fn bundled() -> Self {
        Self::from_json_str(BUNDLED_SCHEMA)
    }

    /// The empty schema.
    pub fn permissive() -> Self {
        Schema {
            document: Value::Object(Map::new()),
            warnings: Vec::new(),
        }
    }

    pub fn from_value(document: Value) -> Self {
        Schema {
            document,
            warnings: Vec::new(),
        }
    }

    pub fn from_json_str(text: &str) -> Self {
        match serde_json::from_str(text) {
            Ok(document) => Self::from_value(document),
            Err(e) => Self::degraded(format!("Invalid JSON schema: {}", e)),
        }
    }

    /// Load a schema file.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(document) => Self::from_value(document),
                Err(e) => Self::degraded(format!("Invalid JSON ({}): {}", path.display(), e)),
            },
            Err(e) => Self::degraded(format!("Cannot read schema ({}): {}", path.display(), e)),
        }
    }

    pub(crate) fn degraded(warning: String) -> Self {
        tracing::warn!("{}; validating against an empty schema", warning);
        Schema {
            warnings: vec![warning],
            ..Self::permissive()
        }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Whether the schema accepts every document (`{}` or `true`).
    pub fn is_permissive(&self) -> bool {
        match &self.document {
            Value::Object(map) => map.is_empty(),
            Value::Bool(b) => *b,
            _ => false,
        }
    }

    fn protocol_def(&self) -> Option<&Map<String, Value>> {
        self.document
            .get("$defs")?
            .get("protocol")?
            .as_object()
    }

    /// Recognized step fields (`$defs.protocol.properties`).
    pub fn commands(&self) -> Vec<&str> {
        self.protocol_def()
            .and_then(|def| def.get("properties"))
            .and_then(Value::as_object)
            .map(|props| props.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Schema of one step field.
    pub fn command(&self, name: &str) -> Option<&Value> {
        self.protocol_def()?.get("properties")?.get(name)
    }

    /// Fields required whenever `name` is present (`$defs.protocol.dependentRequired`).
    pub fn dependencies(&self, name: &str) -> Vec<&str> {
        self.protocol_def()
            .and_then(|def| def.get("dependentRequired"))
            .and_then(|deps| deps.get(name))
            .and_then(Value::as_array)
            .map(|fields| fields.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_schema_parses() {
        let schema = Schema::bundled();
        assert!(schema.warnings().is_empty());
        assert!(!schema.is_permissive());
        assert_eq!(
            schema.document()["$schema"],
            "https://json-schema.org/draft/2020-12/schema"
        );
    }

    #[test]
    fn bundled_commands_cover_step_fields() {
        let schema = Schema::bundled();
        let commands = schema.commands();
        for field in [
            "label",
            "_protocol_set_",
            "v_arrays",
            "set_repeats",
            "pulses",
            "pulse_distance",
            "pulse_length",
            "pulsed_lights",
            "pulsed_lights_brightness",
            "nonpulsed_lights",
            "nonpulsed_lights_brightness",
            "detectors",
            "environmental",
            "averages",
            "averages_delay",
            "protocol_repeats",
            "protocols_delay",
            "do_once",
            "start_on_open",
            "start_on_close",
            "open_close_start",
            "start_on_open_close",
            "par_led_start_on_open",
            "par_led_start_on_close",
            "par_led_start_on_open_close",
            "pre_illumination",
        ] {
            assert!(commands.contains(&field), "missing {field}");
            assert!(schema.command(field).is_some());
        }
    }

    #[test]
    fn dependencies_of_pulses() {
        let schema = Schema::bundled();
        assert_eq!(
            schema.dependencies("pulses"),
            vec![
                "pulse_distance",
                "pulse_length",
                "pulsed_lights",
                "pulsed_lights_brightness",
                "detectors"
            ]
        );
        assert!(schema.dependencies("label").is_empty());
    }

    #[test]
    fn malformed_text_degrades() {
        let schema = Schema::from_json_str("{ not json");
        assert!(schema.is_permissive());
        assert_eq!(schema.warnings().len(), 1);
        assert!(schema.commands().is_empty());
    }
}
