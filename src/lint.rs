//! Protocol linter: findings the schema does not express and the flowchart silently tolerates.
//!
//! ## Rules
//!
//! - **Unknown field**: a field the schema does not list; it is accepted but never rendered.
//! - **Unresolved variable**: a `#l`/`@s`/`@p`/`@n` reference whose index is out of range for
//!   the group's `v_arrays`; it is shown literally.
//! - **Unknown detector / LED / sensor**: a literal channel ID with no name; it is dropped
//!   from the flowchart.
//! - **Conflicting start triggers**: more than one start trigger on a step; only the last
//!   one applies.
//!
//! Messages are returned in document order.

use crate::model::{self, ChannelId, ChannelSet, Group, Step, START_TRIGGER_FIELDS};
use crate::schema::Schema;
use crate::tables;
use crate::validate::format_path;
use crate::variables::{VariableArrays, VariableRef};
use serde_json::Value;

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Identifies which rule produced the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintRule {
    UnknownField,
    UnresolvedVariable,
    UnknownDetector,
    UnknownLed,
    UnknownSensor,
    ConflictingStartTriggers,
}

/// A single lint message with location.
#[derive(Debug, Clone)]
pub struct LintMessage {
    /// Path from the document root, formatted like validation errors.
    pub path: String,
    pub rule: LintRule,
    pub severity: Severity,
    pub message: String,
}

/// Fields of a group that are not step settings.
const GROUP_FIELDS: &[&str] = &["_protocol_set_", "v_arrays", "set_repeats"];

struct Linter<'s> {
    commands: Vec<&'s str>,
    out: Vec<LintMessage>,
}

impl Linter<'_> {
    fn push(&mut self, path: &[String], rule: LintRule, severity: Severity, message: String) {
        self.out.push(LintMessage {
            path: format_segments(path),
            rule,
            severity,
            message,
        });
    }

    fn group(&mut self, group: &Group<'_>, path: &[String]) {
        match &group.steps {
            Some(steps) => {
                self.unknown_fields(group.source, path, true);
                if let Some(repeats) = group.set_repeats {
                    self.variables(repeats, &child(path, "set_repeats"), &group.variables);
                }
                for (i, step) in steps.iter().enumerate() {
                    let step_path = child(&child(path, "_protocol_set_"), &i.to_string());
                    self.unknown_fields(step.source, &step_path, false);
                    self.step(step, &step_path, &group.variables);
                }
            }
            None => {
                self.unknown_fields(group.source, path, true);
                if let Some(repeats) = group.set_repeats {
                    self.variables(repeats, &child(path, "set_repeats"), &group.variables);
                }
                self.step(&group.implicit_step(), path, &group.variables);
            }
        }
    }

    fn unknown_fields(&mut self, source: &Value, path: &[String], is_group: bool) {
        if self.commands.is_empty() {
            return;
        }
        let Some(map) = source.as_object() else {
            return;
        };
        for key in map.keys() {
            let key_str = key.as_str();
            if self.commands.contains(&key_str) || (is_group && GROUP_FIELDS.contains(&key_str)) {
                continue;
            }
            self.push(
                &child(path, key),
                LintRule::UnknownField,
                Severity::Warning,
                format!("field `{}` is not in the schema and is ignored by the flowchart", key),
            );
        }
    }

    fn step(&mut self, step: &Step<'_>, path: &[String], vars: &VariableArrays<'_>) {
        if let Some(map) = step.source.as_object() {
            for (key, v) in map {
                if GROUP_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                self.variables(v, &child(path, key), vars);
            }
        }

        self.channels(&step.detectors, path, "detectors", LintRule::UnknownDetector, tables::detector_name);
        self.channels(&step.pulsed_lights, path, "pulsed_lights", LintRule::UnknownLed, tables::led_name);
        self.channels(
            &step.nonpulsed_lights,
            path,
            "nonpulsed_lights",
            LintRule::UnknownLed,
            tables::led_name,
        );
        if let Some(ids) = &step.environmental {
            for id in ids {
                // Integers in `environmental` are before/after flags, not sensors.
                if let ChannelId::Text(key) = id {
                    if tables::sensor_name(id).is_none() && VariableRef::parse(key).is_none() {
                        self.push(
                            &child(path, "environmental"),
                            LintRule::UnknownSensor,
                            Severity::Warning,
                            format!("sensor `{}` has no known name", key),
                        );
                    }
                }
            }
        }
        for item in &step.pre_illumination {
            self.led(&item.led, &child(path, "pre_illumination"));
        }
        for field in START_TRIGGER_FIELDS.iter().filter(|f| f.starts_with("par_led_")) {
            if let Some(v) = step.source.get(*field) {
                self.led(&ChannelId::from_value(v), &child(path, field));
            }
        }

        if step.start_triggers.len() > 1 {
            let set: Vec<&str> = START_TRIGGER_FIELDS
                .iter()
                .copied()
                .filter(|f| step.source.get(*f).is_some_and(|v| is_trigger_set(f, v)))
                .collect();
            self.push(
                path,
                LintRule::ConflictingStartTriggers,
                Severity::Error,
                format!(
                    "several start triggers are set ({}); only `{}` applies",
                    set.join(", "),
                    set.last().copied().unwrap_or_default()
                ),
            );
        }
    }

    fn channels(
        &mut self,
        ids: &Option<ChannelSet>,
        path: &[String],
        field: &str,
        rule: LintRule,
        name: fn(&ChannelId) -> Option<&'static str>,
    ) {
        let Some(ids) = ids else {
            return;
        };
        for id in ids.iter().filter(|id| !is_reference(id)) {
            if name(id).is_none() {
                self.push(
                    &child(path, field),
                    rule,
                    Severity::Warning,
                    format!("{} `{}` has no known name", field.trim_end_matches('s').replace('_', " "), id),
                );
            }
        }
    }

    fn led(&mut self, id: &ChannelId, path: &[String]) {
        if !is_reference(id) && tables::led_name(id).is_none() {
            self.push(
                path,
                LintRule::UnknownLed,
                Severity::Warning,
                format!("LED `{}` has no known name", id),
            );
        }
    }

    fn variables(&mut self, v: &Value, path: &[String], vars: &VariableArrays<'_>) {
        match v {
            Value::String(token) => {
                if let Some(reference) = VariableRef::parse(token) {
                    if vars.lookup(reference).is_none() {
                        self.push(
                            path,
                            LintRule::UnresolvedVariable,
                            Severity::Warning,
                            format!(
                                "variable `{}` is out of range ({} variable array(s))",
                                token,
                                vars.len()
                            ),
                        );
                    }
                }
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.variables(item, &child(path, &i.to_string()), vars);
                }
            }
            Value::Object(map) => {
                for (k, item) in map {
                    self.variables(item, &child(path, k), vars);
                }
            }
            _ => {}
        }
    }
}

fn is_trigger_set(field: &str, v: &Value) -> bool {
    field.starts_with("par_led_") || v.as_i64() == Some(1)
}

fn is_reference(id: &ChannelId) -> bool {
    matches!(id, ChannelId::Text(s) if VariableRef::parse(s).is_some())
}

fn child(path: &[String], segment: &str) -> Vec<String> {
    let mut out = path.to_vec();
    out.push(segment.to_string());
    out
}

fn format_segments(path: &[String]) -> String {
    if path.is_empty() {
        format_path("")
    } else {
        path.join(" -> ")
    }
}

/// Lint a protocol document (a group, a list of groups, or JSON text of either).
/// Documents that are not protocol-shaped produce no messages; validation reports those.
pub fn lint(document: &Value, schema: &Schema) -> Vec<LintMessage> {
    let parsed;
    let document = match document {
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(v) => {
                parsed = v;
                &parsed
            }
            Err(_) => return Vec::new(),
        },
        other => other,
    };
    let Some(groups) = model::groups(document) else {
        return Vec::new();
    };

    let mut linter = Linter {
        commands: if schema.is_permissive() {
            Vec::new()
        } else {
            schema.commands()
        },
        out: Vec::new(),
    };
    let is_list = document.is_array();
    for (i, source) in groups.into_iter().enumerate() {
        if !source.is_object() {
            continue;
        }
        let path = if is_list { vec![i.to_string()] } else { Vec::new() };
        linter.group(&Group::new(source), &path);
    }
    linter.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules(doc: Value) -> Vec<(String, LintRule)> {
        lint(&doc, &Schema::bundled())
            .into_iter()
            .map(|m| (m.path, m.rule))
            .collect()
    }

    #[test]
    fn clean_protocol_has_no_findings() {
        let doc = json!([{"detectors": [[1]], "environmental": [["light_intensity", 0]], "open_close_start": 1}]);
        assert!(rules(doc).is_empty());
    }

    #[test]
    fn unknown_field() {
        let doc = json!([{"_protocol_set_": [{"label": "a", "spad": [[2]]}]}]);
        assert_eq!(
            rules(doc),
            vec![("0 -> _protocol_set_ -> 0 -> spad".to_string(), LintRule::UnknownField)]
        );
    }

    #[test]
    fn unknown_fields_skipped_for_permissive_schema() {
        let doc = json!({"spad": [[2]]});
        assert!(lint(&doc, &Schema::permissive()).is_empty());
    }

    #[test]
    fn unresolved_variables() {
        let doc = json!({
            "v_arrays": [[1, 2]],
            "set_repeats": "#l3",
            "_protocol_set_": [{"protocol_repeats": "#l0", "pre_illumination": [2, "@n0:5", 100]}]
        });
        assert_eq!(
            rules(doc),
            vec![
                ("set_repeats".to_string(), LintRule::UnresolvedVariable),
                (
                    "_protocol_set_ -> 0 -> pre_illumination -> 1".to_string(),
                    LintRule::UnresolvedVariable
                ),
            ]
        );
    }

    #[test]
    fn unknown_channels() {
        let doc = json!({
            "v_arrays": [[1]],
            "detectors": [[1, 2]],
            "pulsed_lights": [[3, "@s0"]],
            "nonpulsed_lights": [[11]],
            "environmental": [["co2", 1]],
            "par_led_start_on_open": 12
        });
        let found: Vec<LintRule> = rules(doc).into_iter().map(|(_, r)| r).collect();
        assert_eq!(
            found,
            vec![
                LintRule::UnknownDetector,
                LintRule::UnknownLed,
                LintRule::UnknownSensor,
                LintRule::UnknownLed,
            ]
        );
    }

    #[test]
    fn conflicting_triggers_are_errors() {
        let doc = json!({"start_on_open": 1, "start_on_close": 1, "start_on_open_close": 0});
        let messages = lint(&doc, &Schema::bundled());
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].rule, LintRule::ConflictingStartTriggers);
        assert_eq!(messages[0].severity, Severity::Error);
        assert_eq!(messages[0].path, "root");
        assert!(messages[0].message.contains("only `start_on_close` applies"));
    }
}
