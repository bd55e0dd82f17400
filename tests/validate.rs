//! Validation tests: every violation reported with its path, dependency rules, schema degradation.

use multispeq_protocols::{validate, Schema, SchemaValidator};
use serde_json::json;
use std::io::Write;

fn paths(errors: &[String]) -> Vec<String> {
    let mut out: Vec<String> = errors
        .iter()
        .map(|e| {
            let rest = e.strip_prefix("Path '").expect("path prefix");
            rest[..rest.find("':").expect("path end")].to_string()
        })
        .collect();
    out.sort();
    out
}

#[test]
fn reports_every_violation() {
    let protocol = json!([{"averages": 0, "do_once": 7, "label": 42, "start_on_open": 3}]);
    let (ok, errors) = validate(&protocol, &Schema::bundled());
    assert!(!ok);
    assert_eq!(errors.len(), 4, "{errors:#?}");
    assert_eq!(
        paths(&errors),
        vec![
            "0 -> averages",
            "0 -> do_once",
            "0 -> label",
            "0 -> start_on_open"
        ]
    );
}

#[test]
fn nested_step_paths() {
    let protocol = json!([{"_protocol_set_": [{"label": "ok"}, {"detectors": [[1, 2]]}]}]);
    let (ok, errors) = validate(&protocol, &Schema::bundled());
    assert!(!ok);
    assert_eq!(paths(&errors), vec!["0 -> _protocol_set_ -> 1 -> detectors -> 0 -> 1"]);
}

#[test]
fn dependent_fields_are_required() {
    let (ok, errors) = validate(&json!({"averages_delay": 10}), &Schema::bundled());
    assert!(!ok);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].starts_with("Path 'root': "), "{}", errors[0]);
    assert!(errors[0].contains("averages"));

    let (ok, errors) = validate(&json!({"averages_delay": 10, "averages": 2}), &Schema::bundled());
    assert!(ok, "{errors:?}");
}

#[test]
fn root_shape() {
    let schema = Schema::bundled();
    assert!(!validate(&json!([]), &schema).0);
    assert!(!validate(&json!(5), &schema).0);
    assert!(validate(&json!({"label": "single group"}), &schema).0);
}

#[test]
fn valid_iff_no_errors() {
    let validator = SchemaValidator::new(&Schema::bundled());
    for doc in [
        json!([{"averages": 2}]),
        json!([{"averages": -1}]),
        json!({"pre_illumination": [2, 100, "@n0:0"], "v_arrays": [[5]]}),
        json!({"pre_illumination": [[2, 100]]}),
        json!({"environmental": [["co2"]]}),
        json!("not a protocol"),
    ] {
        let (ok, errors) = validator.validate_with_all_errors(&doc);
        assert_eq!(ok, errors.is_empty(), "{doc}: {errors:?}");
    }
}

#[test]
fn validator_is_reusable() {
    let validator = SchemaValidator::new(&Schema::bundled());
    assert!(validator.warnings().is_empty());
    let bad = json!([{"averages": 0}]);
    assert_eq!(
        validator.validate_with_all_errors(&bad),
        validator.validate_with_all_errors(&bad)
    );
    assert!(validator.validate_with_all_errors(&json!([{"averages": 3}])).0);
}

#[test]
fn malformed_schema_file_accepts_everything() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(b"{ \"type\": ").expect("write");
    let schema = Schema::load(file.path());
    assert_eq!(schema.warnings().len(), 1);

    let (ok, errors) = validate(&json!([{"averages": 0, "label": 42}]), &schema);
    assert!(ok);
    assert!(errors.is_empty());
}

#[test]
fn missing_schema_file_accepts_everything() {
    let dir = tempfile::tempdir().expect("temp dir");
    let schema = Schema::load(dir.path().join("absent.json"));
    assert!(schema.is_permissive());
    assert!(schema.warnings()[0].starts_with("Cannot read schema"));
    assert_eq!(validate(&json!({"do_once": 9}), &schema), (true, vec![]));
}

#[test]
fn custom_schema_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(
        file,
        r#"{{"type": "object", "properties": {{"label": {{"type": "string"}}}}, "required": ["label"]}}"#
    )
    .expect("write");
    let schema = Schema::load(file.path());
    assert!(schema.warnings().is_empty());

    let (ok, errors) = validate(&json!({"label": 3}), &schema);
    assert!(!ok);
    assert_eq!(paths(&errors), vec!["label"]);
    let (ok, errors) = validate(&json!({}), &schema);
    assert!(!ok);
    assert_eq!(paths(&errors), vec!["root"]);
}

#[test]
fn pulse_length_accepts_stored_settings() {
    let step = |length: serde_json::Value| {
        json!([{
            "pulses": [10],
            "pulse_distance": [4000],
            "pulse_length": [[length]],
            "pulsed_lights": [[1]],
            "pulsed_lights_brightness": [["a_b1"]],
            "detectors": [[1]]
        }])
    };
    let schema = Schema::bundled();
    assert!(validate(&step(json!("a_d5")), &schema).0);
    assert!(validate(&step(json!("@s2")), &schema).0);
    assert!(validate(&step(json!(30)), &schema).0);

    let (ok, errors) = validate(&step(json!("long")), &schema);
    assert!(!ok);
    assert_eq!(paths(&errors), vec!["0 -> pulse_length -> 0 -> 0"]);
}
