//! Helpers for protocol values (JSON scalars and nested arrays).

use serde_json::Value;

/// Whether a value counts as set: not zero, empty, `false` or `null`.
pub fn is_set(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |x| x != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Text form used in chart annotations: strings unquoted, arrays as `[a, b]`.
pub fn display(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Array(items) => format!("[{}]", join(items)),
        other => other.to_string(),
    }
}

/// Join values with `", "`.
pub fn join(items: &[Value]) -> String {
    items.iter().map(display).collect::<Vec<_>>().join(", ")
}

/// Scalar leaves of a (possibly nested) array, depth first. A scalar yields itself.
pub fn leaves(v: &Value) -> Vec<&Value> {
    let mut out = Vec::new();
    collect_leaves(v, &mut out);
    out
}

fn collect_leaves<'a>(v: &'a Value, out: &mut Vec<&'a Value>) {
    match v {
        Value::Array(items) => items.iter().for_each(|item| collect_leaves(item, out)),
        other => out.push(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_follows_zero_and_empty() {
        assert!(!is_set(&json!(0)));
        assert!(!is_set(&json!("")));
        assert!(!is_set(&json!([])));
        assert!(!is_set(&Value::Null));
        assert!(is_set(&json!(2)));
        assert!(is_set(&json!("#l0")));
    }

    #[test]
    fn display_nested() {
        assert_eq!(display(&json!("a")), "a");
        assert_eq!(display(&json!(1.5)), "1.5");
        assert_eq!(display(&json!([1, [2, "x"]])), "[1, [2, x]]");
    }

    #[test]
    fn leaves_flatten_depth_first() {
        let v = json!([[1, 3], [[2]], 4]);
        let got: Vec<_> = leaves(&v).into_iter().cloned().collect();
        assert_eq!(got, vec![json!(1), json!(3), json!(2), json!(4)]);
    }
}
