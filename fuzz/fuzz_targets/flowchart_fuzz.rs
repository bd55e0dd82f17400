//! Flowchart/validator fuzz target: feed arbitrary text as a protocol document.
//! Generation must return Ok or Err(InvalidInput), validation and linting must not panic.
//! Build with: cargo fuzz run flowchart_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let text = serde_json::Value::String(s.to_string());
    let _ = multispeq_protocols::generate(Some(&text), "TD", None);

    let schema = multispeq_protocols::Schema::bundled();
    let (ok, errors) = multispeq_protocols::validate(&text, &schema);
    assert_eq!(ok, errors.is_empty());
    let _ = multispeq_protocols::lint(&text, &schema);
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run flowchart_fuzz");
}
