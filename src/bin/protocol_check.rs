//! Validate and lint MultispeQ protocol files.
//!
//! Usage:
//!   protocol_check [OPTIONS] [FILE.json ...]
//!   protocol_check < protocol.json
//!
//! Options:
//!   --human, -H      Human-readable output
//!   --schema PATH    Validate against PATH instead of the bundled schema
//!   --catalog        Check every bundled protocol
//!
//! Exits with status 1 when any schema violation or error-level lint finding is reported.
//! Set RUST_LOG (e.g. RUST_LOG=debug) for diagnostics on stderr.

use multispeq_protocols::catalog::CATALOG;
use multispeq_protocols::{lint, LintMessage, LintRule, Schema, SchemaValidator, Severity};
use serde_json::Value;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

fn rule_id(rule: LintRule) -> &'static str {
    match rule {
        LintRule::UnknownField => "unknown-field",
        LintRule::UnresolvedVariable => "unresolved-variable",
        LintRule::UnknownDetector => "unknown-detector",
        LintRule::UnknownLed => "unknown-led",
        LintRule::UnknownSensor => "unknown-sensor",
        LintRule::ConflictingStartTriggers => "conflicting-start-triggers",
    }
}

#[derive(Clone, Copy)]
enum OutputStyle {
    Compact,
    Human,
}

#[derive(Default)]
struct Totals {
    errors: usize,
    warnings: usize,
}

fn print_violation(name: &str, error: &str, style: OutputStyle) {
    match style {
        OutputStyle::Compact => println!("{}: error: {} [schema]", name, error),
        OutputStyle::Human => {
            println!("  {}: {}", name, error);
            println!("    rule: schema");
        }
    }
}

fn print_message(name: &str, m: &LintMessage, style: OutputStyle) {
    let severity_str = match m.severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
    };
    match style {
        OutputStyle::Compact => {
            println!(
                "{}: {}: {}: {} [{}]",
                name,
                m.path,
                severity_str,
                m.message,
                rule_id(m.rule)
            );
        }
        OutputStyle::Human => {
            println!("  {} {}: {}", name, m.path, m.message);
            println!("    rule: {} ({})", rule_id(m.rule), severity_str);
        }
    }
}

/// Check one document; returns whether it has errors.
fn check(
    name: &str,
    text: &str,
    schema: &Schema,
    validator: &SchemaValidator,
    style: OutputStyle,
    totals: &mut Totals,
) -> bool {
    let document: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{}: invalid JSON: {}", name, e);
            totals.errors += 1;
            return true;
        }
    };

    let (valid, errors) = validator.validate_with_all_errors(&document);
    for error in &errors {
        print_violation(name, error, style);
    }
    totals.errors += errors.len();

    let messages = lint(&document, schema);
    for m in &messages {
        match m.severity {
            Severity::Error => totals.errors += 1,
            Severity::Warning => totals.warnings += 1,
        }
        print_message(name, m, style);
    }
    !valid || messages.iter().any(|m| m.severity == Severity::Error)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let style = if let Some(pos) = args.iter().position(|a| a == "--human" || a == "-H") {
        args.remove(pos);
        OutputStyle::Human
    } else {
        OutputStyle::Compact
    };
    let catalog = if let Some(pos) = args.iter().position(|a| a == "--catalog") {
        args.remove(pos);
        true
    } else {
        false
    };
    let schema = if let Some(pos) = args.iter().position(|a| a == "--schema") {
        args.remove(pos);
        if pos >= args.len() {
            anyhow::bail!("--schema requires a path");
        }
        Schema::load(args.remove(pos))
    } else {
        Schema::bundled()
    };

    let validator = SchemaValidator::new(&schema);
    for warning in validator.warnings() {
        eprintln!("schema: {}", warning);
    }

    let mut has_error = false;
    let mut totals = Totals::default();

    if catalog {
        for entry in CATALOG {
            has_error |= check(entry.name, entry.source, &schema, &validator, style, &mut totals);
        }
    }
    if args.is_empty() && !catalog {
        let mut src = String::new();
        io::stdin().read_to_string(&mut src)?;
        has_error |= check("<stdin>", &src, &schema, &validator, style, &mut totals);
    }
    for path in &args {
        let src = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("{}: {}", path, e);
                has_error = true;
                continue;
            }
        };
        has_error |= check(path, &src, &schema, &validator, style, &mut totals);
    }

    if totals.errors > 0 || totals.warnings > 0 {
        eprintln!(
            "check: {} error(s), {} warning(s)",
            totals.errors, totals.warnings
        );
    }
    if has_error {
        std::process::exit(1);
    }
    Ok(())
}
