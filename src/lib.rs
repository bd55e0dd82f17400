//! # MultispeQ protocols: validation and flowcharts
//!
//! A MultispeQ protocol is a JSON document telling the instrument what to measure: one
//! group object, or a list of groups. A group either is a single measurement step or holds
//! its steps in `_protocol_set_`, optionally repeated (`set_repeats`) and parameterized by
//! variable arrays (`v_arrays`) referenced from steps as `#lN`, `@sN`, `@pN` or `@nN:M`.
//!
//! This crate
//!
//! - validates protocols against a JSON Schema, reporting every violation with its path
//!   ([`validate`], [`SchemaValidator`]),
//! - lints what the schema cannot express ([`lint`]),
//! - renders protocols as Mermaid flowcharts ([`generate`]).
//!
//! ## Example
//!
//! ```
//! use multispeq_protocols::{generate, validate, Schema};
//! use serde_json::json;
//!
//! let protocol = json!([{"label": "PAR", "environmental": [["light_intensity"]]}]);
//! let (ok, errors) = validate(&protocol, &Schema::bundled());
//! assert!(ok, "{errors:?}");
//!
//! let chart = generate(Some(&protocol), "LR", None).unwrap();
//! assert!(chart.starts_with("flowchart LR\n"));
//! ```
//!
//! Reference protocols ship in [`catalog`]; the `protocol_check` and `protocol_flowchart`
//! binaries wrap the library for the command line.

pub mod catalog;
pub mod flowchart;
pub mod lint;
pub mod model;
pub mod schema;
pub mod summary;
pub mod tables;
pub mod validate;
pub mod value;
pub mod variables;

pub use flowchart::{generate, Direction, FlowchartError};
pub use lint::{lint, LintMessage, LintRule, Severity};
pub use schema::Schema;
pub use validate::{validate, SchemaValidator};
pub use variables::{VariableArrays, VariableRef};
