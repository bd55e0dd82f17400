//! Mermaid flowchart generation for protocol documents.
//!
//! Each group renders as its own `flowchart` block: a START node, one node per step
//! (annotated with [`crate::summary::content`]), edges labelled with start triggers and
//! pre-illumination, an END node, and a dashed loop edge when the group sets `set_repeats`.

use crate::model::{self, Group, Step};
use crate::summary;
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum FlowchartError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Flowchart direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `TB`
    TopBottom,
    /// `TD`, same as top to bottom.
    TopDown,
    /// `BT`
    BottomTop,
    /// `RL`
    RightLeft,
    /// `LR`
    LeftRight,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::TopBottom => "TB",
            Direction::TopDown => "TD",
            Direction::BottomTop => "BT",
            Direction::RightLeft => "RL",
            Direction::LeftRight => "LR",
        }
    }

    /// Top-down when the first group has more than one step, else left-right.
    pub fn suggested_for(document: &Value) -> Self {
        let first = match document {
            Value::Array(items) => items.first(),
            other => Some(other),
        };
        let steps = first
            .and_then(|g| g.get("_protocol_set_"))
            .and_then(Value::as_array)
            .map_or(0, Vec::len);
        if steps > 1 {
            Direction::TopDown
        } else {
            Direction::LeftRight
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = FlowchartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TB" => Ok(Direction::TopBottom),
            "TD" => Ok(Direction::TopDown),
            "BT" => Ok(Direction::BottomTop),
            "RL" => Ok(Direction::RightLeft),
            "LR" => Ok(Direction::LeftRight),
            other => Err(FlowchartError::InvalidInput(format!(
                "unknown direction `{}` (expected TB, TD, BT, RL or LR)",
                other
            ))),
        }
    }
}

/// Generate Mermaid flowchart code for a protocol.
///
/// `protocol` is a group object, a list of groups, or JSON text of either. `direction` is
/// written verbatim into each `flowchart` header. `styles`, when given, must be an object of
/// Mermaid theme variables and is emitted as an init directive.
pub fn generate(
    protocol: Option<&Value>,
    direction: &str,
    styles: Option<&Value>,
) -> Result<String, FlowchartError> {
    let protocol = protocol.ok_or_else(|| {
        FlowchartError::InvalidInput("no protocol provided to generate a flow-chart".to_string())
    })?;
    if !matches!(protocol, Value::String(_) | Value::Object(_) | Value::Array(_)) {
        return Err(FlowchartError::InvalidInput(
            "protocol needs to be an object, a list or a JSON string".to_string(),
        ));
    }
    let styles = match styles {
        None => None,
        Some(Value::Object(map)) => Some(map),
        Some(_) => {
            return Err(FlowchartError::InvalidInput(
                "styles must be provided as an object".to_string(),
            ))
        }
    };

    let parsed;
    let protocol = match protocol {
        Value::String(text) => {
            parsed = serde_json::from_str::<Value>(text).map_err(|e| {
                FlowchartError::InvalidInput(format!("protocol is not valid JSON: {}", e))
            })?;
            &parsed
        }
        other => other,
    };
    let groups = model::groups(protocol).ok_or_else(|| {
        FlowchartError::InvalidInput("protocol needs to be an object or a list".to_string())
    })?;
    if let Some(i) = groups.iter().position(|g| !g.is_object()) {
        return Err(FlowchartError::InvalidInput(format!(
            "protocol group {} is not an object",
            i
        )));
    }

    let mut chart = String::new();
    if let Some(styles) = styles {
        chart.push_str(&theme_directive(styles));
    }
    for (i, source) in groups.into_iter().enumerate() {
        let group = Group::new(source);
        render_group(&mut chart, &group, direction);
        tracing::debug!(
            group = i,
            steps = group.steps.as_ref().map_or(1, Vec::len),
            "rendered protocol group"
        );
    }
    Ok(chart)
}

/// Mermaid init directive selecting the base theme with the given variables.
fn theme_directive(styles: &Map<String, Value>) -> String {
    let variables: Vec<String> = styles
        .iter()
        .map(|(k, v)| format!("{}: {}", Value::String(k.clone()), v))
        .collect();
    format!(
        "%%{{\ninit: {{\n  \"theme\": \"base\",\n  \"themeVariables\": {{{}}}\n}}\n}}%%\n",
        variables.join(", ")
    )
}

fn node(chart: &mut String, idx: usize, content: &str) {
    chart.push_str(&format!("\tA{}[\"`{}`\"]:::protocol\n", idx, content));
}

fn edge(chart: &mut String, from: &str, to: usize, label: Option<String>) {
    let label = label
        .map(|l| format!("|\"`{}`\"|", l))
        .unwrap_or_default();
    chart.push_str(&format!("\t{} ==>{} A{}\n", from, label, to));
}

fn render_group(chart: &mut String, group: &Group<'_>, direction: &str) {
    chart.push_str(&format!("flowchart {}\n", direction));
    chart.push_str("\tSTART((Start))\n");

    match &group.steps {
        Some(steps) => render_steps(chart, group, steps),
        None => {
            let step = group.implicit_step();
            let title = step.title(|| "Protocol".to_string());
            node(chart, 0, &summary::content(&step, &title));
            edge(chart, "START", 0, summary::edge_label(&step, &group.variables));
            chart.push_str("\tA0 ==> END\n");
        }
    }

    chart.push_str("\tEND((&nbsp;End&nbsp;))\n");
    chart.push_str("\tclassDef protocol text-align:left,white-space:pre;\n");
}

fn render_steps(chart: &mut String, group: &Group<'_>, steps: &[Step<'_>]) {
    for (idx, step) in steps.iter().enumerate() {
        let title = step.title(|| format!("Protocol #{}", idx + 1));
        node(chart, idx, &summary::content(step, &title));

        let from = match idx {
            0 => "START".to_string(),
            _ => format!("A{}", idx - 1),
        };
        edge(chart, &from, idx, summary::edge_label(step, &group.variables));

        if idx + 1 == steps.len() {
            match step.protocols_delay.filter(|d| d.is_set()) {
                Some(delay) => chart.push_str(&format!("\tA{} ==> |{}ms| END\n", idx, delay)),
                None => chart.push_str(&format!("\tA{} ==> END\n", idx)),
            }
        }
    }

    if let (Some(last), Some(repeats)) = (steps.len().checked_sub(1), group.repeats()) {
        chart.push_str(&format!(
            "\tA{} -.-> |{}x| A0\n",
            last,
            group.variables.resolve_display(repeats)
        ));
        // Links are numbered in declaration order: one per step, the END edge, then this one.
        chart.push_str(&format!("\tlinkStyle {} stroke-width:3px\n", last + 2));
    }
}
