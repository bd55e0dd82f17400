//! Print the Mermaid flowchart of a MultispeQ protocol.
//!
//! Usage:
//!   protocol_flowchart [OPTIONS] [FILE.json]
//!   protocol_flowchart [OPTIONS] --catalog NAME
//!   protocol_flowchart [OPTIONS] < protocol.json
//!
//! Options:
//!   --direction DIR   TB, TD, BT, RL or LR (default: TD for multi-step sets, else LR)
//!   --styles STYLE    jii (house theme) or none (default)
//!   --catalog NAME    Render a bundled protocol

use anyhow::Context;
use multispeq_protocols::catalog;
use multispeq_protocols::tables::jii_styles;
use multispeq_protocols::{generate, Direction};
use serde_json::Value;
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

/// Remove `flag` and its value from `args`.
fn take_option(args: &mut Vec<String>, flag: &str) -> anyhow::Result<Option<String>> {
    match args.iter().position(|a| a == flag) {
        Some(pos) => {
            args.remove(pos);
            if pos >= args.len() {
                anyhow::bail!("{} requires a value", flag);
            }
            Ok(Some(args.remove(pos)))
        }
        None => Ok(None),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(io::stderr)
        .init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let direction = take_option(&mut args, "--direction")?
        .map(|d| d.parse::<Direction>())
        .transpose()?;
    let styles = match take_option(&mut args, "--styles")?.as_deref() {
        None | Some("none") => None,
        Some("jii") => Some(jii_styles()),
        Some(other) => anyhow::bail!("unknown styles `{}` (expected jii or none)", other),
    };

    let text = match take_option(&mut args, "--catalog")? {
        Some(name) => catalog::find(&name)
            .with_context(|| format!("no bundled protocol named `{}`", name))?
            .source
            .to_string(),
        None => match args.as_slice() {
            [] => {
                let mut src = String::new();
                io::stdin().read_to_string(&mut src)?;
                src
            }
            [path] => std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?,
            _ => anyhow::bail!("expected at most one protocol file"),
        },
    };

    let protocol: Value = serde_json::from_str(&text).context("protocol is not valid JSON")?;
    let direction = direction.unwrap_or_else(|| Direction::suggested_for(&protocol));
    let chart = generate(Some(&protocol), direction.as_str(), styles.as_ref())?;
    print!("{}", chart);
    Ok(())
}
