//! Typed view of protocol documents: groups, steps and the step fields the flowchart
//! understands.
//!
//! Documents stay `serde_json::Value`s; a [`Group`] or [`Step`] borrows from them and decodes
//! each recognized field once into an explicit variant. Unknown fields are not decoded.

use crate::value;
use crate::variables::VariableArrays;
use serde_json::{Number, Value};
use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// Groups of a document: an object is a single group, an array lists groups.
/// Returns `None` for any other JSON type.
pub fn groups(document: &Value) -> Option<Vec<&Value>> {
    match document {
        Value::Object(_) => Some(vec![document]),
        Value::Array(items) => Some(items.iter().collect()),
        _ => None,
    }
}

/// A scalar step setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Setting<'a> {
    Int(i64),
    /// Non-integer number.
    Number(&'a Number),
    /// String; may be a variable reference.
    Text(&'a str),
    /// Booleans, null, arrays and objects.
    Other(&'a Value),
}

impl<'a> Setting<'a> {
    pub fn from_value(v: &'a Value) -> Self {
        match v {
            Value::Number(n) => match n.as_i64() {
                Some(i) => Setting::Int(i),
                None => Setting::Number(n),
            },
            Value::String(s) => Setting::Text(s),
            other => Setting::Other(other),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Setting::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Present and not zero, empty, `false` or `null`.
    pub fn is_set(&self) -> bool {
        match self {
            Setting::Int(i) => *i != 0,
            Setting::Number(n) => n.as_f64().map_or(true, |x| x != 0.0),
            Setting::Text(s) => !s.is_empty(),
            Setting::Other(v) => value::is_set(v),
        }
    }
}

impl fmt::Display for Setting<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Int(i) => write!(f, "{}", i),
            Setting::Number(n) => write!(f, "{}", n),
            Setting::Text(s) => f.write_str(s),
            Setting::Other(v) => f.write_str(&value::display(v)),
        }
    }
}

/// A hardware channel identifier (detector, LED or sensor key) as written in a step.
///
/// Integers order before text, so a deduplicated set iterates integers numerically and
/// then text lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelId {
    Int(i64),
    Text(String),
}

impl ChannelId {
    /// Integers and their canonical decimal strings (`1`, `"1"`) are the same ID.
    pub fn from_value(v: &Value) -> Self {
        if let Some(i) = v.as_i64() {
            return ChannelId::Int(i);
        }
        let text = value::display(v);
        match text.parse::<i64>() {
            Ok(i) if i.to_string() == text => ChannelId::Int(i),
            _ => ChannelId::Text(text),
        }
    }

    /// Key used for table lookups.
    pub fn key(&self) -> Cow<'_, str> {
        match self {
            ChannelId::Int(i) => Cow::Owned(i.to_string()),
            ChannelId::Text(s) => Cow::Borrowed(s),
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Unique channel IDs referenced by a field, in stable sorted order.
pub type ChannelSet = BTreeSet<ChannelId>;

fn channel_set(v: &Value) -> ChannelSet {
    value::leaves(v).into_iter().map(ChannelId::from_value).collect()
}

/// Clamp event a step waits for before it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClampEvent {
    Open,
    Close,
    OpenClose,
}

impl ClampEvent {
    pub fn describe(self) -> &'static str {
        match self {
            ClampEvent::Open => "Clamp opened",
            ClampEvent::Close => "Clamp closed",
            ClampEvent::OpenClose => "Clamp opened and closed",
        }
    }
}

/// Start condition of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartTrigger {
    Clamp(ClampEvent),
    /// Clamp event while the given LED follows the ambient PAR.
    ParLed { event: ClampEvent, led: ChannelId },
}

impl StartTrigger {
    pub fn event(&self) -> ClampEvent {
        match self {
            StartTrigger::Clamp(event) | StartTrigger::ParLed { event, .. } => *event,
        }
    }
}

/// Start trigger fields in precedence order; when several are set the last one applies.
pub const START_TRIGGER_FIELDS: &[&str] = &[
    "start_on_open",
    "start_on_close",
    "open_close_start",
    "start_on_open_close",
    "par_led_start_on_open",
    "par_led_start_on_close",
    "par_led_start_on_open_close",
];

fn start_trigger(field: &str, v: &Value) -> Option<StartTrigger> {
    let flag = || v.as_i64() == Some(1);
    let par_led = |event| StartTrigger::ParLed {
        event,
        led: ChannelId::from_value(v),
    };
    match field {
        "start_on_open" if flag() => Some(StartTrigger::Clamp(ClampEvent::Open)),
        "start_on_close" if flag() => Some(StartTrigger::Clamp(ClampEvent::Close)),
        "open_close_start" | "start_on_open_close" if flag() => {
            Some(StartTrigger::Clamp(ClampEvent::OpenClose))
        }
        "par_led_start_on_open" => Some(par_led(ClampEvent::Open)),
        "par_led_start_on_close" => Some(par_led(ClampEvent::Close)),
        "par_led_start_on_open_close" => Some(par_led(ClampEvent::OpenClose)),
        _ => None,
    }
}

/// Which set repeat a `do_once` step runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOnce {
    First,
    Last,
}

/// One pre-illumination entry: `[led, duration (ms), PAR]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Illumination<'a> {
    pub led: ChannelId,
    pub duration: &'a Value,
    pub par: &'a Value,
}

impl<'a> Illumination<'a> {
    fn from_triple(v: &'a Value) -> Option<Self> {
        match v.as_array()?.as_slice() {
            [led, duration, par, ..] => Some(Illumination {
                led: ChannelId::from_value(led),
                duration,
                par,
            }),
            _ => None,
        }
    }
}

/// `pre_illumination` is a single triple or a list of triples.
fn illuminations(v: &Value) -> Vec<Illumination<'_>> {
    let Some(items) = v.as_array() else {
        return Vec::new();
    };
    match items.first() {
        Some(Value::Array(_)) => items.iter().filter_map(Illumination::from_triple).collect(),
        Some(_) => Illumination::from_triple(v).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Decoded view of one measurement step.
#[derive(Debug, Clone)]
pub struct Step<'a> {
    pub source: &'a Value,
    pub label: Option<Setting<'a>>,
    pub averages: Option<Setting<'a>>,
    pub averages_delay: Option<Setting<'a>>,
    pub protocol_repeats: Option<Setting<'a>>,
    pub protocols_delay: Option<Setting<'a>>,
    pub detectors: Option<ChannelSet>,
    pub pulsed_lights: Option<ChannelSet>,
    pub nonpulsed_lights: Option<ChannelSet>,
    pub environmental: Option<ChannelSet>,
    pub do_once: Option<RunOnce>,
    /// Every start trigger that is set, in precedence order.
    pub start_triggers: Vec<StartTrigger>,
    pub pre_illumination: Vec<Illumination<'a>>,
}

impl<'a> Step<'a> {
    /// Decode a step. Non-object values decode to a step with no fields.
    pub fn new(source: &'a Value) -> Self {
        let setting = |key: &str| source.get(key).map(Setting::from_value);
        let channels = |key: &str| source.get(key).map(channel_set);
        let do_once = match source.get("do_once").and_then(Value::as_i64) {
            Some(1) => Some(RunOnce::First),
            Some(-1) => Some(RunOnce::Last),
            _ => None,
        };
        let start_triggers = START_TRIGGER_FIELDS
            .iter()
            .filter_map(|field| start_trigger(field, source.get(*field)?))
            .collect();
        Step {
            source,
            label: setting("label"),
            averages: setting("averages"),
            averages_delay: setting("averages_delay"),
            protocol_repeats: setting("protocol_repeats"),
            protocols_delay: setting("protocols_delay"),
            detectors: channels("detectors"),
            pulsed_lights: channels("pulsed_lights"),
            nonpulsed_lights: channels("nonpulsed_lights"),
            environmental: channels("environmental"),
            do_once,
            start_triggers,
            pre_illumination: source
                .get("pre_illumination")
                .map(illuminations)
                .unwrap_or_default(),
        }
    }

    /// The start trigger that applies (last one set in precedence order).
    pub fn start(&self) -> Option<&StartTrigger> {
        self.start_triggers.last()
    }

    /// Explicit label, else `fallback`.
    pub fn title(&self, fallback: impl FnOnce() -> String) -> String {
        match &self.label {
            Some(label) => label.to_string(),
            None => fallback(),
        }
    }
}

/// Decoded view of one protocol group.
#[derive(Debug, Clone)]
pub struct Group<'a> {
    pub source: &'a Value,
    /// Steps of `_protocol_set_`; `None` when the group is a single implicit step.
    pub steps: Option<Vec<Step<'a>>>,
    pub variables: VariableArrays<'a>,
    pub set_repeats: Option<&'a Value>,
}

impl<'a> Group<'a> {
    pub fn new(source: &'a Value) -> Self {
        let steps = source.get("_protocol_set_").map(|set| match set.as_array() {
            Some(items) => items.iter().map(Step::new).collect(),
            None => Vec::new(),
        });
        Group {
            source,
            steps,
            variables: VariableArrays::of_group(source),
            set_repeats: source.get("set_repeats"),
        }
    }

    /// The group read as a single step (used when it has no `_protocol_set_`).
    pub fn implicit_step(&self) -> Step<'a> {
        Step::new(self.source)
    }

    /// `set_repeats` when it is set (non-zero, non-empty).
    pub fn repeats(&self) -> Option<&'a Value> {
        self.set_repeats.filter(|v| value::is_set(v))
    }
}
