//! MultispeQ hardware channel names and the house flowchart theme.

use crate::model::ChannelId;
use serde_json::{Map, Value};

/// Detector ID → name.
pub const DETECTORS: &[(&str, &str)] = &[
    ("1", "700nm - 1150nm"),
    ("3", "400nm - 700nm (BG18)"),
];

/// LED ID → name.
pub const LEDS: &[(&str, &str)] = &[
    ("1", "530nm (Main)"),
    ("2", "655nm (Main)"),
    ("3", "590nm (Main)"),
    ("4", "448nm (Main)"),
    ("5", "950nm (Main)"),
    ("6", "950nm (Clamp)"),
    ("7", "655nm (Clamp)"),
    ("8", "850nm (Clamp)"),
    ("9", "730nm (Clamp)"),
    ("10", "820nm (Clamp)"),
];

/// Sensor key pattern (`|`-separated alternatives) → name.
pub const SENSORS: &[(&str, &str)] = &[
    (
        "temperature_humidity_pressure|temperature_humidity_pressure2|thp|thp2",
        "Ambient Temperature, Humidity, Pressure",
    ),
    ("contactless_temp", "Contactless Temperature"),
    ("compass_and_angle", "Accelerometer & Magnetometer"),
    ("thickness|thickness_raw", "Hall Effect Sensor"),
    ("light_intensity|previous_light_intensity", "PAR light sensor"),
];

/// Mermaid theme variables used for published protocol charts.
pub const JII_STYLES: &[(&str, &str)] = &[
    ("primaryColor", "#49e06d"),
    ("primaryTextColor", "#005e5e"),
    ("primaryBorderColor", "#005e5e"),
    ("lineColor", "#fff381"),
    ("secondaryColor", "#afd7f4"),
    ("tertiaryColor", "#D7EBF9"),
];

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, name)| *name)
}

pub fn detector_name(id: &ChannelId) -> Option<&'static str> {
    lookup(DETECTORS, &id.key())
}

pub fn led_name(id: &ChannelId) -> Option<&'static str> {
    lookup(LEDS, &id.key())
}

/// First sensor whose pattern has an alternative containing the key. Only text keys match.
pub fn sensor_name(id: &ChannelId) -> Option<&'static str> {
    let ChannelId::Text(key) = id else {
        return None;
    };
    if key.is_empty() {
        return None;
    }
    SENSORS
        .iter()
        .find(|(pattern, _)| pattern.split('|').any(|alt| alt.contains(key.as_str())))
        .map(|(_, name)| *name)
}

/// [`JII_STYLES`] as a styles object for [`crate::generate`].
pub fn jii_styles() -> Value {
    let map: Map<String, Value> = JII_STYLES
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();
    Value::Object(map)
}
