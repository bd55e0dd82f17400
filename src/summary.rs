//! Text shown inside flowchart nodes (step content) and on edges (start trigger,
//! pre-illumination). Output uses Mermaid markdown strings: `**bold**`, `*italic*`.

use crate::model::{ChannelId, ChannelSet, Illumination, RunOnce, Setting, StartTrigger, Step};
use crate::tables;
use crate::variables::VariableArrays;
use std::collections::BTreeSet;

/// `singular` for exactly one, else `plural`.
pub fn noun<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

/// Integer setting greater than one; references and other shapes are not shown.
fn counted(setting: Option<Setting<'_>>) -> Option<i64> {
    match setting {
        Some(Setting::Int(n)) if n > 1 => Some(n),
        Some(Setting::Int(_) | Setting::Number(_) | Setting::Text(_) | Setting::Other(_)) | None => None,
    }
}

fn with_delay(line: String, delay: Option<Setting<'_>>) -> String {
    match delay.filter(Setting::is_set) {
        Some(d) => format!("{} (delay between: {})", line, d),
        None => line,
    }
}

/// `*Noun:* names` for one channel field. Names come from the table in ID order (unmapped
/// IDs dropped); the noun and the inline/bullet layout follow the number of unique raw IDs.
/// A field that references no IDs has no line.
fn channel_line(ids: &ChannelSet, names: &[&str], singular: &str, plural: &str) -> Option<String> {
    let count = ids.len();
    if count == 0 {
        return None;
    }
    let body = if count == 1 {
        names.join("\n")
    } else {
        let bullets: Vec<String> = names.iter().map(|n| format!("• {}", n)).collect();
        format!("\n{}", bullets.join("\n"))
    };
    Some(format!("*{}:* {}", noun(count, singular, plural), body))
}

fn mapped(ids: &ChannelSet, name: fn(&ChannelId) -> Option<&'static str>) -> Vec<&'static str> {
    ids.iter().filter_map(name).collect()
}

/// Node content: bold title followed by one line per annotation that applies.
pub fn content(step: &Step<'_>, title: &str) -> String {
    let mut out = vec![format!("**{}**", title)];

    if let Some(n) = counted(step.averages) {
        out.push(with_delay(format!("*Averages*: {}", n), step.averages_delay));
    }

    if let Some(n) = counted(step.protocol_repeats) {
        out.push(with_delay(format!("*Repeats*: {}", n), step.protocols_delay));
    }

    if let Some(ids) = &step.detectors {
        let names = mapped(ids, tables::detector_name);
        out.extend(channel_line(ids, &names, "Detector", "Detectors"));
    }

    if let Some(ids) = &step.pulsed_lights {
        let names = mapped(ids, tables::led_name);
        out.extend(channel_line(ids, &names, "Pulsed LED", "Pulsed LEDs"));
    }

    if let Some(ids) = &step.nonpulsed_lights {
        let names = mapped(ids, tables::led_name);
        out.extend(channel_line(ids, &names, "Non Pulsed LED", "Non Pulsed LEDs"));
    }

    if let Some(ids) = &step.environmental {
        // Several keys map to the same sensor.
        let names: BTreeSet<&str> = ids.iter().filter_map(tables::sensor_name).collect();
        let names: Vec<&str> = names.into_iter().collect();
        out.extend(channel_line(ids, &names, "Sensor", "Sensors"));
    }

    match step.do_once {
        Some(RunOnce::First) => out.push("Runs only during *first* repeat".to_string()),
        Some(RunOnce::Last) => out.push("Runs only during *last* repeat".to_string()),
        None => {}
    }

    out.join("\n")
}

/// `**Waits until**: ...`, plus the LED name for PAR-following triggers.
pub fn start_text(trigger: &StartTrigger) -> String {
    let text = format!("**Waits until**: {}", trigger.event().describe());
    match trigger {
        StartTrigger::ParLed { led, .. } => match tables::led_name(led) {
            Some(name) => format!("{}\n{}", text, name),
            None => text,
        },
        StartTrigger::Clamp(_) => text,
    }
}

/// `**Illumination**` block with one LED/duration/PAR entry per item.
pub fn illumination_text(items: &[Illumination<'_>], variables: &VariableArrays<'_>) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    let entries: Vec<String> = items
        .iter()
        .map(|item| {
            let mut lines = Vec::with_capacity(3);
            if let Some(name) = tables::led_name(&item.led) {
                lines.push(name.to_string());
            }
            lines.push(format!("*Duration (ms)*: {}", variables.resolve_display(item.duration)));
            lines.push(format!("*PAR*: {}", variables.resolve_display(item.par)));
            lines.join("\n")
        })
        .collect();
    Some(format!("**Illumination**\n{}", entries.join("\n")))
}

/// Label for the edge entering a step; `None` when the step has no trigger or pre-illumination.
pub fn edge_label(step: &Step<'_>, variables: &VariableArrays<'_>) -> Option<String> {
    let parts: Vec<String> = step
        .start()
        .map(start_text)
        .into_iter()
        .chain(illumination_text(&step.pre_illumination, variables))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content_of(v: serde_json::Value) -> String {
        let step = Step::new(&v);
        content(&step, "T")
    }

    #[test]
    fn title_only() {
        assert_eq!(content_of(json!({"pulses": [10]})), "**T**");
    }

    #[test]
    fn averages_and_repeats_guards() {
        assert_eq!(content_of(json!({"averages": 1})), "**T**");
        assert_eq!(
            content_of(json!({"averages": 3, "averages_delay": 5})),
            "**T**\n*Averages*: 3 (delay between: 5)"
        );
        assert_eq!(content_of(json!({"protocol_repeats": "#l1"})), "**T**");
        assert_eq!(
            content_of(json!({"protocol_repeats": 4, "protocols_delay": 0})),
            "**T**\n*Repeats*: 4"
        );
        assert_eq!(
            content_of(json!({"protocol_repeats": 4, "protocols_delay": 100})),
            "**T**\n*Repeats*: 4 (delay between: 100)"
        );
    }

    #[test]
    fn detector_singular_inline() {
        assert_eq!(
            content_of(json!({"detectors": [[1], [1]]})),
            "**T**\n*Detector:* 700nm - 1150nm"
        );
    }

    #[test]
    fn detector_plural_bullets() {
        assert_eq!(
            content_of(json!({"detectors": [[1, 3]]})),
            "**T**\n*Detectors:* \n• 700nm - 1150nm\n• 400nm - 700nm (BG18)"
        );
    }

    #[test]
    fn plural_counts_unmapped_ids() {
        assert_eq!(
            content_of(json!({"detectors": [[1, 2]]})),
            "**T**\n*Detectors:* \n• 700nm - 1150nm"
        );
        assert_eq!(content_of(json!({"pulsed_lights": [["@s0"]]})), "**T**\n*Pulsed LED:* ");
    }

    #[test]
    fn integer_and_numeric_string_ids_are_one_detector() {
        assert_eq!(
            content_of(json!({"detectors": [[1, "1"]]})),
            "**T**\n*Detector:* 700nm - 1150nm"
        );
        assert_eq!(
            content_of(json!({"pulsed_lights": [["2"], [2, 3]]})),
            "**T**\n*Pulsed LEDs:* \n• 655nm (Main)\n• 590nm (Main)"
        );
    }

    #[test]
    fn empty_channel_fields_have_no_line() {
        assert_eq!(content_of(json!({"detectors": []})), "**T**");
        assert_eq!(content_of(json!({"environmental": [[]], "averages": 2})), "**T**\n*Averages*: 2");
    }

    #[test]
    fn annotation_order() {
        let got = content_of(json!({
            "do_once": -1,
            "environmental": [["light_intensity"], ["previous_light_intensity"]],
            "nonpulsed_lights": [[2], [2]],
            "pulsed_lights": [[3, 1]],
            "detectors": [[1]],
            "protocol_repeats": 2,
            "averages": 2
        }));
        assert_eq!(
            got,
            "**T**\n*Averages*: 2\n*Repeats*: 2\n*Detector:* 700nm - 1150nm\n\
             *Pulsed LEDs:* \n• 530nm (Main)\n• 590nm (Main)\n\
             *Non Pulsed LED:* 655nm (Main)\n\
             *Sensors:* \n• PAR light sensor\n\
             Runs only during *last* repeat"
        );
    }

    #[test]
    fn start_texts() {
        let step = json!({"start_on_close": 1});
        assert_eq!(
            edge_label(&Step::new(&step), &VariableArrays::default()).as_deref(),
            Some("**Waits until**: Clamp closed")
        );
        let step = json!({"par_led_start_on_open_close": 2});
        assert_eq!(
            edge_label(&Step::new(&step), &VariableArrays::default()).as_deref(),
            Some("**Waits until**: Clamp opened and closed\n655nm (Main)")
        );
        let step = json!({"start_on_open": 0});
        assert_eq!(edge_label(&Step::new(&step), &VariableArrays::default()), None);
    }

    #[test]
    fn illumination_resolves_variables() {
        let arrays = vec![json!([100, 250])];
        let vars = VariableArrays::new(&arrays);
        let step = json!({
            "start_on_open": 1,
            "pre_illumination": [[2, "@n0:0", "@n0:1"], [99, 5, "@n0:7"]]
        });
        assert_eq!(
            edge_label(&Step::new(&step), &vars).as_deref(),
            Some(
                "**Waits until**: Clamp opened\n\n**Illumination**\n655nm (Main)\n\
                 *Duration (ms)*: 100\n*PAR*: 250\n*Duration (ms)*: 5\n*PAR*: @n0:7"
            )
        );
    }

    #[test]
    fn nouns() {
        assert_eq!(noun(1, "Sensor", "Sensors"), "Sensor");
        assert_eq!(noun(0, "Sensor", "Sensors"), "Sensors");
        assert_eq!(noun(2, "Sensor", "Sensors"), "Sensors");
    }
}
