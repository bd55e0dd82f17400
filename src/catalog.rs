//! Bundled reference protocols.

use serde_json::Value;

/// A protocol document shipped with the crate.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    /// Short name used on the command line.
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// JSON text of the protocol (a list of groups).
    pub source: &'static str,
}

impl CatalogEntry {
    pub fn protocol(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(self.source)
    }
}

pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        name: "par",
        title: "Photosynthetically Active Radiation (PAR)",
        description: "Light intensity (400-700nm) from the PAR sensor, with raw red, green and blue channels.",
        source: include_str!("../protocols/par.json"),
    },
    CatalogEntry {
        name: "phi2",
        title: "Photosystem II efficiency (Phi2)",
        description: "Fluorescence trace under actinic light with a saturating pulse; yields Phi2, Fs, Fm' and LEF.",
        source: include_str!("../protocols/phi2.json"),
    },
    CatalogEntry {
        name: "spad",
        title: "Relative Chlorophyll Content (SPAD)",
        description: "Absorbance at 650nm and 940nm, reported as a SPAD value.",
        source: include_str!("../protocols/spad.json"),
    },
    CatalogEntry {
        name: "electronic_offsets",
        title: "Electronic Offsets Calibration",
        description: "Measures detector offsets for each pulsed light using the calibration cards.",
        source: include_str!("../protocols/calibrations/electronic_offsets.json"),
    },
    CatalogEntry {
        name: "leaf_thickness_gauge",
        title: "Leaf Thickness Gauge Calibration",
        description: "Fits the Hall effect sensor response to strips of known thickness and records the open and closed clamp positions.",
        source: include_str!("../protocols/calibrations/leaf_thickness_gauge.json"),
    },
    CatalogEntry {
        name: "main_body_leds",
        title: "Main Body LEDs Calibration",
        description: "Matches main body LED output to PAR levels; requires a CaliQ.",
        source: include_str!("../protocols/calibrations/main_body_leds.json"),
    },
    CatalogEntry {
        name: "par_sensor",
        title: "PAR Sensor Calibration",
        description: "Adjusts the PAR sensor against a known light level and darkness; requires a CaliQ.",
        source: include_str!("../protocols/calibrations/par_sensor.json"),
    },
    CatalogEntry {
        name: "relative_chlorophyll_spad",
        title: "Relative Chlorophyll (SPAD) Calibration",
        description: "Calibrates the SPAD measurement with a set of calibration cards.",
        source: include_str!("../protocols/calibrations/relative_chlorophyll_spad.json"),
    },
    CatalogEntry {
        name: "reset_to_default_settings",
        title: "Reset to Default Settings",
        description: "Restores the default device settings and removes all calibrations.",
        source: include_str!("../protocols/calibrations/reset_to_default_settings.json"),
    },
    CatalogEntry {
        name: "leaf_clamp_leds",
        title: "Leaf Clamp LEDs Calibration",
        description: "Matches clamp LED output to PAR levels; requires a CaliQ.",
        source: include_str!("../protocols/calibrations/leaf_clamp_leds.json"),
    },
    CatalogEntry {
        name: "ir_led",
        title: "IR LED Calibration",
        description: "Adjusts the output of the non-PAR LEDs; requires a CaliQ.",
        source: include_str!("../protocols/calibrations/ir_led.json"),
    },
];

pub fn find(name: &str) -> Option<&'static CatalogEntry> {
    CATALOG.iter().find(|entry| entry.name == name)
}
