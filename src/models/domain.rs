use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pitcher throwing arm
///
/// Serialized as `"L"`/`"R"`; parsing accepts either case on every path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Handedness {
    #[serde(rename = "L")]
    Left,
    #[serde(rename = "R")]
    Right,
}

impl Handedness {
    pub fn as_str(&self) -> &'static str {
        match self {
            Handedness::Left => "L",
            Handedness::Right => "R",
        }
    }
}

impl fmt::Display for Handedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Handedness {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "L" | "l" => Ok(Handedness::Left),
            "R" | "r" => Ok(Handedness::Right),
            other => Err(format!("handedness must be \"L\" or \"R\", got {:?}", other)),
        }
    }
}

impl<'de> Deserialize<'de> for Handedness {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single pitch as reported by the tracking device
///
/// Breaks are in inches with the device's sign convention; release
/// position and extension are in feet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitchMeasurement {
    pub pitch_type: String,
    pub release_speed: f64,
    pub pfx_x: f64,
    pub pfx_z: f64,
    pub release_extension: f64,
    pub release_spin_rate: f64,
    pub spin_axis: f64,
    pub release_pos_x: f64,
    pub release_pos_z: f64,
    pub handedness: Handedness,
}

/// The pitcher's own four-seam fastball, in device units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FastballReference {
    pub fb_velo: f64,
    pub fb_ivb: f64,
    pub fb_hmov: f64,
}

/// Model input row, in the order the regression model was trained on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub release_speed: f64,
    pub pfx_z: f64,
    pub adj_hmov: f64,
    pub release_spin_rate: f64,
    pub adj_spin_axis: f64,
    pub release_extension: f64,
    pub release_pos_z: f64,
    pub adj_release_x: f64,
    pub velo_diff: f64,
    pub ivb_diff: f64,
    pub hmov_diff: f64,
    pub pitch_type: String,
}

impl FeatureVector {
    /// Feature names in model order; `pitch_type` is the only categorical
    pub const FEATURE_NAMES: [&'static str; 12] = [
        "release_speed",
        "pfx_z",
        "adj_hmov",
        "release_spin_rate",
        "adj_spin_axis",
        "release_extension",
        "release_pos_z",
        "adj_release_x",
        "velo_diff",
        "ivb_diff",
        "hmov_diff",
        "pitch_type",
    ];

    /// Number of numeric features preceding `pitch_type`
    pub const NUMERIC_FEATURES: usize = 11;

    /// Numeric features in model order
    pub fn numeric_row(&self) -> [f64; Self::NUMERIC_FEATURES] {
        [
            self.release_speed,
            self.pfx_z,
            self.adj_hmov,
            self.release_spin_rate,
            self.adj_spin_axis,
            self.release_extension,
            self.release_pos_z,
            self.adj_release_x,
            self.velo_diff,
            self.ivb_diff,
            self.hmov_diff,
        ]
    }
}

/// Output of a single prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Unscaled regression output
    pub raw_prediction: f64,
    /// Standardized score, mean 100
    pub stuff_plus: f64,
    /// 0-100, one decimal
    pub percentile: f64,
}

/// A single OCR field, tagged with whether its label was found
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extracted<T> {
    pub value: T,
    pub matched: bool,
}

impl<T> Extracted<T> {
    pub fn matched(value: T) -> Self {
        Self { value, matched: true }
    }

    pub fn defaulted(value: T) -> Self {
        Self { value, matched: false }
    }
}

/// Metrics read off a device screenshot, before unit conversion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOcrMetrics {
    /// Pitch speed, mph
    pub velo: Extracted<f64>,
    /// Induced vertical break, inches
    pub ivb: Extracted<f64>,
    /// Horizontal break, inches
    pub hb: Extracted<f64>,
    /// Feet-inches token, e.g. `6'2"`
    pub release_height: Extracted<Option<String>>,
    /// Signed decimal token, inches
    pub release_side: Extracted<Option<String>>,
    /// Feet-inches token
    pub extension: Extracted<Option<String>>,
    /// Total spin, rpm
    pub spin: Extracted<f64>,
    /// Clock tilt token, e.g. `1:30`
    pub tilt: Extracted<Option<String>>,
}

impl RawOcrMetrics {
    /// Names of fields whose label was not found
    pub fn defaulted_fields(&self) -> Vec<&'static str> {
        [
            ("velo", self.velo.matched),
            ("ivb", self.ivb.matched),
            ("hb", self.hb.matched),
            ("release_height", self.release_height.matched),
            ("release_side", self.release_side.matched),
            ("extension", self.extension.matched),
            ("spin", self.spin.matched),
            ("tilt", self.tilt.matched),
        ]
        .into_iter()
        .filter(|(_, matched)| !matched)
        .map(|(name, _)| name)
        .collect()
    }

    /// The pitch's own velocity and movement, used when no fastball is given
    pub fn as_fastball_reference(&self) -> FastballReference {
        FastballReference {
            fb_velo: self.velo.value,
            fb_ivb: self.ivb.value,
            fb_hmov: self.hb.value,
        }
    }
}
