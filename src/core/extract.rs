use regex::Regex;
use crate::models::{Extracted, RawOcrMetrics};

// Each pattern is anchored to a label of the device's fixed text overlay and
// captures the value that follows it. The gap between label and value may
// hold whitespace, line breaks and punctuation, but never letters or digits,
// so a missing value cannot steal the next label's number.

/// `PITCH SPEED 95.3`, thousands may be comma-grouped
const PITCH_SPEED_PATTERN: &str = r"(?i)PITCH\s+SPEED[^\w+\-]*(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)";

/// `I. VERT. MOV 18.2`; the leading `I` is often read as `L` or `1`
const VERTICAL_BREAK_PATTERN: &str = r"(?i)[IL1]\.\s*VERT\.?\s*MOV[^\w+\-]*([-+]?\d+(?:\.\d+)?)";

/// `HORZ. MOV -9.4`
const HORIZONTAL_BREAK_PATTERN: &str = r"(?i)HORZ\.?\s*MOV[^\w+\-]*([-+]?\d+(?:\.\d+)?)";

/// `RELEASE HEIGHT 6'2"`
const RELEASE_HEIGHT_PATTERN: &str = r#"(?i)RELEASE\s+HEIGHT[^\w]*(\d+\s*['’`]\s*\d{1,2}(?:\.\d+)?\s*["”]?)"#;

/// `RELEASE SIDE -21.5`
const RELEASE_SIDE_PATTERN: &str = r"(?i)RELEASE\s+SIDE[^\w+\-]*([-+]?\d+(?:\.\d+)?)";

/// `EXTENSION 6'5"`
const EXTENSION_PATTERN: &str = r#"(?i)EXTENSION[^\w]*(\d+\s*['’`]\s*\d{1,2}(?:\.\d+)?\s*["”]?)"#;

/// `TOTAL SPIN 2,450`
const TOTAL_SPIN_PATTERN: &str = r"(?i)TOTAL\s+SPIN[^\w]*(\d{1,3}(?:,\d{3})+|\d+)";

/// `MEASURED TILT 1:30`
const MEASURED_TILT_PATTERN: &str = r"(?i)MEASURED\s+TILT[^\w]*(\d{1,2}:\d{2})";

/// Compiled label patterns for the device's on-screen readout
///
/// Each field has its own extractor returning `None` when the label or its
/// value is not found, so label changes can be patched one field at a time.
#[derive(Debug, Clone)]
pub struct MetricPatterns {
    pitch_speed: Regex,
    vertical_break: Regex,
    horizontal_break: Regex,
    release_height: Regex,
    release_side: Regex,
    extension: Regex,
    total_spin: Regex,
    measured_tilt: Regex,
}

impl MetricPatterns {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pitch_speed: Regex::new(PITCH_SPEED_PATTERN)?,
            vertical_break: Regex::new(VERTICAL_BREAK_PATTERN)?,
            horizontal_break: Regex::new(HORIZONTAL_BREAK_PATTERN)?,
            release_height: Regex::new(RELEASE_HEIGHT_PATTERN)?,
            release_side: Regex::new(RELEASE_SIDE_PATTERN)?,
            extension: Regex::new(EXTENSION_PATTERN)?,
            total_spin: Regex::new(TOTAL_SPIN_PATTERN)?,
            measured_tilt: Regex::new(MEASURED_TILT_PATTERN)?,
        })
    }

    /// Pitch speed in mph
    pub fn pitch_speed(&self, text: &str) -> Option<f64> {
        first_capture(&self.pitch_speed, text).and_then(parse_grouped_number)
    }

    /// Induced vertical break in inches
    pub fn vertical_break(&self, text: &str) -> Option<f64> {
        first_capture(&self.vertical_break, text).and_then(|s| s.parse().ok())
    }

    /// Horizontal break in inches
    pub fn horizontal_break(&self, text: &str) -> Option<f64> {
        first_capture(&self.horizontal_break, text).and_then(|s| s.parse().ok())
    }

    /// Release height as a raw feet-inches token
    pub fn release_height(&self, text: &str) -> Option<String> {
        first_capture(&self.release_height, text).map(str::to_string)
    }

    /// Release side as a raw signed token, inches
    pub fn release_side(&self, text: &str) -> Option<String> {
        first_capture(&self.release_side, text).map(str::to_string)
    }

    /// Extension as a raw feet-inches token
    pub fn extension(&self, text: &str) -> Option<String> {
        first_capture(&self.extension, text).map(str::to_string)
    }

    /// Total spin in rpm
    pub fn total_spin(&self, text: &str) -> Option<f64> {
        first_capture(&self.total_spin, text).and_then(parse_grouped_number)
    }

    /// Clock-face tilt token, `H:MM`
    pub fn measured_tilt(&self, text: &str) -> Option<String> {
        first_capture(&self.measured_tilt, text).map(str::to_string)
    }

    /// Run every field extractor over a block of recognized text
    ///
    /// Never fails: unmatched numeric fields default to 0 and string fields
    /// to `None`, each flagged as unmatched.
    pub fn extract(&self, text: &str) -> RawOcrMetrics {
        RawOcrMetrics {
            velo: numeric(self.pitch_speed(text)),
            ivb: numeric(self.vertical_break(text)),
            hb: numeric(self.horizontal_break(text)),
            release_height: token(self.release_height(text)),
            release_side: token(self.release_side(text)),
            extension: token(self.extension(text)),
            spin: numeric(self.total_spin(text)),
            tilt: token(self.measured_tilt(text)),
        }
    }
}

fn first_capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
}

fn parse_grouped_number(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok()
}

fn numeric(value: Option<f64>) -> Extracted<f64> {
    match value {
        Some(v) => Extracted::matched(v),
        None => Extracted::defaulted(0.0),
    }
}

fn token(value: Option<String>) -> Extracted<Option<String>> {
    match value {
        Some(v) => Extracted::matched(Some(v)),
        None => Extracted::defaulted(None),
    }
}
