use crate::models::Handedness;

/// Spin axis used when a tilt reading is missing or unreadable (12:00 backspin)
pub const DEFAULT_SPIN_AXIS_DEG: f64 = 180.0;

/// Inches per foot
const INCHES_PER_FOOT: f64 = 12.0;

/// Degrees of rotation per clock-face minute (360° over 720 minutes)
const DEGREES_PER_CLOCK_MINUTE: f64 = 0.5;

/// How a handedness-dependent field is mirrored for left-handed pitchers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustMode {
    /// Sign flip, for lateral quantities (horizontal break, release x)
    Mirror,
    /// `360 - value`, for spin axis angles
    Reflect,
}

/// Parse a feet-inches token such as `6'2"` into decimal feet
///
/// Accepts straight or curly apostrophes and an optional trailing quote mark.
/// Any malformed or empty token returns `default`.
///
/// # Arguments
/// * `token` - Raw token as read off the device display
/// * `default` - Value returned when the token cannot be parsed
pub fn feet_inches_to_decimal_feet(token: &str, default: f64) -> f64 {
    let token = token.trim();
    if token.is_empty() {
        return default;
    }

    let Some((feet, inches)) = token.split_once(['\'', '’', '`']) else {
        return default;
    };

    let inches = inches.trim().trim_end_matches(['"', '”', '\'']).trim();

    let feet = match feet.trim().parse::<u32>() {
        Ok(f) => f as f64,
        Err(_) => return default,
    };
    let inches = match inches.parse::<f64>() {
        Ok(i) if i.is_finite() && i >= 0.0 => i,
        _ => return default,
    };

    feet + inches / INCHES_PER_FOOT
}

/// Convert a clock-face tilt (`"H:MM"`) into a spin axis in degrees
///
/// 12:00 maps to 180° and each clock minute is half a degree of rotation.
/// Missing or malformed input, including minutes past 59, yields
/// [`DEFAULT_SPIN_AXIS_DEG`].
pub fn tilt_to_degrees(token: &str) -> f64 {
    let Some((hour, minute)) = token.trim().split_once(':') else {
        return DEFAULT_SPIN_AXIS_DEG;
    };

    let (hour, minute) = match (hour.trim().parse::<u32>(), minute.trim().parse::<u32>()) {
        (Ok(h), Ok(m)) if m < 60 => (h, m),
        _ => return DEFAULT_SPIN_AXIS_DEG,
    };

    let total_minutes = ((hour % 12) * 60 + minute) as f64;
    let degrees = total_minutes * DEGREES_PER_CLOCK_MINUTE;

    (degrees + 180.0) % 360.0
}

/// Mirror a pitcher-relative value into the right-handed frame
///
/// Right-handed values pass through unchanged.
#[inline]
pub fn handedness_adjust(value: f64, handedness: Handedness, mode: AdjustMode) -> f64 {
    match (handedness, mode) {
        (Handedness::Right, _) => value,
        (Handedness::Left, AdjustMode::Mirror) => -value,
        (Handedness::Left, AdjustMode::Reflect) => 360.0 - value,
    }
}

/// Device horizontal break (inches) to model feet, with the axis flipped
#[inline]
pub fn horizontal_break_to_feet(inches: f64) -> f64 {
    -inches / INCHES_PER_FOOT
}

/// Device vertical break (inches) to model feet
#[inline]
pub fn vertical_break_to_feet(inches: f64) -> f64 {
    inches / INCHES_PER_FOOT
}

/// Device release x (feet) into the model frame
///
/// Only the sign flips here. The break conversions also divide by 12; this
/// asymmetry matches the frame the model was trained in.
#[inline]
pub fn release_x_to_model_frame(feet: f64) -> f64 {
    -feet
}

/// Convert a length in inches to feet
#[inline]
pub fn inches_to_feet(inches: f64) -> f64 {
    inches / INCHES_PER_FOOT
}
