use crate::models::{FastballReference, FeatureVector, Handedness, PitchMeasurement, RawOcrMetrics};
use crate::core::units::{
    feet_inches_to_decimal_feet, handedness_adjust, horizontal_break_to_feet, inches_to_feet,
    release_x_to_model_frame, tilt_to_degrees, vertical_break_to_feet, AdjustMode,
};

/// Release height used when the screenshot token is unreadable, feet
pub const DEFAULT_RELEASE_HEIGHT_FT: f64 = 6.0;

/// Extension used when the screenshot token is unreadable, feet
pub const DEFAULT_EXTENSION_FT: f64 = 6.0;

/// Build the model feature vector from device readings
///
/// This is the single place where device units are converted into the
/// model frame and left-handed pitches are mirrored:
/// 1. Breaks (pitch and fastball) to feet, horizontal axis flipped
/// 2. Release x frame flip (no unit change)
/// 3. Differentials against the fastball, in converted units
/// 4. Handedness mirroring of horizontal break, release x and spin axis
///
/// Pure function; no validation, out-of-range values flow through.
pub fn build_feature_vector(pitch: &PitchMeasurement, fastball: &FastballReference) -> FeatureVector {
    let pfx_x = horizontal_break_to_feet(pitch.pfx_x);
    let pfx_z = vertical_break_to_feet(pitch.pfx_z);
    let release_pos_x = release_x_to_model_frame(pitch.release_pos_x);

    let fb_ivb = vertical_break_to_feet(fastball.fb_ivb);
    let fb_hmov = horizontal_break_to_feet(fastball.fb_hmov);

    let hand = pitch.handedness;

    FeatureVector {
        release_speed: pitch.release_speed,
        pfx_z,
        adj_hmov: handedness_adjust(pfx_x, hand, AdjustMode::Mirror),
        release_spin_rate: pitch.release_spin_rate,
        adj_spin_axis: handedness_adjust(pitch.spin_axis, hand, AdjustMode::Reflect),
        release_extension: pitch.release_extension,
        release_pos_z: pitch.release_pos_z,
        adj_release_x: handedness_adjust(release_pos_x, hand, AdjustMode::Mirror),
        velo_diff: pitch.release_speed - fastball.fb_velo,
        ivb_diff: pfx_z - fb_ivb,
        hmov_diff: pfx_x - fb_hmov,
        pitch_type: pitch.pitch_type.clone(),
    }
}

/// Assemble a device-unit measurement from screenshot metrics
///
/// Tokens that fail to parse fall back silently: release height and
/// extension to their defaults, release side to 0, tilt to 180°.
pub fn measurement_from_metrics(
    metrics: &RawOcrMetrics,
    pitch_type: &str,
    handedness: Handedness,
) -> PitchMeasurement {
    let release_side_in = metrics
        .release_side
        .value
        .as_deref()
        .and_then(|s| s.trim().parse::<f64>().ok())
        .unwrap_or(0.0);

    PitchMeasurement {
        pitch_type: pitch_type.to_string(),
        release_speed: metrics.velo.value,
        pfx_x: metrics.hb.value,
        pfx_z: metrics.ivb.value,
        release_extension: feet_inches_to_decimal_feet(
            metrics.extension.value.as_deref().unwrap_or(""),
            DEFAULT_EXTENSION_FT,
        ),
        release_spin_rate: metrics.spin.value,
        spin_axis: tilt_to_degrees(metrics.tilt.value.as_deref().unwrap_or("")),
        release_pos_x: inches_to_feet(release_side_in),
        release_pos_z: feet_inches_to_decimal_feet(
            metrics.release_height.value.as_deref().unwrap_or(""),
            DEFAULT_RELEASE_HEIGHT_FT,
        ),
        handedness,
    }
}
