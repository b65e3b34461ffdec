use std::f64::consts::SQRT_2;

/// Stuff+ league average
pub const STUFF_PLUS_MEAN: f64 = 100.0;

/// Stuff+ points per standard deviation
pub const STUFF_PLUS_POINTS_PER_SD: f64 = 10.0;

/// Training-time output scaler bundled with the model
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OutputScaler {
    pub mean: f64,
    pub scale: f64,
}

/// Convert a raw model prediction into a Stuff+ score
///
/// score = 100 + 10 * (raw - mean) / scale
#[inline]
pub fn stuff_plus_from_raw(raw_prediction: f64, scaler: &OutputScaler) -> f64 {
    let scaled = (raw_prediction - scaler.mean) / scaler.scale;
    STUFF_PLUS_MEAN + STUFF_PLUS_POINTS_PER_SD * scaled
}

/// Standard normal cumulative distribution function
#[inline]
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + libm::erf(z / SQRT_2))
}

/// Percentile (0-100, one decimal) of a Stuff+ score
pub fn percentile(stuff_plus: f64) -> f64 {
    let z = (stuff_plus - STUFF_PLUS_MEAN) / STUFF_PLUS_POINTS_PER_SD;
    let pct = (100.0 * normal_cdf(z)).clamp(0.0, 100.0);
    (pct * 10.0).round() / 10.0
}
