use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{FastballReference, Handedness, PitchMeasurement, RawOcrMetrics};

/// Request to score a pitch from structured device readings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PredictRequest {
    #[validate(length(min = 1, max = 8))]
    #[serde(alias = "pitch_type", rename = "pitchType")]
    pub pitch_type: String,
    pub release_speed: f64,
    #[serde(alias = "p_throws")]
    pub handedness: Handedness,
    pub pfx_x: f64,
    pub pfx_z: f64,
    pub release_extension: f64,
    pub release_spin_rate: f64,
    pub spin_axis: f64,
    pub release_pos_x: f64,
    pub release_pos_z: f64,
    pub fb_velo: f64,
    pub fb_ivb: f64,
    pub fb_hmov: f64,
}

impl PredictRequest {
    pub fn measurement(&self) -> PitchMeasurement {
        PitchMeasurement {
            pitch_type: self.pitch_type.clone(),
            release_speed: self.release_speed,
            pfx_x: self.pfx_x,
            pfx_z: self.pfx_z,
            release_extension: self.release_extension,
            release_spin_rate: self.release_spin_rate,
            spin_axis: self.spin_axis,
            release_pos_x: self.release_pos_x,
            release_pos_z: self.release_pos_z,
            handedness: self.handedness,
        }
    }

    pub fn fastball(&self) -> FastballReference {
        FastballReference {
            fb_velo: self.fb_velo,
            fb_ivb: self.fb_ivb,
            fb_hmov: self.fb_hmov,
        }
    }
}

/// Fields of the screenshot upload form, as received
///
/// Text fields are kept raw so fastball values can fall back per field.
#[derive(Debug, Clone, Default)]
pub struct ScreenshotForm {
    pub image: Option<Vec<u8>>,
    pub pitch_type: Option<String>,
    pub handedness: Option<String>,
    pub fb_velo: Option<String>,
    pub fb_ivb: Option<String>,
    pub fb_hmov: Option<String>,
}

impl ScreenshotForm {
    /// Resolve the fastball reference, falling back per field to the
    /// pitch's own extracted value when absent or unparseable
    pub fn resolve_fastball(&self, metrics: &RawOcrMetrics) -> FastballReference {
        let own = metrics.as_fastball_reference();
        FastballReference {
            fb_velo: parse_optional(self.fb_velo.as_deref()).unwrap_or(own.fb_velo),
            fb_ivb: parse_optional(self.fb_ivb.as_deref()).unwrap_or(own.fb_ivb),
            fb_hmov: parse_optional(self.fb_hmov.as_deref()).unwrap_or(own.fb_hmov),
        }
    }
}

/// Parse an optional fastball field; the mobile client sends `"0"` for a blank one
fn parse_optional(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v != 0.0)
}
