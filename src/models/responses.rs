use serde::{Deserialize, Serialize};
use crate::models::domain::{FastballReference, Handedness, PredictionResult, RawOcrMetrics};

/// Response for the direct prediction endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(rename = "stuffPlus")]
    pub stuff_plus: f64,
    pub percentile: f64,
}

impl From<PredictionResult> for PredictResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            stuff_plus: result.stuff_plus,
            percentile: result.percentile,
        }
    }
}

/// Response for the screenshot endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotPredictResponse {
    #[serde(rename = "stuffPlus")]
    pub stuff_plus: f64,
    pub percentile: f64,
    pub parsed_metrics: RawOcrMetrics,
    #[serde(rename = "pitchType")]
    pub pitch_type: String,
    pub handedness: Handedness,
    pub fb_reference: FastballReference,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_trees: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
