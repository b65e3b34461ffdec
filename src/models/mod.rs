// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Handedness, PitchMeasurement, FastballReference, FeatureVector, PredictionResult, Extracted, RawOcrMetrics};
pub use requests::{PredictRequest, ScreenshotForm};
pub use responses::{PredictResponse, ScreenshotPredictResponse, HealthResponse, ErrorResponse};
