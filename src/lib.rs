//! Stuff+ - pitch quality scoring service
//!
//! Turns tracking-device pitch readings, typed in directly or read off a
//! screenshot with OCR, into the feature vector of a pretrained regression
//! model and reports the resulting Stuff+ score and percentile.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{build_feature_vector, measurement_from_metrics, percentile, MetricPatterns, PredictionService};
pub use crate::models::{FeatureVector, FastballReference, Handedness, PitchMeasurement, PredictionResult, RawOcrMetrics};
pub use crate::services::{MetricsExtractor, ModelError, OcrError, StuffModel, TesseractEngine, TreeEnsembleModel};
