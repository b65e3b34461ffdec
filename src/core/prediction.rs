use std::sync::Arc;
use crate::core::scoring::{percentile, stuff_plus_from_raw};
use crate::models::{FeatureVector, PredictionResult};
use crate::services::model::{ModelError, StuffModel};

/// Turns feature vectors into Stuff+ scores using a shared model
///
/// Cloning is cheap; every clone shares the same read-only model.
#[derive(Clone)]
pub struct PredictionService {
    model: Arc<dyn StuffModel>,
}

impl PredictionService {
    pub fn new(model: Arc<dyn StuffModel>) -> Self {
        Self { model }
    }

    /// Score a single pitch
    ///
    /// Model failures are returned unchanged; there is no retry and no
    /// fallback score.
    pub fn predict(&self, features: &FeatureVector) -> Result<PredictionResult, ModelError> {
        let raw_prediction = self.model.predict(features)?;
        if !raw_prediction.is_finite() {
            return Err(ModelError::NonFiniteOutput);
        }

        let stuff_plus = stuff_plus_from_raw(raw_prediction, &self.model.output_scaler());

        Ok(PredictionResult {
            raw_prediction,
            stuff_plus,
            percentile: percentile(stuff_plus),
        })
    }

    pub fn model_trees(&self) -> usize {
        self.model.tree_count()
    }
}

impl std::fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredictionService")
            .field("model_trees", &self.model.tree_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scoring::OutputScaler;

    /// Returns `release_speed / 100`, scaled around 0.9
    struct SpeedModel;

    impl StuffModel for SpeedModel {
        fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
            if features.pitch_type == "XX" {
                return Err(ModelError::UnknownPitchType(features.pitch_type.clone()));
            }
            Ok(features.release_speed / 100.0)
        }

        fn output_scaler(&self) -> OutputScaler {
            OutputScaler { mean: 0.9, scale: 0.05 }
        }
    }

    fn features(pitch_type: &str, release_speed: f64) -> FeatureVector {
        FeatureVector {
            release_speed,
            pfx_z: 1.0,
            adj_hmov: 0.5,
            release_spin_rate: 2200.0,
            adj_spin_axis: 200.0,
            release_extension: 6.0,
            release_pos_z: 6.0,
            adj_release_x: 2.0,
            velo_diff: 0.0,
            ivb_diff: 0.0,
            hmov_diff: 0.0,
            pitch_type: pitch_type.to_string(),
        }
    }

    #[test]
    fn test_average_pitch() {
        let service = PredictionService::new(Arc::new(SpeedModel));
        let result = service.predict(&features("FF", 90.0)).unwrap();
        assert!((result.stuff_plus - 100.0).abs() < 1e-9);
        assert_eq!(result.percentile, 50.0);
    }

    #[test]
    fn test_one_sd_above() {
        let service = PredictionService::new(Arc::new(SpeedModel));
        let result = service.predict(&features("FF", 95.0)).unwrap();
        assert!((result.stuff_plus - 110.0).abs() < 1e-9);
        assert_eq!(result.percentile, 84.1);
    }

    #[test]
    fn test_model_error_propagates() {
        let service = PredictionService::new(Arc::new(SpeedModel));
        let err = service.predict(&features("XX", 95.0)).unwrap_err();
        assert!(matches!(err, ModelError::UnknownPitchType(_)));
    }

    #[test]
    fn test_non_finite_output() {
        let service = PredictionService::new(Arc::new(SpeedModel));
        let err = service.predict(&features("FF", f64::INFINITY)).unwrap_err();
        assert!(matches!(err, ModelError::NonFiniteOutput));
    }
}
