use crate::core::scoring::OutputScaler;
use crate::models::FeatureVector;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Artifact format tag
pub const MODEL_FORMAT: &str = "stuff-plus-gbt";

/// Artifact schema version understood by this build
pub const MODEL_VERSION: u32 = 1;

/// Errors raised while loading or evaluating the regression model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported model artifact {format} v{version}")]
    UnsupportedVersion { format: String, version: u32 },

    #[error("Feature manifest mismatch: expected {expected:?}, found {found:?}")]
    FeatureManifestMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("Unknown pitch type: {0}")]
    UnknownPitchType(String),

    #[error("Feature {name} is not finite: {value}")]
    NonFiniteFeature { name: &'static str, value: f64 },

    #[error("Model produced a non-finite prediction")]
    NonFiniteOutput,

    #[error("Malformed tree {0}: walk did not reach a leaf")]
    MalformedTree(usize),
}

impl ModelError {
    /// Whether this error belongs to artifact loading rather than inference
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            ModelError::Io(_)
                | ModelError::Parse(_)
                | ModelError::UnsupportedVersion { .. }
                | ModelError::FeatureManifestMismatch { .. }
                | ModelError::InvalidArtifact(_)
        )
    }
}

/// Regression model behind the prediction service
///
/// Implementations must be free of side effects so one instance can serve
/// concurrent requests.
pub trait StuffModel: Send + Sync {
    /// Raw single-row prediction
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError>;

    /// Scaler used to de-standardize raw predictions
    fn output_scaler(&self) -> OutputScaler;

    /// Number of trees, or 0 for models that are not ensembles
    fn tree_count(&self) -> usize {
        0
    }
}

/// A node of a regression tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Numeric split: `value < threshold` goes left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Categorical split on `pitch_type`: codes in `categories` go left
    Category {
        feature: usize,
        categories: Vec<usize>,
        left: usize,
        right: usize,
    },
    Leaf { value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

/// On-disk model artifact
///
/// ```json
/// {
///   "format": "stuff-plus-gbt",
///   "version": 1,
///   "features": ["release_speed", "pfx_z", ..., "pitch_type"],
///   "pitch_types": ["FF", "SI", "SL"],
///   "base_score": 0.0,
///   "output_scaler": { "mean": 0.0, "scale": 1.0 },
///   "trees": [ { "nodes": [ { "kind": "leaf", "value": 0.1 } ] } ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format: String,
    pub version: u32,
    pub features: Vec<String>,
    pub pitch_types: Vec<String>,
    pub base_score: f64,
    pub output_scaler: OutputScaler,
    pub trees: Vec<Tree>,
}

/// Gradient-boosted tree ensemble evaluated in-process
#[derive(Debug, Clone)]
pub struct TreeEnsembleModel {
    base_score: f64,
    scaler: OutputScaler,
    pitch_type_codes: HashMap<String, usize>,
    trees: Vec<Tree>,
}

impl TreeEnsembleModel {
    /// Load and validate an artifact from disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    /// Parse and validate an artifact from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_str(json)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        if artifact.format != MODEL_FORMAT || artifact.version != MODEL_VERSION {
            return Err(ModelError::UnsupportedVersion {
                format: artifact.format,
                version: artifact.version,
            });
        }

        let expected: Vec<String> = FeatureVector::FEATURE_NAMES
            .iter()
            .map(|s| s.to_string())
            .collect();
        if artifact.features != expected {
            return Err(ModelError::FeatureManifestMismatch {
                expected,
                found: artifact.features,
            });
        }

        if artifact.pitch_types.is_empty() {
            return Err(ModelError::InvalidArtifact("no pitch types".to_string()));
        }

        let scaler = artifact.output_scaler;
        if !scaler.mean.is_finite() || !scaler.scale.is_finite() || scaler.scale == 0.0 {
            return Err(ModelError::InvalidArtifact(format!(
                "output scaler must be finite with non-zero scale, got {:?}",
                scaler
            )));
        }
        if !artifact.base_score.is_finite() {
            return Err(ModelError::InvalidArtifact("base score is not finite".to_string()));
        }

        let mut pitch_type_codes = HashMap::with_capacity(artifact.pitch_types.len());
        for (code, name) in artifact.pitch_types.iter().enumerate() {
            if pitch_type_codes.insert(name.clone(), code).is_some() {
                return Err(ModelError::InvalidArtifact(format!(
                    "duplicate pitch type {}",
                    name
                )));
            }
        }

        for (idx, tree) in artifact.trees.iter().enumerate() {
            validate_tree(idx, tree, artifact.pitch_types.len())?;
        }

        Ok(Self {
            base_score: artifact.base_score,
            scaler,
            pitch_type_codes,
            trees: artifact.trees,
        })
    }

    fn encode(&self, features: &FeatureVector) -> Result<([f64; FeatureVector::NUMERIC_FEATURES], usize), ModelError> {
        let row = features.numeric_row();
        for (value, name) in row.iter().zip(FeatureVector::FEATURE_NAMES) {
            if !value.is_finite() {
                return Err(ModelError::NonFiniteFeature { name, value: *value });
            }
        }

        let code = self
            .pitch_type_codes
            .get(&features.pitch_type)
            .copied()
            .ok_or_else(|| ModelError::UnknownPitchType(features.pitch_type.clone()))?;

        Ok((row, code))
    }
}

impl StuffModel for TreeEnsembleModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        let (row, code) = self.encode(features)?;

        let mut total = self.base_score;
        for (idx, tree) in self.trees.iter().enumerate() {
            total += walk_tree(idx, tree, &row, code)?;
        }

        Ok(total)
    }

    fn output_scaler(&self) -> OutputScaler {
        self.scaler
    }

    fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

fn validate_tree(idx: usize, tree: &Tree, pitch_type_count: usize) -> Result<(), ModelError> {
    let invalid = |msg: String| ModelError::InvalidArtifact(format!("tree {}: {}", idx, msg));

    if tree.nodes.is_empty() {
        return Err(invalid("no nodes".to_string()));
    }

    let n = tree.nodes.len();
    for (node_idx, node) in tree.nodes.iter().enumerate() {
        match node {
            TreeNode::Split { feature, threshold, left, right } => {
                if *feature >= FeatureVector::NUMERIC_FEATURES {
                    return Err(invalid(format!("node {} splits on non-numeric feature {}", node_idx, feature)));
                }
                if !threshold.is_finite() {
                    return Err(invalid(format!("node {} has non-finite threshold", node_idx)));
                }
                if *left >= n || *right >= n {
                    return Err(invalid(format!("node {} child out of range", node_idx)));
                }
            }
            TreeNode::Category { feature, categories, left, right } => {
                if *feature != FeatureVector::NUMERIC_FEATURES {
                    return Err(invalid(format!("node {} category split on numeric feature {}", node_idx, feature)));
                }
                if categories.iter().any(|c| *c >= pitch_type_count) {
                    return Err(invalid(format!("node {} references unknown pitch type code", node_idx)));
                }
                if *left >= n || *right >= n {
                    return Err(invalid(format!("node {} child out of range", node_idx)));
                }
            }
            TreeNode::Leaf { value } => {
                if !value.is_finite() {
                    return Err(invalid(format!("node {} has non-finite leaf", node_idx)));
                }
            }
        }
    }

    Ok(())
}

fn walk_tree(
    idx: usize,
    tree: &Tree,
    row: &[f64; FeatureVector::NUMERIC_FEATURES],
    pitch_type_code: usize,
) -> Result<f64, ModelError> {
    let mut node_idx = 0;

    // A well-formed tree reaches a leaf in fewer steps than it has nodes
    for _ in 0..tree.nodes.len() {
        match &tree.nodes[node_idx] {
            TreeNode::Leaf { value } => return Ok(*value),
            TreeNode::Split { feature, threshold, left, right } => {
                node_idx = if row[*feature] < *threshold { *left } else { *right };
            }
            TreeNode::Category { categories, left, right, .. } => {
                node_idx = if categories.contains(&pitch_type_code) { *left } else { *right };
            }
        }
    }

    Err(ModelError::MalformedTree(idx))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> ModelArtifact {
        ModelArtifact {
            format: MODEL_FORMAT.to_string(),
            version: MODEL_VERSION,
            features: FeatureVector::FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            pitch_types: vec!["FF".to_string(), "SL".to_string(), "CH".to_string()],
            base_score: 0.5,
            output_scaler: OutputScaler { mean: 0.5, scale: 0.25 },
            trees: vec![
                // release_speed < 93 → -0.1 else 0.2
                Tree {
                    nodes: vec![
                        TreeNode::Split { feature: 0, threshold: 93.0, left: 1, right: 2 },
                        TreeNode::Leaf { value: -0.1 },
                        TreeNode::Leaf { value: 0.2 },
                    ],
                },
                // SL → 0.05, others → 0.0
                Tree {
                    nodes: vec![
                        TreeNode::Category { feature: 11, categories: vec![1], left: 1, right: 2 },
                        TreeNode::Leaf { value: 0.05 },
                        TreeNode::Leaf { value: 0.0 },
                    ],
                },
            ],
        }
    }

    fn features(pitch_type: &str, release_speed: f64) -> FeatureVector {
        FeatureVector {
            release_speed,
            pfx_z: 1.2,
            adj_hmov: -0.6,
            release_spin_rate: 2300.0,
            adj_spin_axis: 210.0,
            release_extension: 6.3,
            release_pos_z: 5.8,
            adj_release_x: 1.9,
            velo_diff: 0.0,
            ivb_diff: 0.0,
            hmov_diff: 0.0,
            pitch_type: pitch_type.to_string(),
        }
    }

    #[test]
    fn test_tree_evaluation() {
        let model = TreeEnsembleModel::from_artifact(artifact()).unwrap();
        assert_eq!(model.tree_count(), 2);

        let fast = model.predict(&features("FF", 96.0)).unwrap();
        assert!((fast - 0.7).abs() < 1e-12);

        let slow_slider = model.predict(&features("SL", 85.0)).unwrap();
        assert!((slow_slider - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_json_round_trip_load() {
        let json = serde_json::to_string(&artifact()).unwrap();
        let model = TreeEnsembleModel::from_json(&json).unwrap();
        assert_eq!(model.output_scaler(), OutputScaler { mean: 0.5, scale: 0.25 });
    }

    #[test]
    fn test_unknown_pitch_type() {
        let model = TreeEnsembleModel::from_artifact(artifact()).unwrap();
        let err = model.predict(&features("KN", 70.0)).unwrap_err();
        assert!(matches!(err, ModelError::UnknownPitchType(ref p) if p == "KN"));
        assert!(!err.is_load_error());
    }

    #[test]
    fn test_non_finite_feature() {
        let model = TreeEnsembleModel::from_artifact(artifact()).unwrap();
        let mut fv = features("FF", 95.0);
        fv.ivb_diff = f64::NAN;
        let err = model.predict(&fv).unwrap_err();
        assert!(matches!(err, ModelError::NonFiniteFeature { name: "ivb_diff", .. }));
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut a = artifact();
        a.version = 2;
        let err = TreeEnsembleModel::from_artifact(a).unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedVersion { version: 2, .. }));
        assert!(err.is_load_error());
    }

    #[test]
    fn test_rejects_feature_order() {
        let mut a = artifact();
        a.features.swap(0, 1);
        assert!(matches!(
            TreeEnsembleModel::from_artifact(a),
            Err(ModelError::FeatureManifestMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_scale() {
        let mut a = artifact();
        a.output_scaler.scale = 0.0;
        assert!(matches!(
            TreeEnsembleModel::from_artifact(a),
            Err(ModelError::InvalidArtifact(_))
        ));
    }

    #[test]
    fn test_rejects_bad_children() {
        let mut a = artifact();
        a.trees[0].nodes[0] = TreeNode::Split { feature: 0, threshold: 90.0, left: 1, right: 7 };
        assert!(matches!(
            TreeEnsembleModel::from_artifact(a),
            Err(ModelError::InvalidArtifact(_))
        ));

        let mut a = artifact();
        a.trees[1].nodes[0] = TreeNode::Split { feature: 11, threshold: 1.0, left: 1, right: 2 };
        assert!(TreeEnsembleModel::from_artifact(a).is_err());
    }

    #[test]
    fn test_cycle_detected() {
        let mut a = artifact();
        a.trees[0].nodes[0] = TreeNode::Split { feature: 0, threshold: 90.0, left: 0, right: 0 };
        let model = TreeEnsembleModel::from_artifact(a).unwrap();
        let err = model.predict(&features("FF", 95.0)).unwrap_err();
        assert!(matches!(err, ModelError::MalformedTree(0)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = TreeEnsembleModel::load("/nonexistent/model.json").unwrap_err();
        assert!(matches!(err, ModelError::Io(_)));
    }
}
