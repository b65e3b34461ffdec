// Service exports
pub mod model;
pub mod ocr;

pub use model::{ModelArtifact, ModelError, StuffModel, Tree, TreeEnsembleModel, TreeNode};
pub use ocr::{MetricsExtractor, OcrEngine, OcrError, TesseractEngine};
