// Core algorithm exports
pub mod extract;
pub mod features;
pub mod prediction;
pub mod scoring;
pub mod units;

pub use extract::MetricPatterns;
pub use features::{build_feature_vector, measurement_from_metrics};
pub use prediction::PredictionService;
pub use scoring::{normal_cdf, percentile, stuff_plus_from_raw, OutputScaler};
pub use units::{feet_inches_to_decimal_feet, handedness_adjust, tilt_to_degrees, AdjustMode};
