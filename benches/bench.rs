// Criterion benchmarks for Stuff+

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use stuff_plus::core::{build_feature_vector, percentile, MetricPatterns, OutputScaler, PredictionService};
use stuff_plus::models::{FastballReference, FeatureVector, Handedness, PitchMeasurement};
use stuff_plus::services::{ModelArtifact, Tree, TreeEnsembleModel, TreeNode};

const READOUT: &str = "PITCH SPEED\n94.7 mph\nL. VERT. MOV. 17.9 in\nHORZ. MOV. -8.4 in\n\
    RELEASE HEIGHT 6'1\"\nRELEASE SIDE -22.3\nEXTENSION 6'4\"\nTOTAL SPIN 2,410 rpm\n\
    MEASURED TILT 12:45";

fn create_pitch(id: usize) -> PitchMeasurement {
    PitchMeasurement {
        pitch_type: if id % 2 == 0 { "FF" } else { "SL" }.to_string(),
        release_speed: 85.0 + (id % 12) as f64,
        pfx_x: -10.0 + (id % 20) as f64,
        pfx_z: 2.0 + (id % 16) as f64,
        release_extension: 6.2,
        release_spin_rate: 2100.0 + (id % 500) as f64,
        spin_axis: (id * 7 % 360) as f64,
        release_pos_x: -2.0,
        release_pos_z: 5.8,
        handedness: if id % 3 == 0 { Handedness::Left } else { Handedness::Right },
    }
}

/// Full binary trees of the given depth splitting on each numeric feature in turn
fn create_model(tree_count: usize, depth: u32) -> TreeEnsembleModel {
    let trees = (0..tree_count)
        .map(|t| {
            let internal = (1usize << depth) - 1;
            let mut nodes = Vec::with_capacity(internal * 2 + 1);
            for i in 0..internal {
                nodes.push(TreeNode::Split {
                    feature: (t + i) % FeatureVector::NUMERIC_FEATURES,
                    threshold: 0.5,
                    left: 2 * i + 1,
                    right: 2 * i + 2,
                });
            }
            for leaf in 0..=internal {
                nodes.push(TreeNode::Leaf { value: (leaf as f64 - internal as f64 / 2.0) * 0.001 });
            }
            Tree { nodes }
        })
        .collect();

    TreeEnsembleModel::from_artifact(ModelArtifact {
        format: "stuff-plus-gbt".to_string(),
        version: 1,
        features: FeatureVector::FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        pitch_types: vec!["FF".to_string(), "SL".to_string()],
        base_score: 0.0,
        output_scaler: OutputScaler { mean: 0.0, scale: 0.1 },
        trees,
    })
    .expect("benchmark model is valid")
}

fn bench_feature_vector(c: &mut Criterion) {
    let pitch = create_pitch(7);
    let fastball = FastballReference { fb_velo: 95.0, fb_ivb: 17.0, fb_hmov: 9.0 };

    c.bench_function("build_feature_vector", |b| {
        b.iter(|| build_feature_vector(black_box(&pitch), black_box(&fastball)));
    });
}

fn bench_text_extraction(c: &mut Criterion) {
    let patterns = MetricPatterns::new().expect("patterns compile");

    c.bench_function("extract_metrics", |b| {
        b.iter(|| patterns.extract(black_box(READOUT)));
    });
}

fn bench_percentile(c: &mut Criterion) {
    c.bench_function("percentile", |b| {
        b.iter(|| percentile(black_box(112.3)));
    });
}

fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");
    let fastball = FastballReference { fb_velo: 95.0, fb_ivb: 17.0, fb_hmov: 9.0 };
    let features: Vec<FeatureVector> = (0..64)
        .map(|i| build_feature_vector(&create_pitch(i), &fastball))
        .collect();

    for tree_count in [100, 500, 1000].iter() {
        let service = PredictionService::new(Arc::new(create_model(*tree_count, 6)));

        group.bench_with_input(
            BenchmarkId::from_parameter(tree_count),
            tree_count,
            |b, _| {
                b.iter(|| {
                    for fv in &features {
                        black_box(service.predict(black_box(fv)).expect("prediction succeeds"));
                    }
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_feature_vector,
    bench_text_extraction,
    bench_percentile,
    bench_prediction
);
criterion_main!(benches);
