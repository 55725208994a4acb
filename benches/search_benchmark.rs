//! Benchmark for cross-validated grid search throughput
//!
//! Run with: cargo bench --bench search_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polars::prelude::*;
use rand::prelude::*;
use rand::SeedableRng;

use gridfit::model::Estimator;
use gridfit::pipeline::{
    ColumnGroup, Combiner, ImputeStrategy, Imputer, Pipeline, ScaleMethod, Scaler, TransformChain,
};
use gridfit::search::{GridSearch, KFold, ParamGrid, ParamPath, ParamValue};

/// Generate a labeled numeric dataset with a learnable decision boundary
fn generate_labeled_dataframe(n_rows: usize, n_features: usize, seed: u64) -> (DataFrame, Column) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let mut columns: Vec<Column> = Vec::with_capacity(n_features);
    let mut signal: Vec<f64> = vec![0.0; n_rows];

    for i in 0..n_features {
        let values: Vec<Option<f64>> = (0..n_rows)
            .map(|row| {
                let v: f64 = rng.gen_range(-1.0..1.0);
                if i == 0 {
                    signal[row] = v;
                }
                if rng.gen::<f64>() < 0.05 {
                    None
                } else {
                    Some(v)
                }
            })
            .collect();
        columns.push(Column::new(format!("feature_{}", i).into(), values));
    }

    let target: Vec<i32> = signal.iter().map(|v| i32::from(*v > 0.0)).collect();
    (
        DataFrame::new(columns).expect("Failed to create DataFrame"),
        Column::new("target".into(), target),
    )
}

fn numeric_pipeline(n_features: usize) -> Pipeline {
    let features: Vec<String> = (0..n_features).map(|i| format!("feature_{}", i)).collect();
    Pipeline::new()
        .stage(
            "features",
            Combiner::new().branch(
                ColumnGroup::new("numeric", features),
                TransformChain::new()
                    .step("impute", Imputer::new(ImputeStrategy::Mean))
                    .step("scale", Scaler::new(ScaleMethod::Standard)),
            ),
        )
        .predict_with("clf", Estimator::logistic())
}

fn strategy_grid() -> ParamGrid {
    ParamGrid::new()
        .add(
            ParamPath::branch_step("features", "numeric", "impute"),
            vec![
                ParamValue::Strategy(ImputeStrategy::Mean),
                ParamValue::Strategy(ImputeStrategy::Median),
            ],
        )
        .add(
            ParamPath::branch_step("features", "numeric", "impute"),
            vec![
                ParamValue::AddIndicator(false),
                ParamValue::AddIndicator(true),
            ],
        )
}

/// Benchmark a full grid search for varying row counts
fn benchmark_search_by_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_search_by_rows");
    group.sample_size(10);

    let row_counts = [500, 2_000, 10_000];
    let n_features = 8;

    for n_rows in row_counts {
        let (df, target) = generate_labeled_dataframe(n_rows, n_features, 42);
        let pipeline = numeric_pipeline(n_features);
        let grid = strategy_grid();
        let search = GridSearch::new(5).with_seed(42);

        group.throughput(Throughput::Elements(search.planned_fits(&grid) as u64));
        group.bench_with_input(
            BenchmarkId::new("search", n_rows),
            &(&df, &target),
            |b, (df, target)| {
                b.iter(|| {
                    let _ = search.run(
                        black_box(&pipeline),
                        black_box(&grid),
                        black_box(df),
                        black_box(target),
                        None,
                    );
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the fold-splitting overhead alone
fn benchmark_kfold_split(c: &mut Criterion) {
    let mut group = c.benchmark_group("kfold_split");
    group.sample_size(50);

    for n_rows in [10_000usize, 1_000_000] {
        group.bench_with_input(BenchmarkId::new("split", n_rows), &n_rows, |b, &n| {
            let kfold = KFold::new(10).with_seed(42);
            b.iter(|| {
                let _ = kfold.split(black_box(n));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_search_by_rows, benchmark_kfold_split);
criterion_main!(benches);
