//! Benchmark for fitting and applying transform pipelines
//!
//! Run with: cargo bench --bench pipeline_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polars::prelude::*;
use rand::prelude::*;
use rand::SeedableRng;

use gridfit::pipeline::{
    ColumnGroup, Combiner, ImputeStrategy, Imputer, OneHotEncoder, Pipeline, ScaleMethod, Scaler,
    TransformChain,
};

/// Generate synthetic mixed-dtype data with controlled missingness
fn generate_test_dataframe(n_rows: usize, n_numeric: usize, n_categorical: usize, seed: u64) -> DataFrame {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let levels = ["alpha", "beta", "gamma", "delta"];

    let mut columns: Vec<Column> = Vec::with_capacity(n_numeric + n_categorical);

    for i in 0..n_numeric {
        let values: Vec<Option<f64>> = (0..n_rows)
            .map(|_| {
                // roughly 5% missing
                if rng.gen::<f64>() < 0.05 {
                    None
                } else {
                    Some(rng.gen::<f64>() * 100.0)
                }
            })
            .collect();
        columns.push(Column::new(format!("num_{}", i).into(), values));
    }

    for i in 0..n_categorical {
        let values: Vec<&str> = (0..n_rows)
            .map(|_| levels[rng.gen_range(0..levels.len())])
            .collect();
        columns.push(Column::new(format!("cat_{}", i).into(), values));
    }

    DataFrame::new(columns).expect("Failed to create DataFrame")
}

fn standard_pipeline(n_numeric: usize, n_categorical: usize) -> Pipeline {
    let numeric: Vec<String> = (0..n_numeric).map(|i| format!("num_{}", i)).collect();
    let categorical: Vec<String> = (0..n_categorical).map(|i| format!("cat_{}", i)).collect();

    Pipeline::new().stage(
        "features",
        Combiner::new()
            .branch(
                ColumnGroup::new("numeric", numeric),
                TransformChain::new()
                    .step("impute", Imputer::new(ImputeStrategy::Mean))
                    .step("scale", Scaler::new(ScaleMethod::Standard)),
            )
            .branch(
                ColumnGroup::new("categorical", categorical),
                TransformChain::new().step("encode", OneHotEncoder::new()),
            ),
    )
}

/// Benchmark pipeline fit for varying row counts
fn benchmark_fit_by_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_fit_by_rows");
    group.sample_size(30);

    let row_counts = [1_000, 10_000, 100_000];
    let n_numeric = 10;
    let n_categorical = 4;

    for n_rows in row_counts {
        let df = generate_test_dataframe(n_rows, n_numeric, n_categorical, 42);
        let pipeline = standard_pipeline(n_numeric, n_categorical);

        group.throughput(Throughput::Elements(n_rows as u64));
        group.bench_with_input(BenchmarkId::new("fit", n_rows), &df, |b, df| {
            b.iter(|| {
                let _ = pipeline.fit(black_box(df), None);
            });
        });
    }

    group.finish();
}

/// Benchmark fitted-pipeline transform against fit cost
fn benchmark_transform_by_columns(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_transform_by_columns");
    group.sample_size(30);

    let n_rows = 10_000;
    let column_counts = [5, 20, 50];

    for n_numeric in column_counts {
        let df = generate_test_dataframe(n_rows, n_numeric, 4, 42);
        let pipeline = standard_pipeline(n_numeric, 4);
        let fitted = pipeline.fit(&df, None).unwrap();

        group.throughput(Throughput::Elements((n_numeric + 4) as u64));
        group.bench_with_input(BenchmarkId::new("transform", n_numeric), &df, |b, df| {
            b.iter(|| {
                let _ = fitted.transform(black_box(df));
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_fit_by_rows, benchmark_transform_by_columns);
criterion_main!(benches);
