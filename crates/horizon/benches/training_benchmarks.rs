//! Boosting benchmarks for both backends.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use horizon::schema::{Column, ColumnRole, ColumnValues, Frame, TargetClass};
use horizon::training::{Hyperparameters, TrainingOrchestrator};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A canonical table whose class depends noisily on the first two features.
fn generate_frame(rows: usize, features: usize) -> (Frame, Vec<String>) {
    let mut rng = StdRng::seed_from_u64(42);
    let mut frame = Frame::with_rows(rows);
    let mut names = Vec::with_capacity(features);
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(rows); features];

    let mut targets = Vec::with_capacity(rows);
    for _ in 0..rows {
        for column in columns.iter_mut() {
            column.push(rng.gen_range(-1.0..1.0));
        }
        let score = columns[0].last().copied().unwrap_or(0.0)
            + 0.5 * columns[1].last().copied().unwrap_or(0.0)
            + rng.gen_range(-0.3..0.3);
        targets.push(if score < -0.4 {
            TargetClass::FalsePositive
        } else if score < 0.4 {
            TargetClass::Candidate
        } else {
            TargetClass::Confirmed
        });
    }

    for (i, values) in columns.into_iter().enumerate() {
        let name = format!("f{}", i);
        frame.push(Column::new(name.clone(), ColumnRole::Feature, ColumnValues::Numeric(values)));
        names.push(name);
    }
    frame.push(Column::new("target", ColumnRole::Target, ColumnValues::Target(targets)));
    (frame, names)
}

fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("train");
    group.sample_size(10);

    let hyper = Hyperparameters {
        n_estimators: Some(50),
        ..Default::default()
    };
    let orchestrator = TrainingOrchestrator::new();

    for rows in [1_000, 5_000].iter() {
        let (frame, names) = generate_frame(*rows, 10);
        for backend in ["xgb", "lgbm"] {
            group.bench_with_input(BenchmarkId::new(backend, rows), &frame, |b, frame| {
                b.iter(|| black_box(orchestrator.train(frame, &names, backend, &hyper).unwrap()))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_backends);
criterion_main!(benches);
