use criterion::{Criterion, criterion_group, criterion_main};
use poremap::{
    BinaryGrid, FieldGenerator, Microstructure, MicrostructureParams, ThresholdSolver,
    writer::to_text,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const SIZE: usize = 256;
const SEED: u64 = 2025;

fn bench_field_default(c: &mut Criterion) {
    c.bench_function("FieldGenerator 100x100, lambda (5, 3)", |b| {
        let generator = FieldGenerator::new(100, 100, 5.0, 3.0).unwrap();
        b.iter(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(SEED);
            let _field = generator.generate(&mut rng);
        })
    });
}

fn bench_field_large(c: &mut Criterion) {
    c.bench_function("FieldGenerator 256x256, lambda (12, 12)", |b| {
        let generator = FieldGenerator::new(SIZE, SIZE, 12.0, 12.0).unwrap();
        b.iter(|| {
            let mut rng = ChaCha8Rng::seed_from_u64(SEED);
            let _field = generator.generate(&mut rng);
        })
    });
}

fn bench_threshold(c: &mut Criterion) {
    let field = FieldGenerator::new(SIZE, SIZE, 5.0, 3.0)
        .unwrap()
        .generate(&mut ChaCha8Rng::seed_from_u64(SEED));
    c.bench_function("ThresholdSolver 256x256, porosity 0.2", |b| {
        let solver = ThresholdSolver::default();
        b.iter(|| solver.solve(&field, 0.2).unwrap())
    });
}

fn bench_binarize_and_serialize(c: &mut Criterion) {
    let field = FieldGenerator::new(SIZE, SIZE, 5.0, 3.0)
        .unwrap()
        .generate(&mut ChaCha8Rng::seed_from_u64(SEED));
    c.bench_function("BinaryGrid + text 256x256", |b| {
        b.iter(|| {
            let grid = BinaryGrid::from_field(&field, 0.0);
            let _text = to_text(&grid);
        })
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let params = MicrostructureParams {
        seed: Some(SEED),
        ..MicrostructureParams::default()
    };
    c.bench_function("Microstructure 100x100 end to end", |b| {
        b.iter(|| {
            let run = Microstructure::generate(&params).unwrap();
            let _text = to_text(&run.grid);
        })
    });
}

criterion_group!(
    poremap_benchmarks,
    bench_field_default,
    bench_field_large,
    bench_threshold,
    bench_binarize_and_serialize,
    bench_pipeline
);
criterion_main!(poremap_benchmarks);
