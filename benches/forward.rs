use criterion::{black_box, criterion_group, criterion_main, Criterion};
use metis::builders::{BatchNormMlpBuilder, NormalizedMlpBuilder};
use ndarray::Array2;

fn forward_benchmark(c: &mut Criterion) {
    let tmp = std::env::temp_dir().join("metis-bench");

    let mut normalized = NormalizedMlpBuilder::new(32, 8)
        .hidden_sizes(&[64, 64])
        .log_dir(tmp.join("activations"))
        .build()
        .unwrap();

    let mut batchnorm = BatchNormMlpBuilder::new(32, 8)
        .hidden_sizes(&[64, 64])
        .log_dir(tmp.join("activations_bn"))
        .build()
        .unwrap();
    batchnorm.set_training(false);

    let batch = Array2::<f32>::ones((128, 32));

    c.bench_function("normalized_mlp_forward_128x32", |b| {
        b.iter(|| normalized.forward_batch(black_box(batch.view())))
    });

    c.bench_function("batchnorm_mlp_forward_128x32", |b| {
        b.iter(|| batchnorm.forward_batch(black_box(batch.view())))
    });
}

criterion_group!(benches, forward_benchmark);
criterion_main!(benches);
