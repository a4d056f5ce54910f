use metis::activations::Nonlinearity;
use metis::builders::{BatchNormMlpBuilder, NormalizedMlpBuilder};
use metis::device::Device;
use metis::logging::ExperimentLog;
use ndarray::{array, Array2};
use tempfile::tempdir;

#[test]
fn test_policy_network_round_trip() {
    let dir = tempdir().unwrap();

    // dataset-derived normalization statistics injected before training
    let mut policy = NormalizedMlpBuilder::new(4, 2)
        .hidden_sizes(&[32, 32])
        .nonlinearity(Nonlinearity::Tanh)
        .transformations(
            Some(&[0.5, 0.5, 0.0, 0.0]),
            Some(&[1.0, 2.0, 1.0, 2.0]),
            Some(&[0.0, 1.0]),
            Some(&[2.0, 2.0]),
        )
        .log_dir(dir.path().join("activations"))
        .build()
        .unwrap();

    policy.register_hooks().unwrap();

    let observations = array![
        [0.1, 0.2, 0.3, 0.4],
        [1.0, -1.0, 0.5, -0.5],
        [0.0, 0.0, 0.0, 0.0],
    ];
    let actions = policy.forward_batch(observations.view());
    assert_eq!(actions.shape(), &[3, 2]);

    // one cache entry per affine layer, shaped [batch, layer width]
    let activations = policy.activations();
    assert_eq!(activations.len(), 3);
    assert_eq!(activations["fc_layer_0"].shape(), &[3, 32]);
    assert_eq!(activations["fc_layer_1"].shape(), &[3, 32]);
    assert_eq!(activations["fc_layer_2"].shape(), &[3, 2]);

    // the histogram sink saw one row per layer
    policy.close_writer();
    policy.close_writer();
    let histograms =
        std::fs::read_to_string(dir.path().join("activations").join("histograms.csv")).unwrap();
    assert_eq!(histograms.lines().count(), 1 + 3);
    assert!(histograms.contains("Activations/fc_layer_0"));

    // migration keeps the bundle usable immediately
    policy.to(Device::Gpu);
    assert_eq!(policy.device(), Device::Gpu);
    let moved = policy.forward_batch(observations.view());
    assert_eq!(moved.shape(), &[3, 2]);
}

#[test]
fn test_value_network_train_eval_cycle() {
    let dir = tempdir().unwrap();
    let mut value_fn = BatchNormMlpBuilder::new(4, 1)
        .hidden_sizes(&[16])
        .dropout(0.2)
        .log_dir(dir.path().join("activations_bn"))
        .build()
        .unwrap();

    // training forwards update the input running statistics
    let before = value_fn.input_batchnorm.running_mean.clone();
    let batch = Array2::from_shape_fn((8, 4), |(i, j)| (i + j) as f32);
    value_fn.forward_batch(batch.view());
    assert_ne!(value_fn.input_batchnorm.running_mean, before);

    // eval mode freezes statistics and disables dropout
    value_fn.set_training(false);
    let frozen = value_fn.input_batchnorm.running_mean.clone();
    let first = value_fn.forward_batch(batch.view());
    let second = value_fn.forward_batch(batch.view());
    assert_eq!(first, second);
    assert_eq!(value_fn.input_batchnorm.running_mean, frozen);
}

#[test]
fn test_training_loop_logging() {
    let dir = tempdir().unwrap();
    let mut log = ExperimentLog::new();

    for iteration in 0..10 {
        log.log_kv("reward", iteration as f32 * 1.5);
        log.log_kv("vf_loss", 1.0 / (iteration + 1) as f32);
        log.global_step += 1;
    }
    assert_eq!(log.max_len, 10);

    log.save_log(dir.path()).unwrap();

    let mut restored = ExperimentLog::new();
    restored.read_log(dir.path().join("log.csv")).unwrap();
    assert_eq!(restored.series("reward").unwrap().len(), 10);
    assert_eq!(
        restored.series("reward").unwrap(),
        log.series("reward").unwrap()
    );

    let current = restored.get_current_log();
    assert_eq!(current["reward"], 13.5);

    restored.shrink_to(5);
    assert_eq!(restored.series("vf_loss").unwrap().len(), 5);
}
