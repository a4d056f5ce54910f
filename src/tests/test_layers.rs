use ndarray::{array, Array2};

use crate::layers::{BatchNormLayer, Dropout, LinearLayer};

#[test]
fn test_linear_forward() {
    let mut layer = LinearLayer::new(2, 1)
        .with_weights(array![[1.0], [2.0]])
        .with_biases(array![0.5]);

    let inputs = array![[1.0, 2.0], [3.0, 4.0]];
    let outputs = layer.forward_batch(inputs.view());
    assert_eq!(outputs, array![[5.5], [11.5]]);
}

#[test]
fn test_linear_forward_single() {
    let mut layer = LinearLayer::new(3, 2);
    let input = array![1.0, -1.0, 0.5];
    let output = layer.forward(input.view());
    assert_eq!(output.len(), 2);
}

#[test]
fn test_linear_backward() {
    let mut layer = LinearLayer::new(2, 1)
        .with_weights(array![[1.0], [2.0]])
        .with_biases(array![0.0]);

    let inputs = array![[1.0, 2.0]];
    layer.forward_batch(inputs.view());

    let errors = array![[1.0]];
    let (input_grads, weight_grads, bias_grads) = layer.backward_batch(errors.view());

    assert_eq!(weight_grads, array![[1.0], [2.0]]);
    assert_eq!(bias_grads, array![1.0]);
    assert_eq!(input_grads, array![[1.0, 2.0]]);
}

#[test]
fn test_linear_sizes() {
    let layer = LinearLayer::new(4, 8);
    assert_eq!(layer.input_size(), 4);
    assert_eq!(layer.output_size(), 8);
    assert_eq!(layer.weights.dim(), (4, 8));
    assert_eq!(layer.biases.len(), 8);
}

#[test]
fn test_batch_norm_training_updates_running_stats() {
    let mut bn = BatchNormLayer::new(2, 0.1, 1e-5);
    let inputs = array![[1.0, 10.0], [3.0, 30.0], [5.0, 50.0], [7.0, 70.0]];
    bn.forward_batch(inputs.view());

    // batch mean is (4, 40); running mean moves 10% of the way there
    assert!((bn.running_mean[0] - 0.4).abs() < 1e-5);
    assert!((bn.running_mean[1] - 4.0).abs() < 1e-4);
}

#[test]
fn test_batch_norm_eval_uses_frozen_stats() {
    let mut bn = BatchNormLayer::new(2, 0.1, 1e-5);
    bn.set_training(false);

    let inputs = array![[1.0, 2.0], [3.0, 4.0]];
    let out = bn.forward_batch(inputs.view());

    // fresh running stats are mean 0, var 1, so eval mode is near-identity
    assert!((out[[0, 0]] - 1.0).abs() < 1e-3);
    assert!((out[[1, 1]] - 4.0).abs() < 1e-3);

    // and nothing was updated
    assert_eq!(bn.running_mean, array![0.0, 0.0]);
    assert_eq!(bn.running_var, array![1.0, 1.0]);
}

#[test]
fn test_batch_norm_single_sample_uses_running_stats() {
    let mut bn = BatchNormLayer::new(2, 0.1, 1e-5);
    let inputs = array![[2.0, 2.0]];
    bn.forward_batch(inputs.view());
    // batch statistics are undefined for one sample; running stats stay put
    assert_eq!(bn.running_mean, array![0.0, 0.0]);
}

#[test]
fn test_batch_norm_normalizes_batch() {
    let mut bn = BatchNormLayer::new(1, 0.1, 1e-5);
    let inputs = array![[1.0], [3.0]];
    let out = bn.forward_batch(inputs.view());
    // mean 2, std 1: normalized to -1 and 1 (gamma 1, beta 0)
    assert!((out[[0, 0]] + 1.0).abs() < 1e-2);
    assert!((out[[1, 0]] - 1.0).abs() < 1e-2);
}

#[test]
fn test_dropout_rejects_invalid_rate() {
    assert!(Dropout::new(1.0).is_err());
    assert!(Dropout::new(-0.1).is_err());
    assert!(Dropout::new(0.0).is_ok());
    assert!(Dropout::new(0.99).is_ok());
}

#[test]
fn test_dropout_eval_is_identity() {
    let mut dropout = Dropout::new(0.5).unwrap();
    dropout.set_training(false);
    let inputs = array![[1.0, 2.0], [3.0, 4.0]];
    assert_eq!(dropout.forward_batch(inputs.view()), inputs);
}

#[test]
fn test_dropout_zero_rate_is_identity() {
    let dropout = Dropout::new(0.0).unwrap();
    let inputs = array![[1.0, 2.0], [3.0, 4.0]];
    assert_eq!(dropout.forward_batch(inputs.view()), inputs);
}

#[test]
fn test_dropout_training_masks_and_rescales() {
    let dropout = Dropout::new(0.5).unwrap();
    let inputs = Array2::<f32>::ones((8, 8));
    let out = dropout.forward_batch(inputs.view());
    // every surviving unit is scaled by 1 / (1 - p); dropped units are zero
    for &v in out.iter() {
        assert!(v == 0.0 || (v - 2.0).abs() < 1e-6);
    }
}
