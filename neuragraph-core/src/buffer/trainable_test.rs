// neuragraph-core/src/buffer/trainable_test.rs

use super::*;
use approx::assert_relative_eq;

fn buffer(weights: Vec<f32>) -> Result<TrainableData, NeuraGraphError> {
    let len = weights.len();
    Ok(TrainableData::new(Tensor::new(weights, vec![len])?))
}

#[test]
fn test_new_has_zero_gradient_of_same_shape() -> Result<(), NeuraGraphError> {
    let data = TrainableData::new(Tensor::new(vec![1.0; 6], vec![2, 3])?);
    assert_eq!(data.gradient().shape(), data.weights().shape());
    assert!(data.gradient().data().iter().all(|&g| g == 0.0));
    assert_eq!(data.update_count(), 0);
    Ok(())
}

#[test]
fn test_accumulate_sums_contributions() -> Result<(), NeuraGraphError> {
    let mut data = buffer(vec![0.0, 0.0])?;
    data.accumulate(&Tensor::new(vec![1.0, 2.0], vec![2])?)?;
    data.accumulate(&Tensor::new(vec![0.5, -1.0], vec![2])?)?;
    data.accumulate(&Tensor::new(vec![0.25, 0.0], vec![2])?)?;
    assert_eq!(data.gradient().data(), &[1.75, 1.0]);
    Ok(())
}

#[test]
fn test_accumulate_rejects_shape_mismatch() -> Result<(), NeuraGraphError> {
    let mut data = buffer(vec![0.0, 0.0])?;
    let result = data.accumulate(&Tensor::new(vec![1.0, 2.0, 3.0], vec![3])?);
    assert_eq!(
        result,
        Err(NeuraGraphError::GradientAccumulationShapeMismatch {
            expected: vec![2],
            actual: vec![3]
        })
    );
    Ok(())
}

#[test]
fn test_train_plain_sgd_averages_over_batch() -> Result<(), NeuraGraphError> {
    let mut data = buffer(vec![1.0, -2.0])?;
    data.accumulate(&Tensor::new(vec![0.4, 0.8], vec![2])?)?;
    let config = TrainingConfig::default()
        .with_batch_size(2)
        .with_learning_rate(0.5);
    data.train(&config);
    // w -= lr * g / batch
    assert_relative_eq!(data.weights().data()[0], 1.0 - 0.5 * 0.2, epsilon = 1e-6);
    assert_relative_eq!(data.weights().data()[1], -2.0 - 0.5 * 0.4, epsilon = 1e-6);
    assert_eq!(data.update_count(), 1);
    // train does not clear the accumulator on its own
    assert_eq!(data.gradient().data(), &[0.4, 0.8]);
    Ok(())
}

#[test]
fn test_train_with_momentum_uses_velocity() -> Result<(), NeuraGraphError> {
    let mut data = buffer(vec![0.0])?;
    let config = TrainingConfig::default()
        .with_learning_rate(0.1)
        .with_momentum(0.9);
    data.accumulate(&Tensor::new(vec![1.0], vec![1])?)?;
    data.train(&config);
    assert_relative_eq!(data.weights().data()[0], -0.1, epsilon = 1e-6);
    data.train(&config);
    // v = 0.9 * -0.1 - 0.1 = -0.19
    assert_relative_eq!(data.weights().data()[0], -0.29, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_train_applies_decay_terms() -> Result<(), NeuraGraphError> {
    let mut data = buffer(vec![2.0, -2.0])?;
    let config = TrainingConfig::default()
        .with_learning_rate(1.0)
        .with_l1_decay(0.1)
        .with_l2_decay(0.5);
    data.train(&config);
    // g = l1 * sign(w) + l2 * w
    assert_relative_eq!(data.weights().data()[0], 2.0 - (0.1 + 1.0), epsilon = 1e-6);
    assert_relative_eq!(data.weights().data()[1], -2.0 - (-0.1 - 1.0), epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_clear_gradient_resets_accumulator() -> Result<(), NeuraGraphError> {
    let mut data = buffer(vec![1.0, 1.0])?;
    data.accumulate(&Tensor::new(vec![3.0, 4.0], vec![2])?)?;
    data.clear_gradient();
    assert!(data.gradient().data().iter().all(|&g| g == 0.0));
    data.accumulate(&Tensor::new(vec![1.0, 1.0], vec![2])?)?;
    assert_eq!(data.gradient().data(), &[1.0, 1.0]);
    Ok(())
}

#[test]
fn test_dump_mentions_weights_and_gradient() -> Result<(), NeuraGraphError> {
    let data = buffer(vec![1.5])?;
    let text = data.dump();
    assert!(text.contains("weights:"));
    assert!(text.contains("gradient:"));
    assert!(text.contains("1.5000"));
    Ok(())
}

#[test]
fn test_element_writes_keep_accumulator_shape() -> Result<(), NeuraGraphError> {
    let mut data = TrainableData::new(Tensor::new(vec![0.0; 4], vec![2, 2])?);
    let grad = data.gradient_data_mut();
    assert_eq!(grad.len(), 4);
    grad[3] = 2.5;
    assert_eq!(data.gradient().shape(), data.weights().shape());
    assert_eq!(data.gradient().data(), &[0.0, 0.0, 0.0, 2.5]);
    // Later contributions still line up element for element.
    data.accumulate(&Tensor::new(vec![1.0; 4], vec![2, 2])?)?;
    assert_eq!(data.gradient().data(), &[1.0, 1.0, 1.0, 3.5]);
    Ok(())
}

#[test]
fn test_restore_gradient_requires_same_shape() -> Result<(), NeuraGraphError> {
    let mut data = buffer(vec![0.0, 0.0])?;
    let saved = data.gradient().clone();
    data.accumulate(&Tensor::new(vec![1.0, 2.0], vec![2])?)?;
    data.restore_gradient(&saved)?;
    assert_eq!(data.gradient().data(), &[0.0, 0.0]);
    assert!(matches!(
        data.restore_gradient(&Tensor::scalar(1.0)),
        Err(NeuraGraphError::GradientAccumulationShapeMismatch { .. })
    ));
    Ok(())
}
