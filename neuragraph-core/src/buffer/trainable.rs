use crate::config::TrainingConfig;
use crate::error::NeuraGraphError;
use crate::tensor::{self, Tensor};
use log::debug;
use std::fmt;

/// Weights of a parameterised node together with their accumulated gradient.
///
/// The gradient accumulator (and the momentum buffer used by the update rule)
/// always has the same shape as the weights; none of them is ever resized.
/// Contributions from successive backward passes add up until
/// [`clear_gradient`](TrainableData::clear_gradient) is called, which is how
/// mini-batches are formed.
#[derive(Debug, Clone)]
pub struct TrainableData {
    weights: Tensor,
    gradient: Tensor,
    velocity: Tensor,
    updates: usize,
}

impl TrainableData {
    /// Wraps `weights` with a zeroed gradient accumulator of the same shape.
    pub fn new(weights: Tensor) -> Self {
        let gradient = tensor::zeros(weights.shape());
        let velocity = tensor::zeros(weights.shape());
        TrainableData {
            weights,
            gradient,
            velocity,
            updates: 0,
        }
    }

    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    pub fn gradient(&self) -> &Tensor {
        &self.gradient
    }

    /// Element access to the accumulator for nodes that scatter contributions
    /// one value at a time during backward. The slice cannot change the
    /// accumulator's shape.
    pub fn gradient_data_mut(&mut self) -> &mut [f32] {
        self.gradient.data_mut()
    }

    /// Overwrites the accumulator with a previously taken copy of it.
    pub(crate) fn restore_gradient(&mut self, saved: &Tensor) -> Result<(), NeuraGraphError> {
        if saved.shape() != self.gradient.shape() {
            return Err(NeuraGraphError::GradientAccumulationShapeMismatch {
                expected: self.gradient.shape().to_vec(),
                actual: saved.shape().to_vec(),
            });
        }
        self.gradient.data_mut().copy_from_slice(saved.data());
        Ok(())
    }

    /// Number of times [`train`](TrainableData::train) has been applied.
    pub fn update_count(&self) -> usize {
        self.updates
    }

    /// Adds one backward pass's contribution to the accumulator.
    pub fn accumulate(&mut self, contribution: &Tensor) -> Result<(), NeuraGraphError> {
        if contribution.shape() != self.gradient.shape() {
            return Err(NeuraGraphError::GradientAccumulationShapeMismatch {
                expected: self.gradient.shape().to_vec(),
                actual: contribution.shape().to_vec(),
            });
        }
        self.gradient.add_assign(contribution)
    }

    /// Applies one parameter update from the accumulated gradient.
    ///
    /// The gradient is averaged over `batch_size` after adding the L1 and L2
    /// penalty terms. With a non-zero momentum the step is folded into a
    /// velocity buffer, otherwise plain gradient descent is used. This is the
    /// only method that writes to the weights.
    pub fn train(&mut self, config: &TrainingConfig) {
        let batch_size = config.batch_size.max(1) as f32;
        let lr = config.learning_rate;
        let momentum = config.momentum;

        let weights = self.weights.data_mut();
        let grads = self.gradient.data();
        let velocity = self.velocity.data_mut();

        for ((w, g), v) in weights.iter_mut().zip(grads).zip(velocity.iter_mut()) {
            let l1 = config.l1_decay * if *w > 0.0 { 1.0 } else { -1.0 };
            let l2 = config.l2_decay * *w;
            let gij = (l1 + l2 + g) / batch_size;
            if momentum > 0.0 {
                let dx = momentum * *v - lr * gij;
                *v = dx;
                *w += dx;
            } else {
                *w -= lr * gij;
            }
        }
        self.updates += 1;
        debug!(
            "TrainableData: applied update #{} (lr = {}, momentum = {}, batch_size = {})",
            self.updates, lr, momentum, config.batch_size
        );
    }

    /// Resets the accumulator so it reflects no prior backward pass.
    pub fn clear_gradient(&mut self) {
        self.gradient.fill(0.0);
    }

    /// Human-readable rendering of the weights and gradient.
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TrainableData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  weights:  {}", self.weights)?;
        write!(f, "  gradient: {}", self.gradient)
    }
}

#[cfg(test)]
#[path = "trainable_test.rs"]
mod tests;
