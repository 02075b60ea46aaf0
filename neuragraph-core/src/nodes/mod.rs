// src/nodes/mod.rs
// Concrete node kinds built by the `Network` factories.

use crate::buffer::TrainableData;
use crate::error::NeuraGraphError;
use crate::tensor::{self, Tensor};
use rand::Rng;

pub mod activation;
pub mod array;
pub mod conv;
pub mod fully_connected;
pub mod max_pool;
pub mod regression;
pub mod softmax;

pub use activation::{ReluNode, SigmoidNode};
pub use array::ArrayNode;
pub use conv::ConvNode;
pub use fully_connected::FullyConnectedNode;
pub use max_pool::MaxPoolNode;
pub use regression::RegressionNode;
pub use softmax::SoftMaxNode;

/// Returns the only input of a single-input node.
pub(crate) fn single_input<'a>(
    name: &str,
    inputs: &[&'a Tensor],
) -> Result<&'a Tensor, NeuraGraphError> {
    match inputs {
        [input] => Ok(*input),
        _ => Err(NeuraGraphError::ArityMismatch {
            node: name.to_string(),
            expected: 1,
            actual: inputs.len(),
        }),
    }
}

/// Weight matrix of `rows x (fan_in + 1)` with the bias in the last column.
///
/// Weights are drawn from `N(0, 1 / fan_in)`; biases start at zero.
pub(crate) fn init_weights<R: Rng + ?Sized>(
    rows: usize,
    fan_in: usize,
    rng: &mut R,
) -> Result<TrainableData, NeuraGraphError> {
    if rows == 0 || fan_in == 0 {
        return Err(NeuraGraphError::InvalidNodeParameters(format!(
            "cannot create a {}x{} weight matrix",
            rows, fan_in
        )));
    }
    let std = (1.0 / fan_in as f32).sqrt();
    let mut weights = tensor::randn(&[rows, fan_in + 1], std, rng)?;
    let stride = fan_in + 1;
    for row in weights.data_mut().chunks_mut(stride) {
        row[fan_in] = 0.0;
    }
    Ok(TrainableData::new(weights))
}

/// Output extent of a sliding window along one axis.
pub(crate) fn window_extent(
    size: usize,
    filter: usize,
    stride: usize,
    pad: usize,
) -> Result<usize, NeuraGraphError> {
    if filter == 0 || stride == 0 {
        return Err(NeuraGraphError::InvalidNodeParameters(format!(
            "filter size ({}) and stride ({}) must be positive",
            filter, stride
        )));
    }
    if size + 2 * pad < filter {
        return Err(NeuraGraphError::InvalidNodeParameters(format!(
            "filter size {} exceeds padded input extent {}",
            filter,
            size + 2 * pad
        )));
    }
    Ok((size + 2 * pad - filter) / stride + 1)
}

/// Checks that a tensor is laid out as `[width, height, depth]`.
pub(crate) fn expect_image(name: &str, shape: &[usize]) -> Result<(), NeuraGraphError> {
    if shape.len() != 3 {
        return Err(NeuraGraphError::InvalidNodeParameters(format!(
            "{} expects a [width, height, depth] input, got {:?}",
            name, shape
        )));
    }
    Ok(())
}
