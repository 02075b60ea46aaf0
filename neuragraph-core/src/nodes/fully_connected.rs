use crate::buffer::TrainableData;
use crate::error::NeuraGraphError;
use crate::graph::Node;
use crate::nodes::{init_weights, single_input};
use crate::tensor::{self, Tensor};
use rand::Rng;

/// Dense layer: `out[o] = sum_i w[o, i] * x[i] + w[o, n]`.
///
/// The input is flattened, so any input shape works. The weight buffer has
/// shape `[out_depth, n + 1]`, the last column holding the biases.
#[derive(Debug)]
pub struct FullyConnectedNode {
    in_size: usize,
    out_shape: Vec<usize>,
}

impl FullyConnectedNode {
    /// Creates the node and its freshly initialised weights.
    pub fn new<R: Rng + ?Sized>(
        input_shape: &[usize],
        out_depth: usize,
        rng: &mut R,
    ) -> Result<(Self, TrainableData), NeuraGraphError> {
        let in_size: usize = input_shape.iter().product();
        let params = init_weights(out_depth, in_size, rng)?;
        let node = FullyConnectedNode {
            in_size,
            out_shape: vec![out_depth],
        };
        Ok((node, params))
    }

    fn out_depth(&self) -> usize {
        self.out_shape[0]
    }
}

impl Node for FullyConnectedNode {
    fn name(&self) -> &str {
        "FullyConnected"
    }

    fn output_shape(&self) -> &[usize] {
        &self.out_shape
    }

    fn forward(
        &mut self,
        inputs: &[&Tensor],
        params: Option<&TrainableData>,
    ) -> Result<Tensor, NeuraGraphError> {
        let input = single_input(self.name(), inputs)?;
        let params = params.ok_or_else(|| NeuraGraphError::MissingParameters(self.name().to_string()))?;
        if input.numel() != self.in_size {
            return Err(NeuraGraphError::ShapeMismatch {
                expected: vec![self.in_size],
                actual: input.shape().to_vec(),
                operation: "FullyConnectedNode::forward".to_string(),
            });
        }

        let n = self.in_size;
        let x = input.data();
        let out: Vec<f32> = params
            .weights()
            .data()
            .chunks(n + 1)
            .map(|row| row[..n].iter().zip(x).map(|(w, v)| w * v).sum::<f32>() + row[n])
            .collect();
        Tensor::new(out, self.out_shape.clone())
    }

    fn backward(
        &mut self,
        inputs: &[&Tensor],
        _output: &Tensor,
        grad_output: &Tensor,
        params: Option<&mut TrainableData>,
    ) -> Result<Vec<Tensor>, NeuraGraphError> {
        let input = single_input(self.name(), inputs)?;
        let params = params.ok_or_else(|| NeuraGraphError::MissingParameters(self.name().to_string()))?;
        let n = self.in_size;
        let x = input.data();
        let g = grad_output.data();
        if g.len() != self.out_depth() {
            return Err(NeuraGraphError::ShapeMismatch {
                expected: self.out_shape.clone(),
                actual: grad_output.shape().to_vec(),
                operation: "FullyConnectedNode::backward".to_string(),
            });
        }

        let mut dx = tensor::zeros(input.shape());
        for (o, row) in params.weights().data().chunks(n + 1).enumerate() {
            for (d, w) in dx.data_mut().iter_mut().zip(&row[..n]) {
                *d += w * g[o];
            }
        }

        let grad = params.gradient_data_mut();
        for (o, row) in grad.chunks_mut(n + 1).enumerate() {
            for (acc, v) in row[..n].iter_mut().zip(x) {
                *acc += g[o] * v;
            }
            row[n] += g[o];
        }
        Ok(vec![dx])
    }
}

#[cfg(test)]
#[path = "fully_connected_test.rs"]
mod tests;
