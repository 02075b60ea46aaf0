use crate::buffer::TrainableData;
use crate::error::NeuraGraphError;
use crate::graph::Node;
use crate::nodes::single_input;
use crate::tensor::Tensor;

/// Rectified linear unit, `max(0, x)` element-wise.
#[derive(Debug)]
pub struct ReluNode {
    shape: Vec<usize>,
}

impl ReluNode {
    pub fn new(input_shape: &[usize]) -> Self {
        ReluNode {
            shape: input_shape.to_vec(),
        }
    }
}

impl Node for ReluNode {
    fn name(&self) -> &str {
        "RELU"
    }

    fn output_shape(&self) -> &[usize] {
        &self.shape
    }

    fn forward(
        &mut self,
        inputs: &[&Tensor],
        _params: Option<&TrainableData>,
    ) -> Result<Tensor, NeuraGraphError> {
        let input = single_input(self.name(), inputs)?;
        Ok(input.map(|v| v.max(0.0)))
    }

    fn backward(
        &mut self,
        inputs: &[&Tensor],
        _output: &Tensor,
        grad_output: &Tensor,
        _params: Option<&mut TrainableData>,
    ) -> Result<Vec<Tensor>, NeuraGraphError> {
        let input = single_input(self.name(), inputs)?;
        let mask = input.map(|v| if v > 0.0 { 1.0 } else { 0.0 });
        Ok(vec![grad_output.mul(&mask)?])
    }
}

/// Logistic sigmoid, `1 / (1 + e^-x)` element-wise.
#[derive(Debug)]
pub struct SigmoidNode {
    shape: Vec<usize>,
}

impl SigmoidNode {
    pub fn new(input_shape: &[usize]) -> Self {
        SigmoidNode {
            shape: input_shape.to_vec(),
        }
    }
}

impl Node for SigmoidNode {
    fn name(&self) -> &str {
        "Sigmoid"
    }

    fn output_shape(&self) -> &[usize] {
        &self.shape
    }

    fn forward(
        &mut self,
        inputs: &[&Tensor],
        _params: Option<&TrainableData>,
    ) -> Result<Tensor, NeuraGraphError> {
        let input = single_input(self.name(), inputs)?;
        Ok(input.map(|v| 1.0 / (1.0 + (-v).exp())))
    }

    fn backward(
        &mut self,
        inputs: &[&Tensor],
        output: &Tensor,
        grad_output: &Tensor,
        _params: Option<&mut TrainableData>,
    ) -> Result<Vec<Tensor>, NeuraGraphError> {
        single_input(self.name(), inputs)?;
        let local = output.map(|y| y * (1.0 - y));
        Ok(vec![grad_output.mul(&local)?])
    }
}
