// Helpers shared by the crate's unit tests.

use crate::buffer::TrainableData;
use crate::error::NeuraGraphError;
use crate::graph::Node;
use crate::tensor::{self, Tensor};

/// Test node whose output is the element-wise sum of its inputs, plus its
/// weights when it owns a buffer, plus an externally assigned value.
///
/// Backward hands `grad_output` unchanged to every input and, when it owns a
/// buffer, accumulates `grad_output` into it.
#[derive(Debug)]
pub(crate) struct SumNode {
    name: String,
    shape: Vec<usize>,
    value: Tensor,
}

impl SumNode {
    pub(crate) fn new(name: &str, shape: &[usize]) -> Self {
        SumNode {
            name: name.to_string(),
            shape: shape.to_vec(),
            value: tensor::zeros(shape),
        }
    }

    pub(crate) fn boxed(name: &str, shape: &[usize]) -> Box<dyn Node> {
        Box::new(Self::new(name, shape))
    }
}

impl Node for SumNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn output_shape(&self) -> &[usize] {
        &self.shape
    }

    fn forward(
        &mut self,
        inputs: &[&Tensor],
        params: Option<&TrainableData>,
    ) -> Result<Tensor, NeuraGraphError> {
        let mut out = self.value.clone();
        for input in inputs {
            out.add_assign(input)?;
        }
        if let Some(params) = params {
            out.add_assign(params.weights())?;
        }
        Ok(out)
    }

    fn backward(
        &mut self,
        inputs: &[&Tensor],
        _output: &Tensor,
        grad_output: &Tensor,
        params: Option<&mut TrainableData>,
    ) -> Result<Vec<Tensor>, NeuraGraphError> {
        if let Some(params) = params {
            params.accumulate(grad_output)?;
        }
        Ok(inputs.iter().map(|_| grad_output.clone()).collect())
    }

    fn update_input(&mut self, value: &Tensor) -> Result<(), NeuraGraphError> {
        self.value = value.reshape(self.shape.clone())?;
        Ok(())
    }

    fn check_input(&self, value: &Tensor) -> Result<(), NeuraGraphError> {
        value.reshape(self.shape.clone()).map(|_| ())
    }
}
