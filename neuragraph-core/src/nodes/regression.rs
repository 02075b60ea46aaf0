use crate::buffer::TrainableData;
use crate::error::NeuraGraphError;
use crate::graph::Node;
use crate::nodes::single_input;
use crate::tensor::{self, Tensor};

/// Squared-error objective against an externally supplied target.
///
/// Forward passes the input through unchanged so the prediction can be read
/// from this node. The target is set with [`update_input`](Node::update_input)
/// and backward emits `(x - expected) * grad_output`.
#[derive(Debug)]
pub struct RegressionNode {
    shape: Vec<usize>,
    expected: Tensor,
}

impl RegressionNode {
    pub fn new(input_shape: &[usize]) -> Self {
        RegressionNode {
            shape: input_shape.to_vec(),
            expected: tensor::zeros(input_shape),
        }
    }

    pub fn expected(&self) -> &Tensor {
        &self.expected
    }

    /// Half the squared distance between `prediction` and the current target.
    pub fn loss(&self, prediction: &Tensor) -> Result<f32, NeuraGraphError> {
        prediction.check_same_shape(&self.expected, "RegressionNode::loss")?;
        Ok(prediction
            .data()
            .iter()
            .zip(self.expected.data())
            .map(|(p, e)| 0.5 * (p - e) * (p - e))
            .sum())
    }
}

impl Node for RegressionNode {
    fn name(&self) -> &str {
        "Regression"
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
        Ok(input.clone())
    }

    fn backward(
        &mut self,
        inputs: &[&Tensor],
        _output: &Tensor,
        grad_output: &Tensor,
        _params: Option<&mut TrainableData>,
    ) -> Result<Vec<Tensor>, NeuraGraphError> {
        let input = single_input(self.name(), inputs)?;
        input.check_same_shape(&self.expected, "RegressionNode::backward")?;
        let diff: Vec<f32> = input
            .data()
            .iter()
            .zip(self.expected.data())
            .map(|(x, e)| x - e)
            .collect();
        let diff = Tensor::new(diff, self.shape.clone())?;
        Ok(vec![diff.mul(grad_output)?])
    }

    fn update_input(&mut self, value: &Tensor) -> Result<(), NeuraGraphError> {
        self.check_input(value)?;
        self.expected = value.reshape(self.shape.clone())?;
        Ok(())
    }

    fn check_input(&self, value: &Tensor) -> Result<(), NeuraGraphError> {
        if value.numel() != self.expected.numel() {
            return Err(NeuraGraphError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: value.shape().to_vec(),
                operation: "RegressionNode::update_input".to_string(),
            });
        }
        Ok(())
    }
}
