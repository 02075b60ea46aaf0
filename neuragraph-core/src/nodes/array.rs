use crate::buffer::TrainableData;
use crate::error::NeuraGraphError;
use crate::graph::Node;
use crate::tensor::{self, Tensor};

/// Leaf node holding externally supplied data.
#[derive(Debug)]
pub struct ArrayNode {
    dims: Vec<usize>,
    value: Tensor,
}

impl ArrayNode {
    pub fn new(dims: &[usize]) -> Result<Self, NeuraGraphError> {
        if dims.is_empty() || dims.contains(&0) {
            return Err(NeuraGraphError::InvalidNodeParameters(format!(
                "array dimensions must be non-empty and positive, got {:?}",
                dims
            )));
        }
        Ok(ArrayNode {
            dims: dims.to_vec(),
            value: tensor::zeros(dims),
        })
    }
}

impl Node for ArrayNode {
    fn name(&self) -> &str {
        "Array"
    }

    fn output_shape(&self) -> &[usize] {
        &self.dims
    }

    fn forward(
        &mut self,
        _inputs: &[&Tensor],
        _params: Option<&TrainableData>,
    ) -> Result<Tensor, NeuraGraphError> {
        Ok(self.value.clone())
    }

    fn backward(
        &mut self,
        _inputs: &[&Tensor],
        _output: &Tensor,
        _grad_output: &Tensor,
        _params: Option<&mut TrainableData>,
    ) -> Result<Vec<Tensor>, NeuraGraphError> {
        Ok(Vec::new())
    }

    /// Accepts any tensor with the same number of elements as the node's
    /// dimensions.
    fn update_input(&mut self, value: &Tensor) -> Result<(), NeuraGraphError> {
        self.check_input(value)?;
        self.value = value.reshape(self.dims.clone())?;
        Ok(())
    }

    fn check_input(&self, value: &Tensor) -> Result<(), NeuraGraphError> {
        if value.numel() != self.value.numel() {
            return Err(NeuraGraphError::ShapeMismatch {
                expected: self.dims.clone(),
                actual: value.shape().to_vec(),
                operation: "ArrayNode::update_input".to_string(),
            });
        }
        Ok(())
    }
}
