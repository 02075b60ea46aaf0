use crate::buffer::TrainableData;
use crate::error::NeuraGraphError;
use crate::graph::Node;
use crate::nodes::single_input;
use crate::tensor::Tensor;

/// Soft-max classifier head with a cross-entropy objective.
///
/// The output is the soft-max of the (flattened) input. The expected class
/// is supplied through [`update_input`](Node::update_input) as a scalar
/// holding the class index. As a loss node it starts the gradient chain
/// itself: backward emits `softmax(x) - onehot(selected)` and ignores the
/// incoming gradient.
#[derive(Debug)]
pub struct SoftMaxNode {
    shape: Vec<usize>,
    selected: usize,
}

impl SoftMaxNode {
    pub fn new(input_shape: &[usize]) -> Self {
        SoftMaxNode {
            shape: input_shape.to_vec(),
            selected: 0,
        }
    }

    /// Class index the next backward pass trains towards.
    pub fn selected(&self) -> usize {
        self.selected
    }

    fn classes(&self) -> usize {
        self.shape.iter().product()
    }

    fn class_index(&self, value: &Tensor) -> Result<usize, NeuraGraphError> {
        let raw = value.item().ok_or(NeuraGraphError::EmptyBatch)?;
        let classes = self.classes();
        if value.numel() != 1 || raw < 0.0 || raw.fract() != 0.0 || raw as usize >= classes {
            return Err(NeuraGraphError::InvalidNodeParameters(format!(
                "expected a single class index below {}, got {:?}",
                classes, value
            )));
        }
        Ok(raw as usize)
    }
}

impl Node for SoftMaxNode {
    fn name(&self) -> &str {
        "SoftMax"
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
        let max = input.data().iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let exp = input.map(|v| (v - max).exp());
        let sum: f32 = exp.data().iter().sum();
        Ok(exp.map(|v| v / sum))
    }

    fn backward(
        &mut self,
        inputs: &[&Tensor],
        output: &Tensor,
        _grad_output: &Tensor,
        _params: Option<&mut TrainableData>,
    ) -> Result<Vec<Tensor>, NeuraGraphError> {
        single_input(self.name(), inputs)?;
        let mut dx = output.clone();
        if let Some(v) = dx.data_mut().get_mut(self.selected) {
            *v -= 1.0;
        }
        Ok(vec![dx])
    }

    fn update_input(&mut self, value: &Tensor) -> Result<(), NeuraGraphError> {
        self.selected = self.class_index(value)?;
        Ok(())
    }

    fn check_input(&self, value: &Tensor) -> Result<(), NeuraGraphError> {
        self.class_index(value).map(|_| ())
    }
}
