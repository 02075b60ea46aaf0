use crate::buffer::TrainableData;
use crate::error::NeuraGraphError;
use crate::tensor::Tensor;
use std::fmt::Debug;

/// Defines the interface of a unit of computation in the graph.
///
/// A node never reaches into other nodes: the graph hands it the outputs of
/// its inputs (in the order they were declared when the node was added) and
/// collects the input gradients it returns. Learnable weights, when the node
/// has any, are stored next to the node in the graph and passed in as
/// `params`.
pub trait Node: Debug {
    /// Stable diagnostic label.
    fn name(&self) -> &str;

    /// Shape of the tensor produced by [`forward`](Node::forward).
    ///
    /// Known at construction time so that downstream nodes can size their
    /// weights before any data flows.
    fn output_shape(&self) -> &[usize];

    /// Computes this node's output from the already-computed outputs of its
    /// inputs.
    ///
    /// Only called once every input has completed its own `forward` in the
    /// current pass.
    fn forward(
        &mut self,
        inputs: &[&Tensor],
        params: Option<&TrainableData>,
    ) -> Result<Tensor, NeuraGraphError>;

    /// Propagates `grad_output` (dL/dOutput) to the inputs.
    ///
    /// Must return exactly one gradient per input, each shaped like the
    /// corresponding input, in input order. Nodes owning a parameter buffer
    /// add their weight gradient to it here. Only called once every consumer
    /// of this node has completed its own `backward` in the current pass, so
    /// `grad_output` is complete.
    fn backward(
        &mut self,
        inputs: &[&Tensor],
        output: &Tensor,
        grad_output: &Tensor,
        params: Option<&mut TrainableData>,
    ) -> Result<Vec<Tensor>, NeuraGraphError>;

    /// Assigns a fresh externally supplied value (online path).
    ///
    /// Nodes that do not take external data keep the default, which rejects
    /// the call.
    fn update_input(&mut self, _value: &Tensor) -> Result<(), NeuraGraphError> {
        Err(NeuraGraphError::NotAnInputNode(self.name().to_string()))
    }

    /// Reports whether [`update_input`](Node::update_input) would accept
    /// `value`, without assigning it. Must agree with `update_input`.
    fn check_input(&self, _value: &Tensor) -> Result<(), NeuraGraphError> {
        Err(NeuraGraphError::NotAnInputNode(self.name().to_string()))
    }

    /// Index-aware variant used by the iterated training loop.
    ///
    /// `batch` holds one sample per entry along its outermost dimension; the
    /// default picks sample `step % batch_len` and forwards it to
    /// [`update_input`](Node::update_input), cycling through the data set.
    fn update_inputs(&mut self, batch: &Tensor, step: usize) -> Result<(), NeuraGraphError> {
        let sample = sample_at(batch, step)?;
        self.update_input(&sample)
    }

    /// Counterpart of [`check_input`](Node::check_input) for
    /// [`update_inputs`](Node::update_inputs).
    fn check_inputs(&self, batch: &Tensor, step: usize) -> Result<(), NeuraGraphError> {
        let sample = sample_at(batch, step)?;
        self.check_input(&sample)
    }
}

fn sample_at(batch: &Tensor, step: usize) -> Result<Tensor, NeuraGraphError> {
    let len = batch.shape().first().copied().unwrap_or(0);
    if len == 0 {
        return Err(NeuraGraphError::EmptyBatch);
    }
    batch.select_outer(step % len)
}
