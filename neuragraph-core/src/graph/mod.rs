// src/graph/mod.rs
//! Node arena, handles and the traversal primitive shared by every pass.

use crate::buffer::TrainableData;
use crate::error::NeuraGraphError;
use crate::tensor::{self, Tensor};
use std::sync::atomic::{AtomicU64, Ordering};

pub mod node;
pub(crate) mod passes;
pub mod traversal;
pub mod visitor;

pub use node::Node;
pub use traversal::Traversal;
pub use visitor::Visitor;

static NEXT_GRAPH_ID: AtomicU64 = AtomicU64::new(0);

/// Handle to a node stored in a [`Graph`].
///
/// Handles carry the identity of the graph that issued them so that a handle
/// from one network is rejected by every other network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    graph: u64,
    index: usize,
}

impl NodeId {
    /// Position of the node in its graph, in creation order.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Arena owning every node together with its output, its per-pass gradient
/// and its optional parameter buffer.
///
/// Nodes refer to their inputs by [`NodeId`] only. Inputs must already exist
/// when a node is added, so a graph built through [`Graph::add`] is acyclic.
#[derive(Debug)]
pub struct Graph {
    id: u64,
    nodes: Vec<Box<dyn Node>>,
    inputs: Vec<Vec<NodeId>>,
    outputs: Vec<Tensor>,
    gradients: Vec<Tensor>,
    params: Vec<Option<TrainableData>>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            id: NEXT_GRAPH_ID.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            gradients: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Handles of every node, in creation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(move |index| NodeId {
            graph: self.id,
            index,
        })
    }

    /// Validates a handle and returns its arena index.
    pub fn check(&self, id: NodeId) -> Result<usize, NeuraGraphError> {
        if id.graph != self.id {
            return Err(NeuraGraphError::ForeignNode {
                index: id.index,
                graph: id.graph,
                expected: self.id,
            });
        }
        if id.index >= self.nodes.len() {
            return Err(NeuraGraphError::UnknownNode(id.index));
        }
        Ok(id.index)
    }

    /// Takes ownership of `node`, wiring it to `inputs` and storing `params`
    /// next to it.
    ///
    /// # Errors
    /// `ForeignNode` / `UnknownNode` if any input is not a node of this graph.
    pub fn add(
        &mut self,
        node: Box<dyn Node>,
        inputs: &[NodeId],
        params: Option<TrainableData>,
    ) -> Result<NodeId, NeuraGraphError> {
        for &input in inputs {
            self.check(input)?;
        }
        let shape = node.output_shape().to_vec();
        let id = NodeId {
            graph: self.id,
            index: self.nodes.len(),
        };
        self.nodes.push(node);
        self.inputs.push(inputs.to_vec());
        self.outputs.push(tensor::zeros(&shape));
        self.gradients.push(tensor::zeros(&shape));
        self.params.push(params);
        Ok(id)
    }

    pub fn name(&self, id: NodeId) -> Result<&str, NeuraGraphError> {
        let i = self.check(id)?;
        Ok(self.nodes[i].name())
    }

    pub fn inputs(&self, id: NodeId) -> Result<&[NodeId], NeuraGraphError> {
        let i = self.check(id)?;
        Ok(&self.inputs[i])
    }

    /// Output computed by the most recent forward pass (zeros before the
    /// first one).
    pub fn output(&self, id: NodeId) -> Result<&Tensor, NeuraGraphError> {
        let i = self.check(id)?;
        Ok(&self.outputs[i])
    }

    /// Gradient flowing into the node's output during the last backward pass.
    pub fn gradient(&self, id: NodeId) -> Result<&Tensor, NeuraGraphError> {
        let i = self.check(id)?;
        Ok(&self.gradients[i])
    }

    pub fn params(&self, id: NodeId) -> Result<Option<&TrainableData>, NeuraGraphError> {
        let i = self.check(id)?;
        Ok(self.params[i].as_ref())
    }

    pub(crate) fn params_mut(
        &mut self,
        id: NodeId,
    ) -> Result<Option<&mut TrainableData>, NeuraGraphError> {
        let i = self.check(id)?;
        Ok(self.params[i].as_mut())
    }

    pub fn update_input(&mut self, id: NodeId, value: &Tensor) -> Result<(), NeuraGraphError> {
        let i = self.check(id)?;
        self.nodes[i].update_input(value)
    }

    pub fn check_input(&self, id: NodeId, value: &Tensor) -> Result<(), NeuraGraphError> {
        let i = self.check(id)?;
        self.nodes[i].check_input(value)
    }

    pub fn check_inputs(
        &self,
        id: NodeId,
        batch: &Tensor,
        step: usize,
    ) -> Result<(), NeuraGraphError> {
        let i = self.check(id)?;
        self.nodes[i].check_inputs(batch, step)
    }

    pub fn update_inputs(
        &mut self,
        id: NodeId,
        batch: &Tensor,
        step: usize,
    ) -> Result<(), NeuraGraphError> {
        let i = self.check(id)?;
        self.nodes[i].update_inputs(batch, step)
    }

    /// Walks the graph reachable from `root`, see [`Traversal::run`].
    pub fn visit<V>(&mut self, root: NodeId, visitor: &mut V) -> Result<(), NeuraGraphError>
    where
        V: Visitor<Graph> + ?Sized,
    {
        let traversal = Traversal::new(self, root)?;
        traversal.run(self, visitor)
    }

    /// Recomputes one node's output from its inputs' current outputs.
    pub(crate) fn forward_node(&mut self, id: NodeId) -> Result<(), NeuraGraphError> {
        let i = self.check(id)?;
        let inputs: Vec<&Tensor> = self.inputs[i]
            .iter()
            .map(|input| &self.outputs[input.index])
            .collect();
        let output = self.nodes[i].forward(&inputs, self.params[i].as_ref())?;
        self.outputs[i] = output;
        Ok(())
    }

    /// Runs one node's backward rule and adds the returned gradients to its
    /// inputs' gradients.
    pub(crate) fn backward_node(&mut self, id: NodeId) -> Result<(), NeuraGraphError> {
        let i = self.check(id)?;
        let inputs: Vec<&Tensor> = self.inputs[i]
            .iter()
            .map(|input| &self.outputs[input.index])
            .collect();
        let input_grads = self.nodes[i].backward(
            &inputs,
            &self.outputs[i],
            &self.gradients[i],
            self.params[i].as_mut(),
        )?;
        if input_grads.len() != self.inputs[i].len() {
            return Err(NeuraGraphError::GradientCountMismatch {
                node: self.nodes[i].name().to_string(),
                expected: self.inputs[i].len(),
                actual: input_grads.len(),
            });
        }
        for (input, grad) in self.inputs[i].iter().zip(&input_grads) {
            self.gradients[input.index].add_assign(grad)?;
        }
        Ok(())
    }

    /// Zeroes the per-pass gradient of every node the traversal reaches and
    /// seeds the root with ones (dRoot/dRoot).
    pub(crate) fn reset_gradients(&mut self, traversal: &Traversal) {
        for id in traversal.order() {
            let shape = self.outputs[id.index].shape().to_vec();
            self.gradients[id.index] = tensor::zeros(&shape);
        }
        let root = traversal.root().index;
        self.gradients[root].fill(1.0);
    }

    #[cfg(test)]
    pub(crate) fn rewire(&mut self, id: NodeId, inputs: Vec<NodeId>) {
        self.inputs[id.index] = inputs;
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
