// src/network.rs
//! Owner of a computation graph and the training control loop around it.

use crate::buffer::TrainableData;
use crate::config::TrainingConfig;
use crate::error::NeuraGraphError;
use crate::graph::passes::{BackwardPass, ForwardPass, PrinterPass};
use crate::graph::{Graph, Node, NodeId, Traversal};
use crate::nodes::{
    ArrayNode, ConvNode, FullyConnectedNode, MaxPoolNode, RegressionNode, ReluNode, SigmoidNode,
    SoftMaxNode,
};
use crate::tensor::Tensor;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// A trainable network: the node arena, the buffers registered with it and
/// the batching state.
///
/// Every node is created through the network and addressed by the
/// [`NodeId`] the factory returns. Nodes that own learnable weights have
/// their buffer stored next to them and registered for batched updates at
/// creation time.
#[derive(Debug)]
pub struct Network {
    graph: Graph,
    // Nodes owning a parameter buffer, in creation order.
    registry: Vec<NodeId>,
    config: TrainingConfig,
    train_counter: usize,
    rng: StdRng,
}

impl Network {
    /// Creates an empty network whose weights are seeded from OS entropy.
    ///
    /// # Errors
    /// `InvalidConfig` if `config` does not validate.
    pub fn new(config: TrainingConfig) -> Result<Self, NeuraGraphError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Creates an empty network with a deterministic weight initialisation.
    pub fn with_seed(config: TrainingConfig, seed: u64) -> Result<Self, NeuraGraphError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: TrainingConfig, rng: StdRng) -> Result<Self, NeuraGraphError> {
        config.validate()?;
        Ok(Network {
            graph: Graph::new(),
            registry: Vec::new(),
            config,
            train_counter: 0,
            rng,
        })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Replaces the training configuration. Takes effect at the next batch
    /// boundary check.
    pub fn set_config(&mut self, config: TrainingConfig) -> Result<(), NeuraGraphError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Number of training steps taken so far, across both training entry
    /// points.
    pub fn step_count(&self) -> usize {
        self.train_counter
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    pub fn name(&self, id: NodeId) -> Result<&str, NeuraGraphError> {
        self.graph.name(id)
    }

    pub fn output(&self, id: NodeId) -> Result<&Tensor, NeuraGraphError> {
        self.graph.output(id)
    }

    pub fn gradient(&self, id: NodeId) -> Result<&Tensor, NeuraGraphError> {
        self.graph.gradient(id)
    }

    pub fn params(&self, id: NodeId) -> Result<Option<&TrainableData>, NeuraGraphError> {
        self.graph.params(id)
    }

    /// Nodes whose buffers take part in batched updates, in creation order.
    pub fn registered(&self) -> &[NodeId] {
        &self.registry
    }

    /// Adds a node of any kind, taking ownership of it.
    ///
    /// When `params` is given the buffer is stored with the node and
    /// registered for batched updates.
    ///
    /// # Errors
    /// `ForeignNode` / `UnknownNode` if an input is not a node of this network.
    pub fn add_node(
        &mut self,
        node: Box<dyn Node>,
        inputs: &[NodeId],
        params: Option<TrainableData>,
    ) -> Result<NodeId, NeuraGraphError> {
        let trainable = params.is_some();
        let id = self.graph.add(node, inputs, params)?;
        if trainable {
            self.registry.push(id);
        }
        debug!(
            "Network: added {} #{} (inputs: {:?}, trainable: {})",
            self.graph.name(id)?,
            id.index(),
            inputs.iter().map(NodeId::index).collect::<Vec<_>>(),
            trainable
        );
        Ok(id)
    }

    fn input_shape(&self, input: NodeId) -> Result<Vec<usize>, NeuraGraphError> {
        Ok(self.graph.output(input)?.shape().to_vec())
    }

    /// Creates an input holder of shape `dims`.
    pub fn create_array_node(&mut self, dims: &[usize]) -> Result<NodeId, NeuraGraphError> {
        let node = ArrayNode::new(dims)?;
        self.add_node(Box::new(node), &[], None)
    }

    /// Creates a dense layer producing `out_depth` values from `input`.
    pub fn create_fully_connected_node(
        &mut self,
        input: NodeId,
        out_depth: usize,
    ) -> Result<NodeId, NeuraGraphError> {
        let shape = self.input_shape(input)?;
        let (node, params) = FullyConnectedNode::new(&shape, out_depth, &mut self.rng)?;
        self.add_node(Box::new(node), &[input], Some(params))
    }

    /// Creates a convolution over a `[width, height, depth]` input.
    pub fn create_conv_node(
        &mut self,
        input: NodeId,
        out_depth: usize,
        filter_size: usize,
        stride: usize,
        pad: usize,
    ) -> Result<NodeId, NeuraGraphError> {
        let shape = self.input_shape(input)?;
        let (node, params) =
            ConvNode::new(&shape, out_depth, filter_size, stride, pad, &mut self.rng)?;
        self.add_node(Box::new(node), &[input], Some(params))
    }

    pub fn create_max_pool_node(
        &mut self,
        input: NodeId,
        filter_size: usize,
        stride: usize,
        pad: usize,
    ) -> Result<NodeId, NeuraGraphError> {
        let shape = self.input_shape(input)?;
        let node = MaxPoolNode::new(&shape, filter_size, stride, pad)?;
        self.add_node(Box::new(node), &[input], None)
    }

    pub fn create_relu_node(&mut self, input: NodeId) -> Result<NodeId, NeuraGraphError> {
        let shape = self.input_shape(input)?;
        self.add_node(Box::new(ReluNode::new(&shape)), &[input], None)
    }

    pub fn create_sigmoid_node(&mut self, input: NodeId) -> Result<NodeId, NeuraGraphError> {
        let shape = self.input_shape(input)?;
        self.add_node(Box::new(SigmoidNode::new(&shape)), &[input], None)
    }

    pub fn create_softmax_node(&mut self, input: NodeId) -> Result<NodeId, NeuraGraphError> {
        let shape = self.input_shape(input)?;
        self.add_node(Box::new(SoftMaxNode::new(&shape)), &[input], None)
    }

    pub fn create_regression_node(&mut self, input: NodeId) -> Result<NodeId, NeuraGraphError> {
        let shape = self.input_shape(input)?;
        self.add_node(Box::new(RegressionNode::new(&shape)), &[input], None)
    }

    /// Validates a request before any state is touched.
    fn check_request(
        &self,
        root: NodeId,
        nodes: &[NodeId],
        inputs: &[&Tensor],
    ) -> Result<(), NeuraGraphError> {
        if nodes.len() != inputs.len() {
            return Err(NeuraGraphError::InputCountMismatch {
                nodes: nodes.len(),
                inputs: inputs.len(),
            });
        }
        self.graph.check(root)?;
        for &node in nodes {
            self.graph.check(node)?;
        }
        Ok(())
    }

    /// Runs `iterations` training steps, feeding `nodes[i]` the sample of
    /// `inputs[i]` selected by the running step counter.
    ///
    /// Each entry of `inputs` is a data set with one sample per entry along
    /// its outermost dimension; successive steps cycle through it.
    ///
    /// # Errors
    /// `InputCountMismatch` or `ForeignNode` before anything runs; otherwise
    /// the first error raised by a node aborts the loop.
    pub fn train(
        &mut self,
        root: NodeId,
        iterations: usize,
        nodes: &[NodeId],
        inputs: &[&Tensor],
    ) -> Result<(), NeuraGraphError> {
        self.check_request(root, nodes, inputs)?;
        for _ in 0..iterations {
            // Every sample is validated before any node is assigned.
            for (&node, batch) in nodes.iter().zip(inputs) {
                self.graph.check_inputs(node, batch, self.train_counter)?;
            }
            for (&node, batch) in nodes.iter().zip(inputs) {
                self.graph.update_inputs(node, batch, self.train_counter)?;
            }
            self.step(root)?;
            self.flush_if_batch_end();
        }
        Ok(())
    }

    /// Runs a single training step with `inputs[i]` assigned to `nodes[i]`.
    pub fn train_once(
        &mut self,
        root: NodeId,
        nodes: &[NodeId],
        inputs: &[&Tensor],
    ) -> Result<(), NeuraGraphError> {
        self.check_request(root, nodes, inputs)?;
        self.assign_inputs(nodes, inputs)?;
        self.step(root)?;
        self.flush_if_batch_end();
        Ok(())
    }

    /// Assigns `inputs` and recomputes every output reachable from `root`.
    ///
    /// Leaves gradients, buffers and the step counter untouched; the result
    /// is read with [`Network::output`].
    pub fn infer(
        &mut self,
        root: NodeId,
        nodes: &[NodeId],
        inputs: &[&Tensor],
    ) -> Result<(), NeuraGraphError> {
        self.check_request(root, nodes, inputs)?;
        self.assign_inputs(nodes, inputs)?;
        self.graph.visit(root, &mut ForwardPass)
    }

    fn assign_inputs(&mut self, nodes: &[NodeId], inputs: &[&Tensor]) -> Result<(), NeuraGraphError> {
        for (&node, value) in nodes.iter().zip(inputs) {
            self.graph.check_input(node, value)?;
        }
        for (&node, value) in nodes.iter().zip(inputs) {
            self.graph.update_input(node, value)?;
        }
        Ok(())
    }

    /// One forward and one backward pass from `root`, then counts the step.
    ///
    /// A backward pass that fails part way leaves every registered buffer as
    /// it was before the step, so the batch only ever holds the
    /// contributions of counted steps.
    fn step(&mut self, root: NodeId) -> Result<(), NeuraGraphError> {
        let traversal = Traversal::new(&self.graph, root)?;
        traversal.run(&mut self.graph, &mut ForwardPass)?;
        self.graph.reset_gradients(&traversal);

        let saved = self.snapshot_gradients()?;
        if let Err(e) = traversal.run(&mut self.graph, &mut BackwardPass) {
            warn!(
                "Network: backward pass failed at step {}, discarding its contributions: {}",
                self.train_counter, e
            );
            self.restore_gradients(&saved)?;
            return Err(e);
        }
        self.train_counter += 1;
        Ok(())
    }

    fn snapshot_gradients(&self) -> Result<Vec<(NodeId, Tensor)>, NeuraGraphError> {
        let mut saved = Vec::with_capacity(self.registry.len());
        for &id in &self.registry {
            if let Some(params) = self.graph.params(id)? {
                saved.push((id, params.gradient().clone()));
            }
        }
        Ok(saved)
    }

    fn restore_gradients(&mut self, saved: &[(NodeId, Tensor)]) -> Result<(), NeuraGraphError> {
        for (id, gradient) in saved {
            if let Some(params) = self.graph.params_mut(*id)? {
                params.restore_gradient(gradient)?;
            }
        }
        Ok(())
    }

    /// At a batch boundary, updates then clears every registered buffer in
    /// registration order.
    fn flush_if_batch_end(&mut self) {
        if self.train_counter % self.config.batch_size != 0 {
            return;
        }
        debug!(
            "Network: step {} closes a batch, updating {} buffer(s)",
            self.train_counter,
            self.registry.len()
        );
        for &id in &self.registry {
            // Registered ids were issued by this graph.
            if let Ok(Some(params)) = self.graph.params_mut(id) {
                params.train(&self.config);
            }
        }
        for &id in &self.registry {
            if let Ok(Some(params)) = self.graph.params_mut(id) {
                params.clear_gradient();
            }
        }
    }

    /// Renders the node names reachable from `root` in dependency order,
    /// followed by the content of every registered buffer.
    ///
    /// Purely observational: nothing is recomputed.
    pub fn dump(&self, root: NodeId) -> Result<String, NeuraGraphError> {
        let traversal = Traversal::new(&self.graph, root)?;
        let mut out = String::from("Network structure:");
        traversal.run(&mut out, &mut PrinterPass { graph: &self.graph })?;
        out.push_str("\nBuffers content:\n");
        for &id in &self.registry {
            if let Some(params) = self.graph.params(id)? {
                out.push_str(&params.dump());
                out.push('\n');
            }
        }
        info!("{}", out);
        Ok(out)
    }
}

#[cfg(test)]
#[path = "network_test.rs"]
mod tests;
