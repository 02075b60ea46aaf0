// Visitors used by the network's control loop.

use crate::error::NeuraGraphError;
use crate::graph::{Graph, NodeId, Visitor};

/// Recomputes outputs, inputs first.
pub(crate) struct ForwardPass;

impl Visitor<Graph> for ForwardPass {
    fn post(&mut self, graph: &mut Graph, id: NodeId) -> Result<(), NeuraGraphError> {
        graph.forward_node(id)
    }
}

/// Propagates gradients, consumers first.
pub(crate) struct BackwardPass;

impl Visitor<Graph> for BackwardPass {
    fn pre(&mut self, graph: &mut Graph, id: NodeId) -> Result<(), NeuraGraphError> {
        graph.backward_node(id)
    }
}

/// Writes `name->` for every node into the context string. Read-only with
/// respect to the graph.
pub(crate) struct PrinterPass<'g> {
    pub(crate) graph: &'g Graph,
}

impl Visitor<String> for PrinterPass<'_> {
    fn post(&mut self, out: &mut String, id: NodeId) -> Result<(), NeuraGraphError> {
        out.push_str(self.graph.name(id)?);
        out.push_str("->");
        Ok(())
    }
}
