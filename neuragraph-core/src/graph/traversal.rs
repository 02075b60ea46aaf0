use crate::error::NeuraGraphError;
use crate::graph::{Graph, NodeId, Visitor};
use log::trace;
use std::collections::HashSet;

/// Visitation schedule for the sub-graph reachable from a root.
///
/// Built once by walking input edges depth-first; every reachable node is
/// recorded exactly once even when several consumers share it, and every
/// input is recorded before its consumers.
#[derive(Debug, Clone)]
pub struct Traversal {
    root: NodeId,
    order: Vec<NodeId>,
}

impl Traversal {
    /// Computes the schedule for `root`.
    ///
    /// # Errors
    /// * `ForeignNode` / `UnknownNode` if `root` is not a node of `graph`.
    /// * `CycleDetected` if a node is reached again while its own inputs are
    ///   still being walked.
    pub fn new(graph: &Graph, root: NodeId) -> Result<Self, NeuraGraphError> {
        graph.check(root)?;
        let mut visited = HashSet::new();
        let mut in_progress = HashSet::new();
        let mut order = Vec::new();
        build_order(graph, root, &mut visited, &mut in_progress, &mut order)?;
        trace!(
            "[traversal] root {} reaches {} nodes",
            root.index(),
            order.len()
        );
        Ok(Traversal { root, order })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Reachable nodes, inputs before consumers. The root is always last.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Invokes `visitor.pre` for every node in reverse order, then
    /// `visitor.post` for every node in order.
    ///
    /// For each edge where B is an input of A this yields `pre(A)` before
    /// `pre(B)` and `post(B)` before `post(A)`. The first hook error aborts
    /// the walk.
    pub fn run<C, V>(&self, ctx: &mut C, visitor: &mut V) -> Result<(), NeuraGraphError>
    where
        C: ?Sized,
        V: Visitor<C> + ?Sized,
    {
        for &id in self.order.iter().rev() {
            visitor.pre(ctx, id)?;
        }
        for &id in &self.order {
            visitor.post(ctx, id)?;
        }
        Ok(())
    }
}

/// Post-order DFS over input edges with an explicit stack, so the depth of
/// the graph is not bounded by the thread's stack size.
///
/// Each frame holds a node and the position of the next input to walk.
fn build_order(
    graph: &Graph,
    root: NodeId,
    visited: &mut HashSet<usize>,
    in_progress: &mut HashSet<usize>,
    order: &mut Vec<NodeId>,
) -> Result<(), NeuraGraphError> {
    let mut stack = vec![(root, 0usize)];
    in_progress.insert(root.index());
    while let Some(frame) = stack.last_mut() {
        let (node, next) = *frame;
        match graph.inputs(node)?.get(next) {
            Some(&input) => {
                frame.1 += 1;
                let index = input.index();
                if visited.contains(&index) {
                    continue;
                }
                if !in_progress.insert(index) {
                    return Err(NeuraGraphError::CycleDetected(index));
                }
                stack.push((input, 0));
            }
            None => {
                stack.pop();
                in_progress.remove(&node.index());
                visited.insert(node.index());
                order.push(node);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "traversal_test.rs"]
mod tests;
