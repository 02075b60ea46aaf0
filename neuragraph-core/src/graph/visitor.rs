use crate::error::NeuraGraphError;
use crate::graph::NodeId;

/// Dual-hook callback driven by [`Traversal::run`](crate::graph::Traversal::run).
///
/// `pre` fires in backward dependency order (a consumer before its inputs),
/// `post` in forward dependency order (inputs before their consumers). Each
/// fires exactly once per reachable node. Implementors override only the hook
/// they need; `C` is whatever mutable context the hooks operate on.
pub trait Visitor<C: ?Sized> {
    fn pre(&mut self, _ctx: &mut C, _id: NodeId) -> Result<(), NeuraGraphError> {
        Ok(())
    }

    fn post(&mut self, _ctx: &mut C, _id: NodeId) -> Result<(), NeuraGraphError> {
        Ok(())
    }
}
