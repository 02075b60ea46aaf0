// neuragraph-core/src/graph/graph_test.rs

use super::passes::{BackwardPass, ForwardPass};
use super::*;
use crate::test_utils::SumNode;

#[test]
fn test_add_rejects_inputs_from_other_graph() -> Result<(), NeuraGraphError> {
    let mut graph = Graph::new();
    let mut other = Graph::new();
    let foreign = other.add(SumNode::boxed("x", &[1]), &[], None)?;
    let result = graph.add(SumNode::boxed("y", &[1]), &[foreign], None);
    assert!(matches!(result, Err(NeuraGraphError::ForeignNode { .. })));
    assert!(graph.is_empty());
    Ok(())
}

#[test]
fn test_outputs_start_zeroed_with_declared_shape() -> Result<(), NeuraGraphError> {
    let mut graph = Graph::new();
    let a = graph.add(SumNode::boxed("a", &[2, 3]), &[], None)?;
    assert_eq!(graph.output(a)?.shape(), &[2, 3]);
    assert!(graph.output(a)?.data().iter().all(|&v| v == 0.0));
    assert_eq!(graph.name(a)?, "a");
    assert!(graph.params(a)?.is_none());
    Ok(())
}

#[test]
fn test_forward_pass_sums_shared_input_once_per_consumer() -> Result<(), NeuraGraphError> {
    let mut graph = Graph::new();
    let a = graph.add(SumNode::boxed("a", &[2]), &[], None)?;
    let b = graph.add(SumNode::boxed("b", &[2]), &[a], None)?;
    let root = graph.add(SumNode::boxed("root", &[2]), &[a, b], None)?;
    graph.update_input(a, &Tensor::new(vec![1.0, 2.0], vec![2])?)?;

    graph.visit(root, &mut ForwardPass)?;
    assert_eq!(graph.output(b)?.data(), &[1.0, 2.0]);
    assert_eq!(graph.output(root)?.data(), &[2.0, 4.0]);
    Ok(())
}

#[test]
fn test_backward_pass_accumulates_fan_out_gradients() -> Result<(), NeuraGraphError> {
    let mut graph = Graph::new();
    let a = graph.add(SumNode::boxed("a", &[1]), &[], None)?;
    let b = graph.add(SumNode::boxed("b", &[1]), &[a], None)?;
    let c = graph.add(SumNode::boxed("c", &[1]), &[a], None)?;
    let weights = TrainableData::new(Tensor::new(vec![0.0], vec![1])?);
    let root = graph.add(SumNode::boxed("root", &[1]), &[b, c], Some(weights))?;

    graph.visit(root, &mut ForwardPass)?;
    let traversal = Traversal::new(&graph, root)?;
    graph.reset_gradients(&traversal);
    traversal.run(&mut graph, &mut BackwardPass)?;

    assert_eq!(graph.gradient(root)?.data(), &[1.0]);
    assert_eq!(graph.gradient(b)?.data(), &[1.0]);
    assert_eq!(graph.gradient(c)?.data(), &[1.0]);
    // a receives one contribution through b and one through c.
    assert_eq!(graph.gradient(a)?.data(), &[2.0]);
    let params = graph.params(root)?.ok_or(NeuraGraphError::UnknownNode(root.index()))?;
    assert_eq!(params.gradient().data(), &[1.0]);
    Ok(())
}

#[test]
fn test_reset_gradients_clears_previous_pass() -> Result<(), NeuraGraphError> {
    let mut graph = Graph::new();
    let a = graph.add(SumNode::boxed("a", &[1]), &[], None)?;
    let root = graph.add(SumNode::boxed("root", &[1]), &[a], None)?;
    graph.visit(root, &mut ForwardPass)?;

    for _ in 0..3 {
        let traversal = Traversal::new(&graph, root)?;
        graph.reset_gradients(&traversal);
        traversal.run(&mut graph, &mut BackwardPass)?;
    }
    assert_eq!(graph.gradient(a)?.data(), &[1.0]);
    Ok(())
}

#[derive(Debug)]
struct NoGradNode;

impl Node for NoGradNode {
    fn name(&self) -> &str {
        "no-grad"
    }

    fn output_shape(&self) -> &[usize] {
        &[1]
    }

    fn forward(
        &mut self,
        _inputs: &[&Tensor],
        _params: Option<&TrainableData>,
    ) -> Result<Tensor, NeuraGraphError> {
        Ok(Tensor::scalar(0.0))
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
}

#[test]
fn test_missing_input_gradient_is_an_error() -> Result<(), NeuraGraphError> {
    let mut graph = Graph::new();
    let a = graph.add(SumNode::boxed("a", &[1]), &[], None)?;
    let root = graph.add(Box::new(NoGradNode), &[a], None)?;
    graph.visit(root, &mut ForwardPass)?;
    let result = graph.visit(root, &mut BackwardPass);
    assert_eq!(
        result,
        Err(NeuraGraphError::GradientCountMismatch {
            node: "no-grad".to_string(),
            expected: 1,
            actual: 0
        })
    );
    Ok(())
}

#[test]
fn test_update_input_on_non_input_node_rejected() -> Result<(), NeuraGraphError> {
    let mut graph = Graph::new();
    let node = graph.add(Box::new(NoGradNode), &[], None)?;
    assert_eq!(
        graph.update_input(node, &Tensor::scalar(1.0)),
        Err(NeuraGraphError::NotAnInputNode("no-grad".to_string()))
    );
    Ok(())
}

#[test]
fn test_update_inputs_cycles_through_batch() -> Result<(), NeuraGraphError> {
    let mut graph = Graph::new();
    let a = graph.add(SumNode::boxed("a", &[2]), &[], None)?;
    let batch = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![3, 2])?;
    graph.update_inputs(a, &batch, 4)?;
    graph.visit(a, &mut ForwardPass)?;
    assert_eq!(graph.output(a)?.data(), &[3.0, 4.0]);

    let empty = Tensor::new(Vec::new(), vec![0, 2])?;
    assert_eq!(
        graph.update_inputs(a, &empty, 0),
        Err(NeuraGraphError::EmptyBatch)
    );
    Ok(())
}

#[test]
fn test_node_ids_in_creation_order() -> Result<(), NeuraGraphError> {
    let mut graph = Graph::new();
    let a = graph.add(SumNode::boxed("a", &[1]), &[], None)?;
    let b = graph.add(SumNode::boxed("b", &[1]), &[a], None)?;
    let ids: Vec<NodeId> = graph.node_ids().collect();
    assert_eq!(ids, vec![a, b]);
    assert_eq!(graph.inputs(b)?, &[a]);
    Ok(())
}
