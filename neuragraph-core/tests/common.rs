use neuragraph_core::{NeuraGraphError, Network, NodeId, Tensor, TrainingConfig};

// XOR truth table as a [4, 2] data set with the matching targets.
#[allow(dead_code)]
pub(crate) fn xor_dataset() -> (Tensor, Tensor, Tensor) {
    let inputs = Tensor::new(vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0], vec![4, 2])
        .expect("Test tensor creation failed");
    let targets = Tensor::new(vec![0.0, 1.0, 1.0, 0.0], vec![4, 1])
        .expect("Test tensor creation failed");
    let labels = Tensor::new(vec![0.0, 1.0, 1.0, 0.0], vec![4])
        .expect("Test tensor creation failed");
    (inputs, targets, labels)
}

/// Handles of a small `2 -> hidden -> out` perceptron.
#[allow(dead_code)]
pub(crate) struct Mlp {
    pub net: Network,
    pub input: NodeId,
    pub output: NodeId,
    pub head: NodeId,
}

// Builds input -> FC(hidden) -> Sigmoid -> FC(out) -> head, where `head`
// is a regression node for `out == 1` and a soft-max otherwise.
#[allow(dead_code)]
pub(crate) fn build_mlp(
    config: TrainingConfig,
    seed: u64,
    hidden: usize,
    out: usize,
) -> Result<Mlp, NeuraGraphError> {
    let mut net = Network::with_seed(config, seed)?;
    let input = net.create_array_node(&[2])?;
    let fc1 = net.create_fully_connected_node(input, hidden)?;
    let act = net.create_sigmoid_node(fc1)?;
    let output = net.create_fully_connected_node(act, out)?;
    let head = if out == 1 {
        net.create_regression_node(output)?
    } else {
        net.create_softmax_node(output)?
    };
    Ok(Mlp {
        net,
        input,
        output,
        head,
    })
}
