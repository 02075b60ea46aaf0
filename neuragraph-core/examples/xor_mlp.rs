//! Trains a small perceptron on XOR and prints the learned predictions.
//!
//! Run with `RUST_LOG=neuragraph_core=debug` to see every batch update.

use log::info;
use neuragraph_core::{NeuraGraphError, Network, Tensor, TrainingConfig};

fn main() -> Result<(), NeuraGraphError> {
    if let Err(e) = env_logger::builder().is_test(false).try_init() {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let config = TrainingConfig::default()
        .with_batch_size(4)
        .with_learning_rate(0.1)
        .with_momentum(0.9);
    let mut net = Network::with_seed(config, 42)?;

    let input = net.create_array_node(&[2])?;
    let hidden = net.create_fully_connected_node(input, 8)?;
    let act = net.create_sigmoid_node(hidden)?;
    let output = net.create_fully_connected_node(act, 1)?;
    let loss = net.create_regression_node(output)?;

    let inputs = Tensor::new(vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0], vec![4, 2])?;
    let targets = Tensor::new(vec![0.0, 1.0, 1.0, 0.0], vec![4, 1])?;

    for round in 0..8 {
        net.train(loss, 1000, &[input, loss], &[&inputs, &targets])?;
        info!("finished round {} ({} steps)", round, net.step_count());
    }

    for i in 0..4 {
        let sample = inputs.select_outer(i)?;
        net.infer(output, &[input], &[&sample])?;
        println!(
            "{:?} -> {:.3} (expected {})",
            sample.data(),
            net.output(output)?.item().unwrap_or(f32::NAN),
            targets.data()[i]
        );
    }

    println!("{}", net.dump(output)?);
    Ok(())
}
