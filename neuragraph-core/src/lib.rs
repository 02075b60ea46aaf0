// Core modules of the crate
pub mod buffer;
pub mod config;
pub mod graph;
pub mod network;
pub mod nodes;
pub mod tensor;

pub mod error;

#[cfg(test)]
mod test_utils;

// Re-export the main types so they are reachable as `neuragraph_core::Network` etc.
pub use buffer::TrainableData;
pub use config::TrainingConfig;
pub use error::NeuraGraphError;
pub use graph::{Node, NodeId, Traversal, Visitor};
pub use network::Network;
pub use tensor::Tensor;
