use thiserror::Error;

/// Custom error type for the NeuraGraph engine.
#[derive(Error, Debug, PartialEq, Clone)] // PartialEq for easier testing
pub enum NeuraGraphError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Tensor creation error: data length {data_len} does not match shape {shape:?}")]
    TensorCreationError { data_len: usize, shape: Vec<usize> },

    #[error("Index out of bounds: index {index:?} for shape {shape:?}")]
    IndexOutOfBounds {
        index: Vec<usize>,
        shape: Vec<usize>,
    },

    #[error("Shape mismatch during gradient accumulation: expected {expected:?}, got {actual:?}")]
    GradientAccumulationShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    #[error("Mismatched argument list: {nodes} nodes but {inputs} input tensors")]
    InputCountMismatch { nodes: usize, inputs: usize },

    #[error("Node {index} belongs to graph {graph}, not to this network (graph {expected})")]
    ForeignNode {
        index: usize,
        graph: u64,
        expected: u64,
    },

    #[error("Unknown node index {0}")]
    UnknownNode(usize),

    #[error("Cycle detected in the computation graph at node {0}")]
    CycleDetected(usize),

    #[error("Node '{0}' does not accept external input")]
    NotAnInputNode(String),

    #[error("Node '{node}' returned {actual} input gradients, expected {expected}")]
    GradientCountMismatch {
        node: String,
        expected: usize,
        actual: usize,
    },

    #[error("Node '{node}' expects {expected} inputs, got {actual}")]
    ArityMismatch {
        node: String,
        expected: usize,
        actual: usize,
    },

    #[error("Node '{0}' requires a parameter buffer but none was supplied")]
    MissingParameters(String),

    #[error("Cannot select a sample from an empty batch")]
    EmptyBatch,

    #[error("Invalid training configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid node parameters: {0}")]
    InvalidNodeParameters(String),
}
