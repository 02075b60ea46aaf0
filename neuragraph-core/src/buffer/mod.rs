// src/buffer/mod.rs
// Trainable parameter storage owned by nodes with learnable weights.

pub mod trainable;

pub use trainable::TrainableData;
