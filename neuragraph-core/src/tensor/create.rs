use crate::error::NeuraGraphError;
use crate::tensor::Tensor;
use rand::Rng;
use rand_distr::{Distribution, Normal};

pub fn zeros(shape: &[usize]) -> Tensor {
    full(shape, 0.0)
}

pub fn ones(shape: &[usize]) -> Tensor {
    full(shape, 1.0)
}

pub fn full(shape: &[usize], value: f32) -> Tensor {
    let numel: usize = shape.iter().product();
    Tensor {
        shape: shape.to_vec(),
        data: vec![value; numel],
    }
}

/// Samples a tensor from `N(0, std^2)` using the supplied generator.
pub fn randn<R: Rng + ?Sized>(
    shape: &[usize],
    std: f32,
    rng: &mut R,
) -> Result<Tensor, NeuraGraphError> {
    let normal = Normal::new(0.0f32, std).map_err(|e| {
        NeuraGraphError::InvalidNodeParameters(format!("invalid standard deviation {}: {}", std, e))
    })?;
    let numel: usize = shape.iter().product();
    let data_vec: Vec<f32> = (0..numel).map(|_| normal.sample(rng)).collect();
    Tensor::new(data_vec, shape.to_vec())
}
