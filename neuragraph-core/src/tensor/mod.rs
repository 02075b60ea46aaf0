// src/tensor/mod.rs
//! Dense row-major `f32` tensor used as the value container between nodes.

use crate::error::NeuraGraphError;

pub mod create;
mod debug;

pub use create::{full, ones, randn, zeros};

/// A contiguous, row-major tensor of `f32` values.
///
/// Image-like tensors use the `[width, height, depth]` layout and are
/// addressed with [`Tensor::get`] / [`Tensor::set`] as `[x, y, z]`.
#[derive(Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    /// Creates a tensor from a flat data vector and a shape.
    ///
    /// # Errors
    /// Returns `TensorCreationError` if `data.len()` does not match the number
    /// of elements described by `shape`.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Result<Self, NeuraGraphError> {
        let numel: usize = shape.iter().product();
        if data.len() != numel {
            return Err(NeuraGraphError::TensorCreationError {
                data_len: data.len(),
                shape,
            });
        }
        Ok(Tensor { shape, data })
    }

    /// Creates a single-element tensor of shape `[1]`.
    pub fn scalar(value: f32) -> Self {
        Tensor {
            shape: vec![1],
            data: vec![value],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Returns the first element; used for scalar-like tensors.
    pub fn item(&self) -> Option<f32> {
        self.data.first().copied()
    }

    /// Reads the element at a multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Result<f32, NeuraGraphError> {
        let offset = self.offset(index)?;
        Ok(self.data[offset])
    }

    /// Writes the element at a multi-dimensional index.
    pub fn set(&mut self, index: &[usize], value: f32) -> Result<(), NeuraGraphError> {
        let offset = self.offset(index)?;
        self.data[offset] = value;
        Ok(())
    }

    fn offset(&self, index: &[usize]) -> Result<usize, NeuraGraphError> {
        if index.len() != self.shape.len() || index.iter().zip(&self.shape).any(|(i, d)| i >= d) {
            return Err(NeuraGraphError::IndexOutOfBounds {
                index: index.to_vec(),
                shape: self.shape.clone(),
            });
        }
        Ok(index
            .iter()
            .zip(&self.shape)
            .fold(0, |acc, (i, d)| acc * d + i))
    }

    /// Unchecked accessor for rank-3 `[x, y, z]` tensors. Callers validate
    /// dimensions up front.
    #[inline]
    pub(crate) fn at3(&self, x: usize, y: usize, z: usize) -> f32 {
        self.data[(x * self.shape[1] + y) * self.shape[2] + z]
    }

    #[inline]
    pub(crate) fn at3_mut(&mut self, x: usize, y: usize, z: usize) -> &mut f32 {
        let idx = (x * self.shape[1] + y) * self.shape[2] + z;
        &mut self.data[idx]
    }

    /// Fills every element with `value`.
    pub fn fill(&mut self, value: f32) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    /// Element-wise `self += other`. Both tensors must have the same shape.
    pub fn add_assign(&mut self, other: &Tensor) -> Result<(), NeuraGraphError> {
        self.check_same_shape(other, "add_assign")?;
        self.data
            .iter_mut()
            .zip(&other.data)
            .for_each(|(a, b)| *a += b);
        Ok(())
    }

    /// Element-wise product, returning a new tensor.
    pub fn mul(&self, other: &Tensor) -> Result<Tensor, NeuraGraphError> {
        self.check_same_shape(other, "mul")?;
        let data = self.data.iter().zip(&other.data).map(|(a, b)| a * b).collect();
        Ok(Tensor {
            shape: self.shape.clone(),
            data,
        })
    }

    /// Applies `f` to every element, returning a new tensor of the same shape.
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Tensor {
        Tensor {
            shape: self.shape.clone(),
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Index of the largest element (first one on ties).
    pub fn argmax(&self) -> Option<usize> {
        self.data
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((i, v)),
            })
            .map(|(i, _)| i)
    }

    /// Selects the `index`-th sub-tensor along the outermost dimension.
    ///
    /// A tensor of shape `[n, d1, d2]` yields a tensor of shape `[d1, d2]`;
    /// a rank-1 tensor of shape `[n]` yields a scalar of shape `[1]`.
    pub fn select_outer(&self, index: usize) -> Result<Tensor, NeuraGraphError> {
        let outer = *self.shape.first().ok_or(NeuraGraphError::EmptyBatch)?;
        if index >= outer {
            return Err(NeuraGraphError::IndexOutOfBounds {
                index: vec![index],
                shape: self.shape.clone(),
            });
        }
        let inner_shape: Vec<usize> = if self.shape.len() == 1 {
            vec![1]
        } else {
            self.shape[1..].to_vec()
        };
        let stride: usize = self.shape[1..].iter().product();
        let start = index * stride;
        Tensor::new(self.data[start..start + stride].to_vec(), inner_shape)
    }

    /// Returns a copy with a new shape holding the same number of elements.
    pub fn reshape(&self, shape: Vec<usize>) -> Result<Tensor, NeuraGraphError> {
        let numel: usize = shape.iter().product();
        if numel != self.numel() {
            return Err(NeuraGraphError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: shape,
                operation: "reshape".to_string(),
            });
        }
        Ok(Tensor {
            shape,
            data: self.data.clone(),
        })
    }

    pub(crate) fn check_same_shape(
        &self,
        other: &Tensor,
        operation: &str,
    ) -> Result<(), NeuraGraphError> {
        if self.shape != other.shape {
            return Err(NeuraGraphError::ShapeMismatch {
                expected: self.shape.clone(),
                actual: other.shape.clone(),
                operation: operation.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tensor_test.rs"]
mod tests;
