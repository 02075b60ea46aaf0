// src/tensor/debug.rs
use crate::tensor::Tensor;
use std::fmt;

// Large tensors are truncated in diagnostic output.
const PREVIEW_LEN: usize = 16;

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor(shape={:?}, data=", self.shape)?;
        write_preview(f, &self.data)?;
        write!(f, ")")
    }
}

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ", self.shape)?;
        write_preview(f, &self.data)
    }
}

fn write_preview(f: &mut fmt::Formatter<'_>, data: &[f32]) -> fmt::Result {
    write!(f, "[")?;
    for (i, v) in data.iter().take(PREVIEW_LEN).enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{:.4}", v)?;
    }
    if data.len() > PREVIEW_LEN {
        write!(f, ", ... ({} more)", data.len() - PREVIEW_LEN)?;
    }
    write!(f, "]")
}
