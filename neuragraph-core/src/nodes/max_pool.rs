use crate::buffer::TrainableData;
use crate::error::NeuraGraphError;
use crate::graph::Node;
use crate::nodes::{expect_image, single_input, window_extent};
use crate::tensor::{self, Tensor};

/// Spatial max pooling over a `[width, height, depth]` input, per channel.
///
/// The forward pass remembers which input element won each window so the
/// backward pass can route the gradient to it.
#[derive(Debug)]
pub struct MaxPoolNode {
    in_shape: Vec<usize>,
    out_shape: Vec<usize>,
    filter: usize,
    stride: usize,
    pad: usize,
    // (x, y) of the winning input element for each output element.
    switches: Vec<(usize, usize)>,
}

impl MaxPoolNode {
    pub fn new(
        input_shape: &[usize],
        filter: usize,
        stride: usize,
        pad: usize,
    ) -> Result<Self, NeuraGraphError> {
        expect_image("MaxPool", input_shape)?;
        if pad >= filter {
            return Err(NeuraGraphError::InvalidNodeParameters(format!(
                "padding {} must be smaller than the filter size {}",
                pad, filter
            )));
        }
        let out_x = window_extent(input_shape[0], filter, stride, pad)?;
        let out_y = window_extent(input_shape[1], filter, stride, pad)?;
        let out_shape = vec![out_x, out_y, input_shape[2]];
        let numel: usize = out_shape.iter().product();
        Ok(MaxPoolNode {
            in_shape: input_shape.to_vec(),
            out_shape,
            filter,
            stride,
            pad,
            switches: vec![(0, 0); numel],
        })
    }

    fn switch_index(&self, ox: usize, oy: usize, z: usize) -> usize {
        (ox * self.out_shape[1] + oy) * self.out_shape[2] + z
    }
}

impl Node for MaxPoolNode {
    fn name(&self) -> &str {
        "MaxPool"
    }

    fn output_shape(&self) -> &[usize] {
        &self.out_shape
    }

    fn forward(
        &mut self,
        inputs: &[&Tensor],
        _params: Option<&TrainableData>,
    ) -> Result<Tensor, NeuraGraphError> {
        let input = single_input(self.name(), inputs)?;
        if input.shape() != self.in_shape.as_slice() {
            return Err(NeuraGraphError::ShapeMismatch {
                expected: self.in_shape.clone(),
                actual: input.shape().to_vec(),
                operation: "MaxPoolNode::forward".to_string(),
            });
        }

        let (in_x, in_y) = (self.in_shape[0] as isize, self.in_shape[1] as isize);
        let mut out = tensor::zeros(&self.out_shape);
        for z in 0..self.out_shape[2] {
            for ox in 0..self.out_shape[0] {
                for oy in 0..self.out_shape[1] {
                    let x0 = (ox * self.stride) as isize - self.pad as isize;
                    let y0 = (oy * self.stride) as isize - self.pad as isize;
                    let mut best: Option<(f32, usize, usize)> = None;
                    for fx in 0..self.filter as isize {
                        for fy in 0..self.filter as isize {
                            let (x, y) = (x0 + fx, y0 + fy);
                            if x < 0 || y < 0 || x >= in_x || y >= in_y {
                                continue;
                            }
                            let v = input.at3(x as usize, y as usize, z);
                            if best.map_or(true, |(b, _, _)| v > b) {
                                best = Some((v, x as usize, y as usize));
                            }
                        }
                    }
                    // pad < filter guarantees at least one tap per window.
                    let (v, x, y) = best.ok_or_else(|| {
                        NeuraGraphError::InvalidNodeParameters("empty pooling window".to_string())
                    })?;
                    *out.at3_mut(ox, oy, z) = v;
                    let s = self.switch_index(ox, oy, z);
                    self.switches[s] = (x, y);
                }
            }
        }
        Ok(out)
    }

    fn backward(
        &mut self,
        inputs: &[&Tensor],
        _output: &Tensor,
        grad_output: &Tensor,
        _params: Option<&mut TrainableData>,
    ) -> Result<Vec<Tensor>, NeuraGraphError> {
        single_input(self.name(), inputs)?;
        if grad_output.shape() != self.out_shape.as_slice() {
            return Err(NeuraGraphError::ShapeMismatch {
                expected: self.out_shape.clone(),
                actual: grad_output.shape().to_vec(),
                operation: "MaxPoolNode::backward".to_string(),
            });
        }
        let mut dx = tensor::zeros(&self.in_shape);
        for z in 0..self.out_shape[2] {
            for ox in 0..self.out_shape[0] {
                for oy in 0..self.out_shape[1] {
                    let (x, y) = self.switches[self.switch_index(ox, oy, z)];
                    *dx.at3_mut(x, y, z) += grad_output.at3(ox, oy, z);
                }
            }
        }
        Ok(vec![dx])
    }
}
