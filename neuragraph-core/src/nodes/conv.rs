use crate::buffer::TrainableData;
use crate::error::NeuraGraphError;
use crate::graph::Node;
use crate::nodes::{expect_image, init_weights, single_input, window_extent};
use crate::tensor::{self, Tensor};
use rand::Rng;

/// 2-D convolution over a `[width, height, depth]` input.
///
/// Each of the `out_depth` filters spans `filter x filter x in_depth` values.
/// The weight buffer has shape `[out_depth, filter * filter * in_depth + 1]`
/// with one bias per filter in the last column. Filter element `(fx, fy, z)`
/// lives at column `(fx * filter + fy) * in_depth + z`.
#[derive(Debug)]
pub struct ConvNode {
    in_shape: Vec<usize>,
    out_shape: Vec<usize>,
    filter: usize,
    stride: usize,
    pad: usize,
}

impl ConvNode {
    pub fn new<R: Rng + ?Sized>(
        input_shape: &[usize],
        out_depth: usize,
        filter: usize,
        stride: usize,
        pad: usize,
        rng: &mut R,
    ) -> Result<(Self, TrainableData), NeuraGraphError> {
        expect_image("Conv", input_shape)?;
        let out_x = window_extent(input_shape[0], filter, stride, pad)?;
        let out_y = window_extent(input_shape[1], filter, stride, pad)?;
        let fan_in = filter * filter * input_shape[2];
        let params = init_weights(out_depth, fan_in, rng)?;
        let node = ConvNode {
            in_shape: input_shape.to_vec(),
            out_shape: vec![out_x, out_y, out_depth],
            filter,
            stride,
            pad,
        };
        Ok((node, params))
    }

    fn fan_in(&self) -> usize {
        self.filter * self.filter * self.in_shape[2]
    }

    /// Calls `f(x, y, column)` for every in-bounds input element covered by
    /// the filter anchored at output position `(ox, oy)`.
    fn for_each_tap<F: FnMut(usize, usize, usize)>(&self, ox: usize, oy: usize, mut f: F) {
        let (in_x, in_y, in_z) = (self.in_shape[0], self.in_shape[1], self.in_shape[2]);
        let x0 = (ox * self.stride) as isize - self.pad as isize;
        let y0 = (oy * self.stride) as isize - self.pad as isize;
        for fx in 0..self.filter {
            let x = x0 + fx as isize;
            if x < 0 || x >= in_x as isize {
                continue;
            }
            for fy in 0..self.filter {
                let y = y0 + fy as isize;
                if y < 0 || y >= in_y as isize {
                    continue;
                }
                for z in 0..in_z {
                    f(x as usize, y as usize, (fx * self.filter + fy) * in_z + z);
                }
            }
        }
    }

    fn check_image(&self, input: &Tensor) -> Result<(), NeuraGraphError> {
        if input.shape() != self.in_shape.as_slice() {
            return Err(NeuraGraphError::ShapeMismatch {
                expected: self.in_shape.clone(),
                actual: input.shape().to_vec(),
                operation: "ConvNode".to_string(),
            });
        }
        Ok(())
    }
}

impl Node for ConvNode {
    fn name(&self) -> &str {
        "Conv"
    }

    fn output_shape(&self) -> &[usize] {
        &self.out_shape
    }

    fn forward(
        &mut self,
        inputs: &[&Tensor],
        params: Option<&TrainableData>,
    ) -> Result<Tensor, NeuraGraphError> {
        let input = single_input(self.name(), inputs)?;
        let params = params.ok_or_else(|| NeuraGraphError::MissingParameters(self.name().to_string()))?;
        self.check_image(input)?;

        let stride = self.fan_in() + 1;
        let weights = params.weights().data();
        let in_z = self.in_shape[2];
        let mut out = tensor::zeros(&self.out_shape);
        for d in 0..self.out_shape[2] {
            let row = &weights[d * stride..(d + 1) * stride];
            for ox in 0..self.out_shape[0] {
                for oy in 0..self.out_shape[1] {
                    let mut sum = row[stride - 1];
                    self.for_each_tap(ox, oy, |x, y, col| {
                        sum += row[col] * input.at3(x, y, col % in_z);
                    });
                    *out.at3_mut(ox, oy, d) = sum;
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
        params: Option<&mut TrainableData>,
    ) -> Result<Vec<Tensor>, NeuraGraphError> {
        let input = single_input(self.name(), inputs)?;
        let params = params.ok_or_else(|| NeuraGraphError::MissingParameters(self.name().to_string()))?;
        self.check_image(input)?;
        if grad_output.shape() != self.out_shape.as_slice() {
            return Err(NeuraGraphError::ShapeMismatch {
                expected: self.out_shape.clone(),
                actual: grad_output.shape().to_vec(),
                operation: "ConvNode::backward".to_string(),
            });
        }

        let stride = self.fan_in() + 1;
        let in_z = self.in_shape[2];
        let mut dx = tensor::zeros(&self.in_shape);
        let mut dw = tensor::zeros(params.weights().shape());
        let weights = params.weights().data();
        for d in 0..self.out_shape[2] {
            let base = d * stride;
            for ox in 0..self.out_shape[0] {
                for oy in 0..self.out_shape[1] {
                    let g = grad_output.at3(ox, oy, d);
                    if g == 0.0 {
                        continue;
                    }
                    let dw_row = &mut dw.data_mut()[base..base + stride];
                    self.for_each_tap(ox, oy, |x, y, col| {
                        let z = col % in_z;
                        *dx.at3_mut(x, y, z) += weights[base + col] * g;
                        dw_row[col] += input.at3(x, y, z) * g;
                    });
                    dw_row[stride - 1] += g;
                }
            }
        }
        params.accumulate(&dw)?;
        Ok(vec![dx])
    }
}

#[cfg(test)]
#[path = "conv_test.rs"]
mod tests;
