//! Separable Gaussian smoothing of density grids.
//!
//! Both passes use a normalized 1-D kernel with `sigma = size / 3`. Taps that
//! fall outside the grid are skipped without renormalizing, so mass near the
//! border fades slightly instead of wrapping or reflecting.

use crate::density::DensityGrid;
use crate::util::math::odd_kernel_size;

/// Builds a normalized 1-D Gaussian kernel.
///
/// Even sizes are rounded up to the next odd size so the kernel has a centre
/// tap. A size of 0 or 1 yields the identity kernel `[1.0]`.
pub fn gaussian_kernel_1d(size: usize) -> Vec<f32> {
    if size <= 1 {
        return vec![1.0];
    }
    let size = odd_kernel_size(size);
    let sigma = size as f32 / 3.0;
    let half = (size / 2) as isize;
    let two_sigma2 = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| {
            let d = i as f32;
            (-(d * d) / two_sigma2).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for tap in kernel.iter_mut() {
        *tap /= sum;
    }
    kernel
}

pub(crate) fn blur_row_horizontal(src: &[f32], dst: &mut [f32], kernel: &[f32]) {
    let width = src.len();
    let half = kernel.len() / 2;
    for (x, out) in dst.iter_mut().enumerate() {
        let mut acc = 0.0f32;
        for (k, tap) in kernel.iter().enumerate() {
            let Some(xx) = (x + k).checked_sub(half) else {
                continue;
            };
            if xx < width {
                acc += src[xx] * tap;
            }
        }
        *out = acc;
    }
}

pub(crate) fn blur_row_vertical(
    src: &[f32],
    width: usize,
    height: usize,
    y: usize,
    dst: &mut [f32],
    kernel: &[f32],
) {
    let half = kernel.len() / 2;
    dst.fill(0.0);
    for (k, tap) in kernel.iter().enumerate() {
        let Some(yy) = (y + k).checked_sub(half) else {
            continue;
        };
        if yy >= height {
            continue;
        }
        let src_row = &src[yy * width..(yy + 1) * width];
        for (out, value) in dst.iter_mut().zip(src_row) {
            *out += value * tap;
        }
    }
}

/// Blurs the grid in place: one horizontal pass, then one vertical pass.
pub fn separable_blur(grid: &mut DensityGrid, kernel_size: usize) {
    let kernel = gaussian_kernel_1d(kernel_size);
    if kernel.len() == 1 {
        return;
    }
    let width = grid.width();
    let height = grid.height();
    let mut scratch = vec![0.0f32; width * height];

    for (src, dst) in grid
        .as_slice()
        .chunks_exact(width)
        .zip(scratch.chunks_exact_mut(width))
    {
        blur_row_horizontal(src, dst, &kernel);
    }
    for (y, dst) in grid.as_mut_slice().chunks_exact_mut(width).enumerate() {
        blur_row_vertical(&scratch, width, height, y, dst, &kernel);
    }
}
