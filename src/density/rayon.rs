//! Rayon-parallel density smoothing (feature-gated).
//!
//! Rows are independent within each blur pass, so both passes fan out over
//! output rows. Results are bit-identical to [`separable_blur`] because each
//! row accumulates its taps in the same order.
//!
//! [`separable_blur`]: crate::density::blur::separable_blur

use crate::density::blur::{blur_row_horizontal, blur_row_vertical, gaussian_kernel_1d};
use crate::density::DensityGrid;
use rayon::prelude::*;

/// Row-parallel version of [`crate::density::blur::separable_blur`].
pub fn separable_blur_par(grid: &mut DensityGrid, kernel_size: usize) {
    let kernel = gaussian_kernel_1d(kernel_size);
    if kernel.len() == 1 {
        return;
    }
    let width = grid.width();
    let height = grid.height();
    let mut scratch = vec![0.0f32; width * height];

    scratch
        .par_chunks_exact_mut(width)
        .zip(grid.as_slice().par_chunks_exact(width))
        .for_each(|(dst, src)| blur_row_horizontal(src, dst, &kernel));

    grid.as_mut_slice()
        .par_chunks_exact_mut(width)
        .enumerate()
        .for_each(|(y, dst)| blur_row_vertical(&scratch, width, height, y, dst, &kernel));
}

#[cfg(test)]
mod tests {
    use super::separable_blur_par;
    use crate::density::blur::separable_blur;
    use crate::density::DensityGrid;

    #[test]
    fn matches_sequential_blur() {
        let mut seq = DensityGrid::new(23, 17).unwrap();
        for (i, cell) in seq.as_mut_slice().iter_mut().enumerate() {
            *cell = ((i * 37) % 11) as f32 * 0.1;
        }
        let mut par = seq.clone();
        separable_blur(&mut seq, 9);
        separable_blur_par(&mut par, 9);
        assert_eq!(seq.as_slice(), par.as_slice());
    }
}
