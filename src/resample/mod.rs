//! The `upfirdn2d` resampling filter.
//!
//! Each (sample, channel) plane of a `(N, C, H, W)` batch is, independently:
//!
//! 1. up-sampled by inserting `up - 1` zeros after every row / column,
//! 2. zero-padded, then cropped where a pad value is negative,
//! 3. convolved (valid mode) with the kernel, i.e. correlated with the kernel
//!    flipped along both axes,
//! 4. down-sampled by keeping every `down`-th row / column from index 0.
//!
//! [`UpFirDn2dExt::upfirdn2d`] computes this without materializing the
//! zero-interleaved intermediate: every output sample only visits the kernel
//! taps that land on a real input sample. [`upfirdn2d_materialized`] follows
//! the four steps literally and is kept as a reference.

use ndarray::{parallel::prelude::*, prelude::*, Data};
use num::traits::NumAssign;

use crate::{
    conv::ConvExt,
    kernel::IntoFirKernel,
    padding::upsample_pad,
    Error,
};

mod params;


pub use params::{IntoFactor, IntoPadding, Resample};

/// A `(kernel index, input index)` pair contributing to one output sample.
type Tap = (usize, usize);

/// Maps every output index of one axis to the kernel taps that fall on input
/// samples.
///
/// Output `o` and tap `k` meet at position `o * down + k` of the padded array,
/// which is position `o * down + k - pad[0]` of the up-sampled one. Only
/// multiples of `up` inside the up-sampled input carry data; everything else is
/// an inserted or padded zero.
fn axis_taps(
    out_len: usize,
    k_len: usize,
    len: usize,
    up: usize,
    down: usize,
    pad0: isize,
) -> Vec<Vec<Tap>> {
    (0..out_len)
        .map(|o| {
            (0..k_len)
                .filter_map(|k| {
                    let u = (o * down + k) as isize - pad0;
                    if u < 0 || u as usize % up != 0 {
                        return None;
                    }
                    let i = u as usize / up;
                    (i < len).then_some((k, i))
                })
                .collect()
        })
        .collect()
}

/// Filters one plane with the already oriented `kernel`.
///
/// Every kernel coefficient that lands on a real input sample is applied,
/// zero-valued ones included, so non-finite inputs propagate as they would
/// through the literal up-sample, pad and convolve steps.
fn filter_plane<T>(
    input: ArrayView2<T>,
    mut output: ArrayViewMut2<T>,
    kernel: &ArrayView2<T>,
    taps_y: &[Vec<Tap>],
    taps_x: &[Vec<Tap>],
) where
    T: NumAssign + Copy,
{
    for ((oy, ox), r) in output.indexed_iter_mut() {
        let mut tmp_res = T::zero();

        for &(ky, iy) in &taps_y[oy] {
            for &(kx, ix) in &taps_x[ox] {
                tmp_res += input[[iy, ix]] * kernel[[ky, kx]];
            }
        }

        *r = tmp_res;
    }
}

pub trait UpFirDn2dExt<T: NumAssign + Copy> {
    /// Shorthand form: `up` / `down` are a single factor or an `(x, y)` pair,
    /// `pad` is `(p0, p1)` (both axes) or `[x0, x1, y0, y1]`.
    fn upfirdn2d<SK: Data<Elem = T>>(
        &self,
        kernel: &ArrayBase<SK, Ix2>,
        up: impl IntoFactor,
        down: impl IntoFactor,
        pad: impl IntoPadding,
    ) -> Result<Array4<T>, Error> {
        self.upfirdn2d_with(kernel, &Resample::new(up, down, pad))
    }

    fn upfirdn2d_with<SK: Data<Elem = T>>(
        &self,
        kernel: &ArrayBase<SK, Ix2>,
        params: &Resample,
    ) -> Result<Array4<T>, Error>;
}

impl<T, S> UpFirDn2dExt<T> for ArrayBase<S, Ix4>
where
    T: NumAssign + Copy + Send + Sync,
    S: Data<Elem = T>,
{
    fn upfirdn2d_with<SK: Data<Elem = T>>(
        &self,
        kernel: &ArrayBase<SK, Ix2>,
        params: &Resample,
    ) -> Result<Array4<T>, Error> {
        let (n, c, in_h, in_w) = self.dim();
        let (out_h, out_w) = params.output_dim((in_h, in_w), kernel.dim())?;

        tracing::debug!(
            ?params,
            input = ?self.shape(),
            kernel = ?kernel.shape(),
            out_h,
            out_w,
            "upfirdn2d"
        );

        let [up_y, up_x] = params.up();
        let [down_y, down_x] = params.down();
        let [pad_y, pad_x] = params.pad();

        let taps_y = axis_taps(out_h, kernel.nrows(), in_h, up_y, down_y, pad_y[0]);
        let taps_x = axis_taps(out_w, kernel.ncols(), in_w, up_x, down_x, pad_x[0]);

        let oriented = kernel.into_fir_kernel().oriented();

        let planes = self.to_shape((n * c, in_h, in_w))?;
        let mut out = Array3::zeros((n * c, out_h, out_w));

        out.axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(planes.axis_iter(Axis(0)))
            .for_each(|(output, input)| {
                filter_plane(input, output, &oriented, &taps_y, &taps_x);
            });

        Ok(out.into_shape_with_order((n, c, out_h, out_w))?)
    }
}

/// `upfirdn2d` with shorthand parameters; see [`UpFirDn2dExt::upfirdn2d`].
pub fn upfirdn2d<T, S, SK>(
    input: &ArrayBase<S, Ix4>,
    kernel: &ArrayBase<SK, Ix2>,
    up: impl IntoFactor,
    down: impl IntoFactor,
    pad: impl IntoPadding,
) -> Result<Array4<T>, Error>
where
    T: NumAssign + Copy + Send + Sync,
    S: Data<Elem = T>,
    SK: Data<Elem = T>,
{
    input.upfirdn2d(kernel, up, down, pad)
}

/// `upfirdn2d` with every factor and pad spelled out.
#[allow(clippy::too_many_arguments)]
pub fn upfirdn2d_native<T, S, SK>(
    input: &ArrayBase<S, Ix4>,
    kernel: &ArrayBase<SK, Ix2>,
    up_x: usize,
    up_y: usize,
    down_x: usize,
    down_y: usize,
    pad_x0: isize,
    pad_x1: isize,
    pad_y0: isize,
    pad_y1: isize,
) -> Result<Array4<T>, Error>
where
    T: NumAssign + Copy + Send + Sync,
    S: Data<Elem = T>,
    SK: Data<Elem = T>,
{
    input.upfirdn2d_with(
        kernel,
        &Resample {
            up_x,
            up_y,
            down_x,
            down_y,
            pad_x0,
            pad_x1,
            pad_y0,
            pad_y1,
        },
    )
}

/// Reference `upfirdn2d`: builds the up-sampled, padded plane and runs a
/// strided valid convolution over it.
///
/// Same result as [`UpFirDn2dExt::upfirdn2d_with`], at the cost of allocating
/// the full intermediate for every plane.
pub fn upfirdn2d_materialized<T, S, SK>(
    input: &ArrayBase<S, Ix4>,
    kernel: &ArrayBase<SK, Ix2>,
    params: &Resample,
) -> Result<Array4<T>, Error>
where
    T: NumAssign + Copy + std::fmt::Debug,
    S: Data<Elem = T>,
    SK: Data<Elem = T>,
{
    let (n, c, in_h, in_w) = input.dim();
    let (out_h, out_w) = params.output_dim((in_h, in_w), kernel.dim())?;

    let planes = input.to_shape((n * c, in_h, in_w))?;
    let mut out = Array3::zeros((n * c, out_h, out_w));

    for (mut output, plane) in out.axis_iter_mut(Axis(0)).zip(planes.axis_iter(Axis(0))) {
        let padded = upsample_pad(&plane, params.up(), params.pad())?;
        output.assign(&padded.conv_valid(kernel, params.down())?);
    }

    Ok(out.into_shape_with_order((n, c, out_h, out_w))?)
}
