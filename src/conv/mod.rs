//! Valid-mode, strided convolution over arrays of any rank.
//!
//! This is the building block of the materialized resampling path: once the
//! input has been up-sampled and padded, filtering and down-sampling reduce to
//! a valid convolution whose strides are the down-sampling factors.

use std::fmt::Debug;

use ndarray::{prelude::*, Data, IntoDimension, Ix, ShapeBuilder};
use num::traits::NumAssign;

use crate::{kernel::IntoFirKernel, Error};


/// Output extent of a valid convolution along one axis.
///
/// Equivalent to `(len - k + stride) / stride`, and `None` when the kernel
/// does not fit.
#[inline]
pub fn valid_len(len: usize, k: usize, stride: usize) -> Option<usize> {
    if k == 0 || stride == 0 || k > len {
        return None;
    }

    Some((len - k) / stride + 1)
}

pub trait ConvExt<T: NumAssign + Copy, const N: usize> {
    /// Slides `kernel` over every position where it fully overlaps `self`,
    /// keeping one output sample every `strides[i]` positions along axis `i`.
    fn conv_valid<'a, SK>(
        &self,
        kernel: impl IntoFirKernel<'a, SK, N>,
        strides: [usize; N],
    ) -> Result<Array<T, Dim<[Ix; N]>>, Error>
    where
        SK: Data<Elem = T> + 'a;
}

impl<T, S, const N: usize> ConvExt<T, N> for ArrayBase<S, Dim<[Ix; N]>>
where
    T: NumAssign + Copy + Debug,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
{
    fn conv_valid<'a, SK>(
        &self,
        kernel: impl IntoFirKernel<'a, SK, N>,
        strides: [usize; N],
    ) -> Result<Array<T, Dim<[Ix; N]>>, Error>
    where
        SK: Data<Elem = T> + 'a,
    {
        let kernel = kernel.into_fir_kernel();

        let self_raw_dim = self.raw_dim();
        let kernel_raw_dim = kernel.kernel.raw_dim();

        let mut output_shape = [0; N];
        for i in 0..N {
            output_shape[i] = valid_len(self_raw_dim[i], kernel_raw_dim[i], strides[i])
                .ok_or_else(|| {
                    Error::InvalidShape(format!(
                        "kernel of size {} with stride {} does not fit axis {i} of size {}",
                        kernel_raw_dim[i], strides[i], self_raw_dim[i]
                    ))
                })?;
        }

        let input = self.as_standard_layout();
        let data = input.as_slice().ok_or_else(|| {
            Error::InvalidShape("input could not be laid out contiguously".to_string())
        })?;

        let offset_list = kernel.gen_offset_list(input.strides());

        let view_strides: [usize; N] =
            std::array::from_fn(|i| strides[i] * input.strides()[i] as usize);
        // each element of `windows` is the first sample of one kernel window
        let windows = ArrayView::from_shape(output_shape.strides(view_strides), data)?;

        let mut ret = Array::zeros(output_shape);

        windows.iter().zip(ret.iter_mut()).for_each(|(cur, r)| {
            let mut tmp_res = T::zero();

            // every window lies inside `data`, so each offset stays in bounds
            offset_list.iter().for_each(|(tmp_offset, tmp_kernel)| unsafe {
                tmp_res += *(cur as *const T).offset(*tmp_offset) * *tmp_kernel
            });

            *r = tmp_res;
        });

        Ok(ret)
    }
}
