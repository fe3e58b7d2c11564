//! Zero-insertion up-sampling followed by signed padding.
//!
//! A positive pad value adds zeros on that edge, a negative one crops that many
//! samples. Cropping is applied after every positive pad has been inserted.

use ndarray::{
    Array, ArrayBase, Data, Dim, Dimension, IntoDimension, Ix, SliceArg, SliceInfo, SliceInfoElem,
};
use num::traits::NumAssign;

use crate::Error;

/// Signed `[front, back]` padding per axis.
pub type SignedPadding<const N: usize> = [[isize; 2]; N];

/// Extent of one axis after up-sampling by `up` and applying `pad`.
///
/// May be negative when the crops outweigh the data.
#[inline]
pub fn padded_len(len: usize, up: usize, pad: [isize; 2]) -> isize {
    (len * up) as isize + pad[0] + pad[1]
}

/// Builds the up-sampled, zero-padded and cropped copy of `input`.
///
/// Every axis `i` gets `up[i] - 1` zeros inserted after each sample, then
/// `pad[i][0]` / `pad[i][1]` samples of zeros (or crop, when negative) on the
/// front / back edge.
pub fn upsample_pad<const N: usize, T, S>(
    input: &ArrayBase<S, Dim<[Ix; N]>>,
    up: [usize; N],
    pad: SignedPadding<N>,
) -> Result<Array<T, Dim<[Ix; N]>>, Error>
where
    T: NumAssign + Copy,
    S: Data<Elem = T>,
    Dim<[Ix; N]>: Dimension,
    [Ix; N]: IntoDimension<Dim = Dim<[Ix; N]>>,
    SliceInfo<[SliceInfoElem; N], Dim<[Ix; N]>, Dim<[Ix; N]>>:
        SliceArg<Dim<[Ix; N]>, OutDim = Dim<[Ix; N]>>,
{
    let input_dim = input.raw_dim();

    for i in 0..N {
        if up[i] == 0 {
            return Err(Error::InvalidShape(format!(
                "up-sampling factor on axis {i} must be positive"
            )));
        }
        if padded_len(input_dim[i], up[i], pad[i]) < 0 {
            return Err(Error::InvalidShape(format!(
                "padding {:?} crops past the {} samples of axis {i}",
                pad[i],
                input_dim[i] * up[i]
            )));
        }
    }

    let zero_pad: [[usize; 2]; N] = pad.map(|p| [p[0].max(0) as usize, p[1].max(0) as usize]);
    let crop: [[usize; 2]; N] = pad.map(|p| [(-p[0]).max(0) as usize, (-p[1]).max(0) as usize]);

    let buffer_dim: [usize; N] =
        std::array::from_fn(|i| input_dim[i] * up[i] + zero_pad[i][0] + zero_pad[i][1]);
    let mut buffer: Array<T, Dim<[Ix; N]>> = Array::zeros(buffer_dim);

    let mut samples = buffer.slice_mut(unsafe {
        SliceInfo::new(std::array::from_fn(|i| SliceInfoElem::Slice {
            start: zero_pad[i][0] as isize,
            end: Some((zero_pad[i][0] + input_dim[i] * up[i]) as isize),
            step: up[i] as isize,
        }))?
    });
    samples.assign(input);

    if crop.iter().all(|c| c == &[0, 0]) {
        return Ok(buffer);
    }

    let cropped = buffer.slice(unsafe {
        SliceInfo::new(std::array::from_fn(|i| SliceInfoElem::Slice {
            start: crop[i][0] as isize,
            end: Some((buffer_dim[i] - crop[i][1]) as isize),
            step: 1,
        }))?
    });

    Ok(cropped.to_owned())
}
