//! FIR resampling layers as used by the ROS generator.
//!
//! Each layer owns a normalized 2D kernel and the padding that keeps the
//! output aligned with the input grid.

use ndarray::{prelude::*, Data, NewAxis};
use num::{traits::NumAssign, Float, FromPrimitive};

use crate::{Error, UpFirDn2dExt};

/// Builds a 2D kernel from 1D taps as the outer product `k ⊗ k`, normalized to
/// sum to one.
pub fn make_kernel<T>(k: &[T]) -> Result<Array2<T>, Error>
where
    T: Float + NumAssign,
{
    if k.is_empty() {
        return Err(Error::InvalidShape("kernel taps are empty".to_string()));
    }

    let k = ArrayView1::from(k);
    let k2 = &k.slice(s![NewAxis, ..]) * &k.slice(s![.., NewAxis]);

    let sum = k2.sum();
    if sum == T::zero() {
        return Err(Error::InvalidShape("kernel taps sum to zero".to_string()));
    }

    Ok(k2.mapv(|v| v / sum))
}

fn factor_of<T: FromPrimitive>(factor: usize) -> Result<T, Error> {
    T::from_usize(factor)
        .ok_or_else(|| Error::InvalidShape(format!("factor {factor} is not representable")))
}

/// Front / back padding that centers a `k_len` kernel after resampling by
/// `factor`.
fn centered_pad(k_len: usize, factor: usize) -> (isize, isize) {
    let p = k_len as isize - factor as isize;

    ((p + 1).div_euclid(2), p.div_euclid(2))
}

/// Zero-insertion up-sampling followed by FIR interpolation.
#[derive(Debug, Clone)]
pub struct Upsample<T> {
    kernel: Array2<T>,
    factor: usize,
    pad: (isize, isize),
}

impl<T> Upsample<T>
where
    T: Float + NumAssign + FromPrimitive + Send + Sync,
{
    pub fn new(k: &[T], factor: usize) -> Result<Self, Error> {
        if factor == 0 {
            return Err(Error::InvalidShape("up-sampling factor must be positive".to_string()));
        }

        let gain = factor_of::<T>(factor * factor)?;
        let kernel = make_kernel(k)?.mapv(|v| v * gain);

        let (pad0, pad1) = centered_pad(k.len(), factor);

        Ok(Self {
            kernel,
            factor,
            pad: (pad0 + factor as isize - 1, pad1),
        })
    }

    pub fn kernel(&self) -> &Array2<T> {
        &self.kernel
    }

    pub fn pad(&self) -> (isize, isize) {
        self.pad
    }

    pub fn forward<S>(&self, input: &ArrayBase<S, Ix4>) -> Result<Array4<T>, Error>
    where
        S: Data<Elem = T>,
    {
        input.upfirdn2d(&self.kernel, self.factor, 1, self.pad)
    }
}

/// FIR anti-aliasing followed by stride down-sampling.
#[derive(Debug, Clone)]
pub struct Downsample<T> {
    kernel: Array2<T>,
    factor: usize,
    pad: (isize, isize),
}

impl<T> Downsample<T>
where
    T: Float + NumAssign + Send + Sync,
{
    pub fn new(k: &[T], factor: usize) -> Result<Self, Error> {
        if factor == 0 {
            return Err(Error::InvalidShape("down-sampling factor must be positive".to_string()));
        }

        Ok(Self {
            kernel: make_kernel(k)?,
            factor,
            pad: centered_pad(k.len(), factor),
        })
    }

    pub fn kernel(&self) -> &Array2<T> {
        &self.kernel
    }

    pub fn pad(&self) -> (isize, isize) {
        self.pad
    }

    pub fn forward<S>(&self, input: &ArrayBase<S, Ix4>) -> Result<Array4<T>, Error>
    where
        S: Data<Elem = T>,
    {
        input.upfirdn2d(&self.kernel, 1, self.factor, self.pad)
    }
}

/// Plain FIR filtering with explicit padding.
///
/// When the blur follows a transposed convolution that up-sampled by
/// `upsample_factor`, the kernel gain is raised by `upsample_factor²` to keep
/// the signal level.
#[derive(Debug, Clone)]
pub struct Blur<T> {
    kernel: Array2<T>,
    pad: (isize, isize),
}

impl<T> Blur<T>
where
    T: Float + NumAssign + FromPrimitive + Send + Sync,
{
    pub fn new(k: &[T], pad: (isize, isize), upsample_factor: usize) -> Result<Self, Error> {
        let mut kernel = make_kernel(k)?;

        if upsample_factor > 1 {
            let gain = factor_of::<T>(upsample_factor * upsample_factor)?;
            kernel.mapv_inplace(|v| v * gain);
        }

        Ok(Self { kernel, pad })
    }

    pub fn kernel(&self) -> &Array2<T> {
        &self.kernel
    }

    pub fn forward<S>(&self, input: &ArrayBase<S, Ix4>) -> Result<Array4<T>, Error>
    where
        S: Data<Elem = T>,
    {
        input.upfirdn2d(&self.kernel, 1, 1, self.pad)
    }
}
