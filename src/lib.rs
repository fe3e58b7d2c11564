//! FIR resampling (`upfirdn2d`) on `ndarray` batches, the resampling layers
//! built on it, and remapping of NVIDIA-style StyleGAN2 generator weights to
//! the ROS layout.
//!
//! ```
//! use ndarray::Array4;
//! use ndarray_upfirdn::{make_kernel, Error, UpFirDn2dExt};
//!
//! # fn main() -> Result<(), Error> {
//! let x = Array4::<f32>::ones((1, 3, 8, 8));
//! let k = make_kernel(&[1f32, 3., 3., 1.])?;
//! let y = x.upfirdn2d(&k, 2, 1, (2, 1))?;
//! assert_eq!(y.shape(), &[1, 3, 16, 16]);
//! # Ok(())
//! # }
//! ```

mod conv;
pub mod convert;
mod error;
pub mod filters;
mod kernel;
pub mod padding;
mod resample;

pub use conv::ConvExt;
pub use error::Error;
pub use filters::{make_kernel, Blur, Downsample, Upsample};
pub use kernel::{FirKernel, IntoFirKernel, ReverseKernel};
pub use resample::{
    upfirdn2d, upfirdn2d_materialized, upfirdn2d_native, IntoFactor, IntoPadding, Resample,
    UpFirDn2dExt,
};
